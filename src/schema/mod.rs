//! Raw activity export schema
//!
//! This module defines the loose input record shared by the Chrome, YouTube
//! and Maps exports, and parsing for whole collections (JSON array or NDJSON).

mod adapter;
mod raw_record;

pub use adapter::*;
pub use raw_record::*;
