//! Pipeline configuration
//!
//! A small TOML file names the source exports, the model artifact and the
//! display timezone:
//!
//! ```toml
//! timezone = "Europe/Berlin"
//! input_format = "json"
//!
//! [sources]
//! chrome = "takeout/Chrome/BrowserHistory.json"
//! youtube = "takeout/YouTube/watch-history.json"
//! maps = "takeout/Maps/MyActivity.json"
//!
//! [model]
//! artifact = "models/activity_model.json"
//! history = "models/daily_activity.json"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use crate::aggregator::DailyActivitySeries;
use crate::error::PipelineError;
use crate::pipeline::{ActivityPipeline, SourceInput};
use crate::predictor::Predictor;
use crate::schema::InputFormat;
use crate::types::Source;
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LIFEDATA_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lifedata.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcePaths {
    pub chrome: Option<PathBuf>,
    pub youtube: Option<PathBuf>,
    pub maps: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Logistic model artifact (JSON)
    pub artifact: Option<PathBuf>,
    /// Pre-computed daily series used instead of the live one
    pub history: Option<PathBuf>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// IANA name used for date, hour and weekday
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub input_format: InputFormat,
    #[serde(default)]
    pub sources: SourcePaths,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            input_format: InputFormat::default(),
            sources: SourcePaths::default(),
            model: ModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, PipelineError> {
        toml::from_str(s).map_err(|e| PipelineError::ConfigError(e.to_string()))
    }

    /// Load a config file, resolving relative paths against its directory
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("reading {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_relative_to(base))
    }

    /// Load using the lookup order:
    /// 1) `explicit`
    /// 2) $LIFEDATA_CONFIG
    /// 3) ./lifedata.toml
    /// 4) defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, PipelineError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_in(explicit, from_env.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
    }

    fn discover_in(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        fallback: &Path,
    ) -> Result<Self, PipelineError> {
        if let Some(path) = explicit.or(from_env) {
            if !path.exists() {
                return Err(PipelineError::ConfigError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "loading config");
            return Self::from_path(path);
        }
        if fallback.exists() {
            debug!(path = %fallback.display(), "loading config");
            return Self::from_path(fallback);
        }
        Ok(Self::default())
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        resolve(&mut self.sources.chrome);
        resolve(&mut self.sources.youtube);
        resolve(&mut self.sources.maps);
        resolve(&mut self.model.artifact);
        resolve(&mut self.model.history);
        self
    }

    pub fn parse_timezone(&self) -> Result<Tz, PipelineError> {
        parse_timezone(&self.timezone)
    }

    /// Configured sources, in Chrome, YouTube, Maps order
    pub fn source_paths(&self) -> Vec<(Source, PathBuf)> {
        [
            (Source::Chrome, &self.sources.chrome),
            (Source::YouTube, &self.sources.youtube),
            (Source::Maps, &self.sources.maps),
        ]
        .into_iter()
        .filter_map(|(source, path)| path.clone().map(|p| (source, p)))
        .collect()
    }

    /// Read every configured source
    pub fn source_inputs(&self) -> Vec<SourceInput> {
        self.source_paths()
            .into_iter()
            .map(|(source, path)| SourceInput::from_path(source, self.input_format, &path))
            .collect()
    }

    /// Build a pipeline from this config. Only an invalid timezone fails;
    /// model and history problems surface later as an unavailable prediction.
    pub fn build_pipeline(&self) -> Result<ActivityPipeline, PipelineError> {
        let mut pipeline = ActivityPipeline::with_timezone(self.parse_timezone()?);

        if let Some(artifact) = &self.model.artifact {
            pipeline = pipeline.with_predictor(Predictor::from_artifact_path(artifact));
        }
        if let Some(history) = &self.model.history {
            let snapshot = fs::read_to_string(history)
                .map_err(|e| {
                    PipelineError::ModelUnavailable(format!(
                        "cannot read {}: {e}",
                        history.display()
                    ))
                })
                .and_then(|json| DailyActivitySeries::from_snapshot_json(&json));
            pipeline = pipeline.with_history(snapshot);
        }
        Ok(pipeline)
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, PipelineError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| PipelineError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            timezone = "Europe/Berlin"
            input_format = "ndjson"

            [sources]
            chrome = "/data/chrome.json"
            maps = "maps.json"

            [model]
            artifact = "/models/activity_model.json"
        "#;
        let config = PipelineConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.input_format, InputFormat::Ndjson);
        assert_eq!(config.sources.youtube, None);
        assert_eq!(config.parse_timezone().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(
            config.source_paths(),
            vec![
                (Source::Chrome, PathBuf::from("/data/chrome.json")),
                (Source::Maps, PathBuf::from("maps.json")),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.parse_timezone().unwrap(), chrono_tz::UTC);
        assert!(config.source_inputs().is_empty());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = PipelineConfig::from_toml_str("timezon = \"UTC\"").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_timezone() {
        let config = PipelineConfig {
            timezone: "Mars/Olympus".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.build_pipeline(),
            Err(PipelineError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [sources]
            youtube = "watch-history.json"
            chrome = "/abs/chrome.json"
            "#,
        )
        .unwrap()
        .resolve_relative_to(Path::new("/home/me/takeout"));

        assert_eq!(
            config.sources.youtube,
            Some(PathBuf::from("/home/me/takeout/watch-history.json"))
        );
        assert_eq!(config.sources.chrome, Some(PathBuf::from("/abs/chrome.json")));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let config =
            PipelineConfig::discover_in(None, None, Path::new("/nonexistent/lifedata.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_discover_missing_explicit_file() {
        let err = PipelineConfig::discover_in(
            Some(Path::new("/nonexistent/custom.toml")),
            None,
            Path::new(DEFAULT_CONFIG_FILE),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_missing_model_does_not_fail_build() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [model]
            artifact = "/nonexistent/model.json"
            history = "/nonexistent/history.json"
            "#,
        )
        .unwrap();
        let pipeline = config.build_pipeline().unwrap();
        let output = pipeline.run(Vec::new());
        assert!(output.prediction.prediction().is_none());
    }
}
