//! Next-day activity prediction
//!
//! The trained model is an opaque capability behind [`ActivityClassifier`].
//! [`Predictor`] checks the model's declared input against the
//! [`FeatureVector`] contract before every call and always reports the
//! probability of the active class as confidence.
//!
//! [`LogisticArtifact`] is the bundled implementation: a logistic regression
//! exported to JSON by the offline training step.

use crate::error::PipelineError;
use crate::types::{FeatureVector, Prediction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Binary classifier over the next-day feature vector
pub trait ActivityClassifier: Send + Sync {
    /// Input feature names, in the order `predict` expects them
    fn feature_names(&self) -> Vec<String>;

    /// Predicted class: 1 = active, 0 = inactive
    fn predict(&self, features: &[f64]) -> Result<u8, PipelineError>;

    /// Class probabilities `[p_inactive, p_active]`
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError>;
}

/// Adapter between the pipeline and a loaded classifier
pub struct Predictor {
    classifier: Box<dyn ActivityClassifier>,
}

impl Predictor {
    pub fn new(classifier: Box<dyn ActivityClassifier>) -> Self {
        Self { classifier }
    }

    /// Load the bundled logistic artifact from a JSON file
    pub fn from_artifact_path(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::ModelUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_artifact_json(&json)
    }

    /// Load the bundled logistic artifact from JSON text
    pub fn from_artifact_json(json: &str) -> Result<Self, PipelineError> {
        let artifact = LogisticArtifact::from_json(json)?;
        Ok(Self::new(Box::new(artifact)))
    }

    /// Run the classifier on one feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, PipelineError> {
        let expected = self.classifier.feature_names();
        if expected != FeatureVector::FIELD_NAMES {
            return Err(PipelineError::ModelUnavailable(format!(
                "model expects features {:?}, pipeline provides {:?}",
                expected,
                FeatureVector::FIELD_NAMES
            )));
        }

        let input = features.as_array();
        let label = self.classifier.predict(&input)?;
        let [_, p_active] = self.classifier.predict_proba(&input)?;

        if !(0.0..=1.0).contains(&p_active) {
            return Err(PipelineError::ModelUnavailable(format!(
                "model returned probability {p_active} outside [0, 1]"
            )));
        }

        Ok(Prediction {
            is_active_tomorrow: label == 1,
            confidence: p_active,
        })
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// Logistic regression exported by the training notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticArtifact {
    /// Artifact format version
    pub version: u32,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Active-class probability at or above which the label is 1
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticArtifact {
    pub const SUPPORTED_VERSION: u32 = 1;

    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let artifact: LogisticArtifact = serde_json::from_str(json)
            .map_err(|e| PipelineError::ModelUnavailable(format!("invalid model artifact: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.version != Self::SUPPORTED_VERSION {
            return Err(PipelineError::ModelUnavailable(format!(
                "unsupported model artifact version {}",
                self.version
            )));
        }
        if self.features.len() != self.coefficients.len() {
            return Err(PipelineError::ModelUnavailable(format!(
                "{} features but {} coefficients",
                self.features.len(),
                self.coefficients.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::ModelUnavailable(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    fn active_probability(&self, features: &[f64]) -> Result<f64, PipelineError> {
        if features.len() != self.coefficients.len() {
            return Err(PipelineError::ModelUnavailable(format!(
                "model expects {} inputs, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

impl ActivityClassifier for LogisticArtifact {
    fn feature_names(&self) -> Vec<String> {
        self.features.clone()
    }

    fn predict(&self, features: &[f64]) -> Result<u8, PipelineError> {
        let p = self.active_probability(features)?;
        Ok(u8::from(p >= self.threshold))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError> {
        let p = self.active_probability(features)?;
        Ok([1.0 - p, p])
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
