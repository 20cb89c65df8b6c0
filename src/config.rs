//! Evaluation configuration.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::metrics::ap::ApMatching;
use crate::threshold::validate_threshold;
use crate::uncertainty::UncertaintyKind;

/// Minimum confidence a detection needs to be evaluated, unless configured otherwise.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.3;

fn default_confidence_floor() -> f64 {
    DEFAULT_CONFIDENCE_FLOOR
}

/// Settings for a [`DatasetEvaluator`](crate::evaluator::DatasetEvaluator) run.
///
/// ```json
/// {
///   "classes": ["bird", "cat"],
///   "confidence_floor": 0.3,
///   "rank_by_confidence": false,
///   "ap_matching": "permissive",
///   "uncertainty": "confidence_complement"
/// }
/// ```
///
/// Only `classes` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Labels that take part in the evaluation; everything else is dropped.
    pub classes: BTreeSet<String>,

    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Sort each image's detections by confidence before matching.
    #[serde(default)]
    pub rank_by_confidence: bool,

    #[serde(default)]
    pub ap_matching: ApMatching,

    #[serde(default)]
    pub uncertainty: UncertaintyKind,
}

impl EvalConfig {
    /// Configuration with the default floor and policies for the given classes.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            rank_by_confidence: false,
            ap_matching: ApMatching::default(),
            uncertainty: UncertaintyKind::default(),
        }
    }

    pub fn with_confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    pub fn with_rank_by_confidence(mut self, rank: bool) -> Self {
        self.rank_by_confidence = rank;
        self
    }

    pub fn with_ap_matching(mut self, matching: ApMatching) -> Self {
        self.ap_matching = matching;
        self
    }

    pub fn with_uncertainty(mut self, kind: UncertaintyKind) -> Self {
        self.uncertainty = kind;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(EvalError::InvalidConfig(
                "At least one class of interest is required".to_string(),
            ));
        }
        if let Some(blank) = self.classes.iter().find(|c| c.trim().is_empty()) {
            return Err(EvalError::InvalidConfig(format!(
                "Class names must not be blank, got {:?}",
                blank
            )));
        }
        validate_threshold(self.confidence_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config = EvalConfig::from_json_str(r#"{"classes": ["bird", "cat"]}"#).unwrap();
        assert_eq!(config.classes.len(), 2);
        assert_eq!(config.confidence_floor, DEFAULT_CONFIDENCE_FLOOR);
        assert!(!config.rank_by_confidence);
        assert_eq!(config.ap_matching, ApMatching::Permissive);
        assert_eq!(config.uncertainty, UncertaintyKind::ConfidenceComplement);
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "classes": ["bird"],
            "confidence_floor": 0.5,
            "rank_by_confidence": true,
            "ap_matching": "exclusive",
            "uncertainty": "entropy"
        }"#;
        let config = EvalConfig::from_json_str(json).unwrap();
        assert_eq!(config, EvalConfig::new(["bird"])
            .with_confidence_floor(0.5)
            .with_rank_by_confidence(true)
            .with_ap_matching(ApMatching::Exclusive)
            .with_uncertainty(UncertaintyKind::Entropy));
    }

    #[test]
    fn test_empty_classes_rejected() {
        let result = EvalConfig::from_json_str(r#"{"classes": []}"#);
        assert!(matches!(result, Err(EvalError::InvalidConfig(_))));
    }

    #[test]
    fn test_floor_out_of_range_rejected() {
        let config = EvalConfig::new(["bird"]).with_confidence_floor(1.2);
        assert!(matches!(config.validate(), Err(EvalError::InvalidThreshold(_))));
    }

    #[test]
    fn test_missing_classes_is_json_error() {
        let result = EvalConfig::from_json_str(r#"{"confidence_floor": 0.3}"#);
        assert!(matches!(result, Err(EvalError::JsonError(_))));
    }
}
