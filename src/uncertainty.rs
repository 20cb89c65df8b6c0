//! Per-detection uncertainty and its correlation with object size and accuracy.
//!
//! An [`UncertaintyPolicy`] turns whatever score evidence a detection
//! carries into a scalar. [`observe_image`] produces one image's samples, and
//! an [`UncertaintyAccumulator`] collects them for the whole dataset before
//! [`UncertaintyAccumulator::summarize`] reduces them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::matching::best_iou;
use crate::metrics::correlation::{mean, pearson_correlation, std_dev};
use crate::types::{CorrelationSample, Detection, GroundTruthBox};

/// The score information a detector reported for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreEvidence<'a> {
    /// A single confidence in `[0, 1]`.
    Confidence(f64),
    /// A probability distribution over classes.
    Distribution(&'a [f64]),
}

impl<'a> ScoreEvidence<'a> {
    /// The richest evidence available on `detection`.
    pub fn of(detection: &'a Detection) -> Self {
        match detection.class_probabilities.as_deref() {
            Some(probabilities) if !probabilities.is_empty() => Self::Distribution(probabilities),
            _ => Self::Confidence(detection.confidence),
        }
    }
}

/// Maps score evidence to a scalar uncertainty.
pub trait UncertaintyPolicy: Send + Sync {
    fn uncertainty(&self, evidence: ScoreEvidence<'_>) -> f64;
}

/// `1 - confidence`; for a distribution, `1 - max(p)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceComplement;

impl UncertaintyPolicy for ConfidenceComplement {
    fn uncertainty(&self, evidence: ScoreEvidence<'_>) -> f64 {
        match evidence {
            ScoreEvidence::Confidence(confidence) => 1.0 - confidence,
            ScoreEvidence::Distribution(probabilities) => {
                1.0 - probabilities.iter().copied().fold(0.0, f64::max)
            }
        }
    }
}

/// Shannon entropy in nats.
///
/// A bare confidence `c` is read as the two-point distribution `[c, 1 - c]`.
/// Zero probabilities contribute nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Entropy;

impl Entropy {
    fn entropy<I: IntoIterator<Item = f64>>(probabilities: I) -> f64 {
        probabilities
            .into_iter()
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.ln())
            .sum()
    }
}

impl UncertaintyPolicy for Entropy {
    fn uncertainty(&self, evidence: ScoreEvidence<'_>) -> f64 {
        match evidence {
            ScoreEvidence::Confidence(confidence) => {
                let c = confidence.clamp(0.0, 1.0);
                Self::entropy([c, 1.0 - c])
            }
            ScoreEvidence::Distribution(probabilities) => Self::entropy(probabilities.iter().copied()),
        }
    }
}

/// Serializable selector for the built-in policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyKind {
    #[default]
    ConfidenceComplement,
    Entropy,
}

impl UncertaintyKind {
    pub fn policy(self) -> Box<dyn UncertaintyPolicy> {
        match self {
            Self::ConfidenceComplement => Box::new(ConfidenceComplement),
            Self::Entropy => Box::new(Entropy),
        }
    }
}

/// Uncertainty samples produced by one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageObservations {
    /// `(label, uncertainty)` per detection, in detection order
    pub uncertainties: Vec<(String, f64)>,
    /// `(width × height, uncertainty)` per detection
    pub size_samples: Vec<CorrelationSample>,
    /// `(best same-label IoU, uncertainty)` per detection
    pub accuracy_samples: Vec<CorrelationSample>,
}

/// Compute uncertainty samples for one image's retained detections.
///
/// The accuracy sample uses the best IoU against any same-label ground truth
/// box regardless of whether it was claimed, and `0.0` when the image has no
/// box with that label.
pub fn observe_image(
    policy: &dyn UncertaintyPolicy,
    detections: &[Detection],
    ground_truth: &[GroundTruthBox],
) -> ImageObservations {
    let mut observations = ImageObservations::default();

    for det in detections {
        let u = policy.uncertainty(ScoreEvidence::of(det));
        observations.uncertainties.push((det.label.clone(), u));
        observations
            .size_samples
            .push(CorrelationSample::new(det.bbox.area(), u));
        observations
            .accuracy_samples
            .push(CorrelationSample::new(best_iou(det, ground_truth), u));
    }

    observations
}

/// Mean and spread of one class's uncertainty values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySummary {
    pub count: usize,
    /// `None` when the class was never detected.
    pub mean: Option<f64>,
    /// Population standard deviation, `None` when the class was never detected.
    pub std_dev: Option<f64>,
}

/// Reduced uncertainty statistics for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyReport {
    pub by_class: BTreeMap<String, UncertaintySummary>,
    /// Pearson r between object size and uncertainty.
    pub size_correlation: Option<f64>,
    /// Pearson r between best IoU and uncertainty.
    pub accuracy_correlation: Option<f64>,
}

/// Dataset-wide uncertainty buckets and correlation sample sets.
#[derive(Debug, Clone, Default)]
pub struct UncertaintyAccumulator {
    buckets: BTreeMap<String, Vec<f64>>,
    size_samples: Vec<CorrelationSample>,
    accuracy_samples: Vec<CorrelationSample>,
}

impl UncertaintyAccumulator {
    /// Start with one empty bucket per class of interest.
    pub fn new(classes: &BTreeSet<String>) -> Self {
        Self {
            buckets: classes.iter().map(|c| (c.clone(), Vec::new())).collect(),
            ..Self::default()
        }
    }

    pub fn absorb(&mut self, observations: ImageObservations) {
        for (label, u) in observations.uncertainties {
            self.buckets.entry(label).or_default().push(u);
        }
        self.size_samples.extend(observations.size_samples);
        self.accuracy_samples.extend(observations.accuracy_samples);
    }

    pub fn bucket(&self, label: &str) -> Option<&[f64]> {
        self.buckets.get(label).map(Vec::as_slice)
    }

    pub fn size_samples(&self) -> &[CorrelationSample] {
        &self.size_samples
    }

    pub fn accuracy_samples(&self) -> &[CorrelationSample] {
        &self.accuracy_samples
    }

    pub fn summarize(&self) -> UncertaintyReport {
        let by_class = self
            .buckets
            .iter()
            .map(|(label, values)| {
                let summary = UncertaintySummary {
                    count: values.len(),
                    mean: mean(values),
                    std_dev: std_dev(values),
                };
                (label.clone(), summary)
            })
            .collect();

        UncertaintyReport {
            by_class,
            size_correlation: pearson_correlation(&self.size_samples),
            accuracy_correlation: pearson_correlation(&self.accuracy_samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    #[test]
    fn test_confidence_complement() {
        let policy = ConfidenceComplement;
        assert!((policy.uncertainty(ScoreEvidence::Confidence(0.9)) - 0.1).abs() < 1e-12);
        assert!((policy.uncertainty(ScoreEvidence::Distribution(&[0.7, 0.2, 0.1])) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_entropy() {
        let policy = Entropy;
        // Certain prediction carries no entropy
        assert_eq!(policy.uncertainty(ScoreEvidence::Confidence(1.0)), 0.0);
        // Coin flip: ln 2
        let coin = policy.uncertainty(ScoreEvidence::Confidence(0.5));
        assert!((coin - std::f64::consts::LN_2).abs() < 1e-12);
        // Uniform over four classes: ln 4
        let uniform = policy.uncertainty(ScoreEvidence::Distribution(&[0.25; 4]));
        assert!((uniform - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_evidence_prefers_distribution() {
        let bbox = BoundingBox::new(0.5, 0.5, 0.1, 0.1);
        let plain = Detection::new("bird", bbox, 0.8);
        assert_eq!(ScoreEvidence::of(&plain), ScoreEvidence::Confidence(0.8));

        let rich = plain.clone().with_probabilities(vec![0.8, 0.2]);
        assert!(matches!(ScoreEvidence::of(&rich), ScoreEvidence::Distribution(_)));

        let empty = plain.with_probabilities(vec![]);
        assert_eq!(ScoreEvidence::of(&empty), ScoreEvidence::Confidence(0.8));
    }

    #[test]
    fn test_observe_image() {
        let detections = vec![
            Detection::new("bird", BoundingBox::new(0.5, 0.5, 0.2, 0.2), 0.9),
            Detection::new("cat", BoundingBox::new(0.2, 0.2, 0.1, 0.3), 0.6),
        ];
        let ground_truth = vec![GroundTruthBox::new("bird", BoundingBox::new(0.5, 0.5, 0.2, 0.2))];

        let obs = observe_image(&ConfidenceComplement, &detections, &ground_truth);
        assert_eq!(obs.uncertainties.len(), 2);
        assert_eq!(obs.uncertainties[1].0, "cat");
        assert!((obs.size_samples[0].x - 0.04).abs() < 1e-12);
        assert!((obs.size_samples[1].x - 0.03).abs() < 1e-12);
        assert!((obs.accuracy_samples[0].x - 1.0).abs() < 1e-10);
        // No cat in the ground truth
        assert_eq!(obs.accuracy_samples[1].x, 0.0);
        assert!((obs.accuracy_samples[1].y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_summary() {
        let classes: BTreeSet<String> = ["bird", "cat"].iter().map(|s| s.to_string()).collect();
        let mut acc = UncertaintyAccumulator::new(&classes);

        acc.absorb(ImageObservations {
            uncertainties: vec![("bird".into(), 0.1), ("bird".into(), 0.3)],
            size_samples: vec![CorrelationSample::new(0.01, 0.3), CorrelationSample::new(0.04, 0.1)],
            accuracy_samples: vec![CorrelationSample::new(0.2, 0.3), CorrelationSample::new(0.9, 0.1)],
        });

        let report = acc.summarize();
        let bird = report.by_class["bird"];
        assert_eq!(bird.count, 2);
        assert!((bird.mean.unwrap() - 0.2).abs() < 1e-12);
        assert!((bird.std_dev.unwrap() - 0.1).abs() < 1e-12);

        let cat = report.by_class["cat"];
        assert_eq!(cat.count, 0);
        assert_eq!(cat.mean, None);

        // Bigger and better-localized boxes are less uncertain
        assert!((report.size_correlation.unwrap() + 1.0).abs() < 1e-12);
        assert!((report.accuracy_correlation.unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_accumulator_has_undefined_correlations() {
        let report = UncertaintyAccumulator::default().summarize();
        assert!(report.by_class.is_empty());
        assert_eq!(report.size_correlation, None);
        assert_eq!(report.accuracy_correlation, None);
    }
}
