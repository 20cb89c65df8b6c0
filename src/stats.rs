//! Counters describing what an evaluation run saw and discarded.

use serde::{Deserialize, Serialize};

/// Statistics collected while feeding images through the evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalStats {
    /// Number of images accumulated
    pub images: usize,

    /// Raw detections received from the detector
    pub total_detections: usize,

    /// Detections dropped because their class is not of interest
    pub skipped_unlisted_class: usize,

    /// Detections dropped by the confidence floor
    pub skipped_low_confidence: usize,

    /// Ground truth boxes dropped because their class is not of interest
    pub skipped_ground_truth: usize,

    /// Ground truth boxes that entered the evaluation
    pub ground_truth_boxes: usize,

    /// Images that had no detection left after filtering
    pub empty_predictions: usize,
}

impl EvalStats {
    /// Create a new `EvalStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Detections that passed both filters
    pub fn evaluated_detections(&self) -> usize {
        self.total_detections
            .saturating_sub(self.skipped_unlisted_class)
            .saturating_sub(self.skipped_low_confidence)
    }

    /// Total number of skipped detections
    pub fn total_skipped(&self) -> usize {
        self.skipped_unlisted_class + self.skipped_low_confidence
    }

    /// Add another run's counters into this one
    pub fn merge(&mut self, other: &EvalStats) {
        self.images += other.images;
        self.total_detections += other.total_detections;
        self.skipped_unlisted_class += other.skipped_unlisted_class;
        self.skipped_low_confidence += other.skipped_low_confidence;
        self.skipped_ground_truth += other.skipped_ground_truth;
        self.ground_truth_boxes += other.ground_truth_boxes;
        self.empty_predictions += other.empty_predictions;
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "EvalStats {{ images: {}, detections: {}, evaluated: {}, skipped: {}, ground_truth: {}, empty: {} }}",
            self.images,
            self.total_detections,
            self.evaluated_detections(),
            self.total_skipped(),
            self.ground_truth_boxes,
            self.empty_predictions
        )
    }
}
