//! Confidence and class filtering, and threshold utilities.

use std::collections::BTreeSet;

use crate::error::{EvalError, Result};
use crate::types::{Detection, GroundTruthBox};

/// Number of IoU thresholds in the COCO ladder 0.50:0.05:0.95.
pub const COCO_IOU_STEPS: usize = 10;

/// Keep detections whose label is in `classes` and whose confidence is at least `floor`.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use det_eval::threshold::filter_detections;
/// use det_eval::types::{BoundingBox, Detection};
///
/// let bbox = BoundingBox::new(0.5, 0.5, 0.1, 0.1);
/// let detections = vec![
///     Detection::new("bird", bbox, 0.9),
///     Detection::new("bird", bbox, 0.2),
///     Detection::new("car", bbox, 0.9),
/// ];
/// let classes: BTreeSet<String> = ["bird".to_string()].into();
///
/// let kept = filter_detections(detections, &classes, 0.3);
/// assert_eq!(kept.len(), 1);
/// ```
pub fn filter_detections(
    detections: Vec<Detection>,
    classes: &BTreeSet<String>,
    floor: f64,
) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|det| classes.contains(&det.label) && det.confidence >= floor)
        .collect()
}

/// Keep ground truth boxes whose label is in `classes`.
pub fn filter_ground_truth(
    ground_truth: Vec<GroundTruthBox>,
    classes: &BTreeSet<String>,
) -> Vec<GroundTruthBox> {
    ground_truth
        .into_iter()
        .filter(|gt| classes.contains(&gt.label))
        .collect()
}

/// IoU thresholds 0.50, 0.55, ..., 0.95.
///
/// # Example
///
/// ```
/// use det_eval::threshold::coco_iou_thresholds;
///
/// let thresholds = coco_iou_thresholds();
/// assert_eq!(thresholds.len(), 10);
/// assert_eq!(thresholds[0], 0.5);
/// ```
pub fn coco_iou_thresholds() -> Vec<f64> {
    (0..COCO_IOU_STEPS).map(|i| 0.5 + 0.05 * i as f64).collect()
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EvalError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
