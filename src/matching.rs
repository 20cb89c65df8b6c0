//! Detection matching utilities for evaluating predictions against ground truth.

use serde::{Deserialize, Serialize};

use crate::metrics::f1_score::calculate_f1_from_pr;
use crate::metrics::iou::calculate_iou;
use crate::metrics::precision_recall::calculate_precision_recall;
use crate::types::{Detection, GroundTruthBox};

/// IoU a prediction must reach to be scored as a true positive by [`match_and_score`].
pub const MATCH_IOU_THRESHOLD: f64 = 0.5;

/// Point metrics for one image, with the counts they were computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Find the ground truth box with the same label as `prediction` and the highest IoU.
///
/// Boxes for which `skip` returns `true` are ignored. Ties keep the earliest
/// box. Returns `None` when no candidate remains.
pub fn best_same_label_match<F>(
    prediction: &Detection,
    ground_truths: &[GroundTruthBox],
    skip: F,
) -> Option<(usize, f64)>
where
    F: Fn(usize) -> bool,
{
    let mut best: Option<(usize, f64)> = None;

    for (gt_idx, gt) in ground_truths.iter().enumerate() {
        if gt.label != prediction.label || skip(gt_idx) {
            continue;
        }

        let iou = calculate_iou(&prediction.bbox, &gt.bbox);
        if best.map_or(true, |(_, best_iou)| iou > best_iou) {
            best = Some((gt_idx, iou));
        }
    }

    best
}

/// Best IoU between `prediction` and any same-label ground truth box, `0.0` if there is none.
pub fn best_iou(prediction: &Detection, ground_truths: &[GroundTruthBox]) -> f64 {
    best_same_label_match(prediction, ground_truths, |_| false).map_or(0.0, |(_, iou)| iou)
}

/// Greedily match predictions to ground truth and compute precision, recall and F1.
///
/// Predictions are visited in the order supplied; sort them by confidence
/// beforehand for confidence-ranked matching. Each prediction looks up the
/// same-label ground truth box with the highest IoU. It is a true positive if
/// that IoU is at least [`MATCH_IOU_THRESHOLD`] and the box has not been
/// claimed yet, in which case the box is marked `matched`. Otherwise, including
/// when the best box was already claimed, it is a false positive.
///
/// # Example
///
/// ```
/// use det_eval::matching::match_and_score;
/// use det_eval::types::{BoundingBox, Detection, GroundTruthBox};
///
/// let bbox = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
/// let predictions = vec![Detection::new("bird", bbox, 0.9)];
/// let mut ground_truth = vec![GroundTruthBox::new("bird", bbox)];
///
/// let summary = match_and_score(&predictions, &mut ground_truth);
/// assert_eq!(summary.precision, 1.0);
/// assert!(ground_truth[0].matched);
/// ```
pub fn match_and_score(
    predictions: &[Detection],
    ground_truths: &mut [GroundTruthBox],
) -> MatchSummary {
    let mut true_positives = 0;
    let mut false_positives = 0;

    for pred in predictions {
        match best_same_label_match(pred, ground_truths, |_| false) {
            Some((gt_idx, iou)) if iou >= MATCH_IOU_THRESHOLD && !ground_truths[gt_idx].matched => {
                ground_truths[gt_idx].matched = true;
                true_positives += 1;
            }
            _ => false_positives += 1,
        }
    }

    let false_negatives = ground_truths.len() - true_positives;
    let pr = calculate_precision_recall(true_positives, false_positives, false_negatives);

    MatchSummary {
        precision: pr.precision,
        recall: pr.recall,
        f1: calculate_f1_from_pr(&pr),
        true_positives,
        false_positives,
        false_negatives,
    }
}

/// Stable sort by confidence, highest first.
pub fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
