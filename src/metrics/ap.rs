//! Average Precision (AP) and mean Average Precision (mAP) calculation.

use serde::{Deserialize, Serialize};

use crate::matching::best_same_label_match;
use crate::metrics::precision_recall::{
    calculate_precision_recall_curve, pad_curve, precision_envelope, PrecisionRecallCurve,
};
use crate::threshold::coco_iou_thresholds;
use crate::types::{Detection, GroundTruthBox};

/// How predictions are counted as true positives when building an AP curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApMatching {
    /// A prediction is a true positive whenever its best same-label IoU
    /// reaches the threshold, even if another prediction already hit the
    /// same ground truth box. Recall can then exceed 1 before padding.
    #[default]
    Permissive,
    /// Each ground truth box is claimed at most once per threshold.
    Exclusive,
}

/// AP values for one image across the COCO IoU ladder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    /// AP at IoU 0.50
    pub map50: f64,
    /// Mean AP over IoU 0.50:0.05:0.95
    pub map50_95: f64,
    /// `(iou_threshold, ap)` pairs in ascending threshold order
    pub ap_per_threshold: Vec<(f64, f64)>,
}

/// Calculate Average Precision from a raw precision-recall curve.
///
/// The curve is padded with sentinels, smoothed with the precision envelope,
/// and integrated as `Σ (r[i+1] - r[i]) × p[i+1]` over every point where
/// recall changes.
///
/// # Example
///
/// ```
/// use det_eval::metrics::ap::calculate_ap;
/// use det_eval::metrics::precision_recall::calculate_precision_recall_curve;
///
/// let curve = calculate_precision_recall_curve(&[true, false, true], 2);
/// let ap = calculate_ap(&curve);
/// // 0.5 × 1.0 + 0.5 × 2/3
/// assert!((ap - 0.8333).abs() < 1e-3);
/// ```
pub fn calculate_ap(curve: &PrecisionRecallCurve) -> f64 {
    let (recalls, mut precisions) = pad_curve(curve);
    precision_envelope(&mut precisions);

    recalls
        .windows(2)
        .zip(precisions.iter().skip(1))
        .filter(|(r, _)| r[1] != r[0])
        .map(|(r, &p)| (r[1] - r[0]) * p)
        .sum()
}

/// Calculate AP for one image at a single IoU threshold.
///
/// Predictions are accumulated in the order supplied; sort them by
/// confidence first for the conventional ranking.
///
/// # Example
///
/// ```
/// use det_eval::metrics::ap::{ap_at_threshold, ApMatching};
/// use det_eval::types::{BoundingBox, Detection, GroundTruthBox};
///
/// let bbox = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
/// let predictions = vec![Detection::new("bird", bbox, 0.9)];
/// let ground_truth = vec![GroundTruthBox::new("bird", bbox)];
/// let ap = ap_at_threshold(&predictions, &ground_truth, 0.5, ApMatching::Permissive);
/// assert!((ap - 1.0).abs() < 1e-10);
/// ```
pub fn ap_at_threshold(
    predictions: &[Detection],
    ground_truth: &[GroundTruthBox],
    iou_threshold: f64,
    matching: ApMatching,
) -> f64 {
    let mut claimed = vec![false; ground_truth.len()];

    let is_true_positive: Vec<bool> = predictions
        .iter()
        .map(|pred| match matching {
            ApMatching::Permissive => {
                best_same_label_match(pred, ground_truth, |_| false)
                    .is_some_and(|(_, iou)| iou >= iou_threshold)
            }
            ApMatching::Exclusive => {
                match best_same_label_match(pred, ground_truth, |idx| claimed[idx]) {
                    Some((idx, iou)) if iou >= iou_threshold => {
                        claimed[idx] = true;
                        true
                    }
                    _ => false,
                }
            }
        })
        .collect();

    let curve = calculate_precision_recall_curve(&is_true_positive, ground_truth.len());
    calculate_ap(&curve)
}

/// Calculate mAP50 and mAP50-95 for one image.
///
/// # Example
///
/// ```
/// use det_eval::metrics::ap::{calculate_map, ApMatching};
/// use det_eval::types::{BoundingBox, Detection, GroundTruthBox};
///
/// let bbox = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
/// let predictions = vec![Detection::new("bird", bbox, 0.9)];
/// let ground_truth = vec![GroundTruthBox::new("bird", bbox)];
/// let summary = calculate_map(&predictions, &ground_truth, ApMatching::Permissive);
/// assert!((summary.map50 - 1.0).abs() < 1e-10);
/// assert!((summary.map50_95 - 1.0).abs() < 1e-10);
/// ```
pub fn calculate_map(
    predictions: &[Detection],
    ground_truth: &[GroundTruthBox],
    matching: ApMatching,
) -> MapSummary {
    let ap_per_threshold: Vec<(f64, f64)> = coco_iou_thresholds()
        .into_iter()
        .map(|iou_threshold| {
            let ap = ap_at_threshold(predictions, ground_truth, iou_threshold, matching);
            (iou_threshold, ap)
        })
        .collect();

    let aps: Vec<f64> = ap_per_threshold.iter().map(|&(_, ap)| ap).collect();

    MapSummary {
        map50: aps.first().copied().unwrap_or(0.0),
        map50_95: calculate_coco_map(&aps),
        ap_per_threshold,
    }
}

/// Calculate mAP across multiple IoU thresholds (COCO-style).
///
/// The arithmetic mean of the AP values, `0.0` when there are none.
///
/// # Example
///
/// ```
/// use det_eval::metrics::ap::calculate_coco_map;
///
/// // AP values at IoU thresholds [0.5, 0.55, 0.6, ..., 0.95]
/// let ap_values = vec![0.9, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6, 0.55, 0.5, 0.45];
/// let coco_map = calculate_coco_map(&ap_values);
/// assert!((coco_map - 0.675).abs() < 0.001);
/// ```
pub fn calculate_coco_map(ap_at_ious: &[f64]) -> f64 {
    if ap_at_ious.is_empty() {
        return 0.0;
    }

    ap_at_ious.iter().sum::<f64>() / ap_at_ious.len() as f64
}
