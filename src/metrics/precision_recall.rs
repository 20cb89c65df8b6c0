//! Precision and Recall calculation.

/// Container for precision and recall values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Calculate precision and recall from TP, FP, and FN counts.
///
/// Both ratios fall back to `0.0` when their denominator is zero.
///
/// # Example
///
/// ```
/// use det_eval::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 2, 3);
/// assert_eq!(pr.precision, 0.8); // 8 / (8 + 2)
/// assert!((pr.recall - 0.7272).abs() < 0.001); // 8 / (8 + 3)
/// ```
pub fn calculate_precision_recall(
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
) -> PrecisionRecall {
    let precision = if true_positives + false_positives > 0 {
        true_positives as f64 / (true_positives + false_positives) as f64
    } else {
        0.0
    };

    let recall = if true_positives + false_negatives > 0 {
        true_positives as f64 / (true_positives + false_negatives) as f64
    } else {
        0.0
    };

    PrecisionRecall {
        precision,
        recall,
        true_positives,
        false_positives,
        false_negatives,
    }
}

/// Raw precision-recall curve, one point per prediction in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precisions: Vec<f64>,
    pub recalls: Vec<f64>,
}

impl PrecisionRecallCurve {
    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }
}

/// Calculate precision-recall curve from cumulative true/false positive counts.
///
/// # Arguments
///
/// * `is_true_positive` - Whether each prediction is a true positive, in evaluation order
/// * `num_ground_truth` - Total number of ground truth annotations
///
/// Recall is `0.0` at every point when there is no ground truth.
pub fn calculate_precision_recall_curve(
    is_true_positive: &[bool],
    num_ground_truth: usize,
) -> PrecisionRecallCurve {
    let mut curve = PrecisionRecallCurve {
        precisions: Vec::with_capacity(is_true_positive.len()),
        recalls: Vec::with_capacity(is_true_positive.len()),
    };
    let mut tp = 0usize;
    let mut fp = 0usize;

    for &is_tp in is_true_positive {
        if is_tp {
            tp += 1;
        } else {
            fp += 1;
        }

        let precision = tp as f64 / (tp + fp) as f64;

        let recall = if num_ground_truth > 0 {
            tp as f64 / num_ground_truth as f64
        } else {
            0.0
        };

        curve.precisions.push(precision);
        curve.recalls.push(recall);
    }

    curve
}

/// Pad a curve with the sentinel points `recall = [0, ..., 1]` and
/// `precision = [0, ..., 0]`.
///
/// Returns `(recalls, precisions)`.
pub fn pad_curve(curve: &PrecisionRecallCurve) -> (Vec<f64>, Vec<f64>) {
    let mut recalls = Vec::with_capacity(curve.len() + 2);
    recalls.push(0.0);
    recalls.extend_from_slice(&curve.recalls);
    recalls.push(1.0);

    let mut precisions = Vec::with_capacity(curve.len() + 2);
    precisions.push(0.0);
    precisions.extend_from_slice(&curve.precisions);
    precisions.push(0.0);

    (recalls, precisions)
}

/// Replace every precision value by the maximum of itself and everything to its right.
///
/// The result is non-increasing from left to right.
///
/// # Example
///
/// ```
/// use det_eval::metrics::precision_recall::precision_envelope;
///
/// let mut precisions = vec![0.0, 1.0, 0.5, 0.67, 0.0];
/// precision_envelope(&mut precisions);
/// assert_eq!(precisions, vec![1.0, 1.0, 0.67, 0.67, 0.0]);
/// ```
pub fn precision_envelope(precisions: &mut [f64]) {
    for i in (0..precisions.len().saturating_sub(1)).rev() {
        precisions[i] = precisions[i].max(precisions[i + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_precision_recall() {
        let pr = calculate_precision_recall(10, 0, 0);
        assert_eq!(pr.precision, 1.0);
        assert_eq!(pr.recall, 1.0);
    }

    #[test]
    fn test_zero_precision() {
        let pr = calculate_precision_recall(0, 10, 5);
        assert_eq!(pr.precision, 0.0);
        assert_eq!(pr.recall, 0.0);
    }

    #[test]
    fn test_zero_denominators() {
        let pr = calculate_precision_recall(0, 0, 0);
        assert_eq!(pr.precision, 0.0);
        assert_eq!(pr.recall, 0.0);
    }

    #[test]
    fn test_precision_recall_values() {
        let pr = calculate_precision_recall(8, 2, 3);
        assert!((pr.precision - 0.8).abs() < 1e-10);
        assert!((pr.recall - 8.0 / 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_precision_recall_curve() {
        let is_tp = vec![true, true, false, true, false];
        let curve = calculate_precision_recall_curve(&is_tp, 4);
        assert_eq!(curve.len(), 5);

        // First detection: TP
        assert!((curve.precisions[0] - 1.0).abs() < 1e-10);
        assert!((curve.recalls[0] - 0.25).abs() < 1e-10);

        // Third detection: FP
        assert!((curve.precisions[2] - 2.0 / 3.0).abs() < 1e-10);
        assert!((curve.recalls[2] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_curve_without_ground_truth() {
        let curve = calculate_precision_recall_curve(&[false, false], 0);
        assert!(curve.recalls.iter().all(|&r| r == 0.0));
        assert!(curve.precisions.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_pad_curve() {
        let curve = calculate_precision_recall_curve(&[true], 2);
        let (recalls, precisions) = pad_curve(&curve);
        assert_eq!(recalls, vec![0.0, 0.5, 1.0]);
        assert_eq!(precisions, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_envelope_is_non_increasing() {
        let mut precisions = vec![0.0, 0.5, 1.0, 0.33, 0.75, 0.2, 0.0];
        precision_envelope(&mut precisions);
        for pair in precisions.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(precisions[0], 1.0);
    }

    #[test]
    fn test_envelope_empty() {
        let mut precisions: Vec<f64> = vec![];
        precision_envelope(&mut precisions);
        assert!(precisions.is_empty());
    }
}
