//! Intersection over Union (IoU) calculation.

use crate::types::BoundingBox;

/// Overlap extents at or below this are rounding noise from shared edges.
const EXTENT_EPSILON: f64 = 1e-12;

fn snap_extent(extent: f64) -> f64 {
    if extent <= EXTENT_EPSILON {
        0.0
    } else {
        extent
    }
}

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
/// Boxes that do not overlap have an intersection of exactly zero, and two
/// degenerate boxes (zero union) yield `0.0` instead of dividing by zero.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Example
///
/// ```
/// use det_eval::metrics::iou::calculate_iou;
/// use det_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
/// let bbox2 = BoundingBox::new(0.55, 0.55, 0.2, 0.2);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    // Intersection rectangle, clamped per axis
    let inter_width = snap_extent(bbox1.right().min(bbox2.right()) - bbox1.left().max(bbox2.left()));
    let inter_height = snap_extent(bbox1.bottom().min(bbox2.bottom()) - bbox1.top().max(bbox2.top()));
    let intersection_area = inter_width * inter_height;

    let union_area = bbox1.area() + bbox2.area() - intersection_area;

    // Avoid division by zero
    if union_area <= 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a 2D vector where `result[i][j]` is the IoU between `bboxes1[i]` and `bboxes2[j]`.
///
/// # Example
///
/// ```
/// use det_eval::metrics::iou::calculate_iou_matrix;
/// use det_eval::types::BoundingBox;
///
/// let bboxes1 = vec![BoundingBox::new(0.5, 0.5, 0.2, 0.2)];
/// let bboxes2 = vec![BoundingBox::new(0.55, 0.55, 0.2, 0.2)];
/// let iou_matrix = calculate_iou_matrix(&bboxes1, &bboxes2);
/// assert_eq!(iou_matrix.len(), 1);
/// assert_eq!(iou_matrix[0].len(), 1);
/// ```
pub fn calculate_iou_matrix(bboxes1: &[BoundingBox], bboxes2: &[BoundingBox]) -> Vec<Vec<f64>> {
    bboxes1
        .iter()
        .map(|bbox1| {
            bboxes2
                .iter()
                .map(|bbox2| calculate_iou(bbox1, bbox2))
                .collect()
        })
        .collect()
}
