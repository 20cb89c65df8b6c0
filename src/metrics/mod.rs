//! Metrics calculation modules for detection evaluation.

pub mod iou;
pub mod ap;
pub mod precision_recall;
pub mod f1_score;
pub mod correlation;

pub use iou::calculate_iou;
pub use ap::{ap_at_threshold, calculate_ap, calculate_coco_map, calculate_map, ApMatching, MapSummary};
pub use precision_recall::{calculate_precision_recall, precision_envelope, PrecisionRecall};
pub use f1_score::calculate_f1_score;
pub use correlation::{mean, pearson_correlation, std_dev};
