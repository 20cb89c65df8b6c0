//! # det-eval
//!
//! A Rust library for evaluating object detection predictions against ground
//! truth for a fixed set of classes, with uncertainty correlation analysis.
//!
//! This library provides:
//! - **IoU** between normalized center-size boxes
//! - **Precision / Recall / F1** from exclusive greedy matching at IoU 0.5
//! - **mAP50** and **mAP50-95** from per-image AP with precision envelope smoothing
//! - **Uncertainty statistics**: per-class mean/std and Pearson correlation of
//!   uncertainty with object size and localization accuracy
//!
//! ## Quick Start
//!
//! ```rust
//! use det_eval::{BoundingBox, DatasetEvaluator, Detection, EvalConfig, GroundTruthBox, ImageSample};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EvalConfig::new(["bird", "cat"]);
//! let mut evaluator = DatasetEvaluator::new(config)?;
//!
//! let bbox = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
//! evaluator.process_image(ImageSample::new(
//!     "img_001",
//!     vec![Detection::new("bird", bbox, 0.9)],
//!     vec![GroundTruthBox::new("bird", bbox)],
//! ));
//!
//! let report = evaluator.report();
//! assert!((report.map50 - 1.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Label records
//!
//! Ground truth is read from one text record per image, one object per line:
//!
//! ```text
//! <class_index> <cx> <cy> <w> <h>
//! ```
//!
//! See [`loader`] for the parser and the predictions JSON format.

pub mod error;
pub mod types;
pub mod config;
pub mod loader;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod uncertainty;
pub mod stats;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{EvalError, Result};
pub use types::{
    BoundingBox, CorrelationSample, Detection, GroundTruthBox, ImageSample, PerImageMetrics,
};
pub use config::EvalConfig;
pub use evaluator::{DatasetEvaluator, DatasetReport, ImageEvaluation};
pub use loader::{load_label_file, load_predictions_from_file, parse_label_record, ClassNames};
pub use matching::{match_and_score, MatchSummary};
pub use metrics::ap::{ap_at_threshold, calculate_map, ApMatching};
pub use metrics::iou::calculate_iou;
pub use stats::EvalStats;
pub use uncertainty::{ConfidenceComplement, Entropy, ScoreEvidence, UncertaintyKind, UncertaintyPolicy};
