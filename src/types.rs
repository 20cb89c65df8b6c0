//! Core data types for detections, ground truth and per-image results.

use serde::{Deserialize, Serialize};

/// Represents a bounding box in normalized center-size format.
///
/// All values are relative to the image dimensions, so they usually lie in
/// `[0, 1]`:
/// - cx: Horizontal center
/// - cy: Vertical center
/// - width: Box width
/// - height: Box height
///
/// A zero width or height is a degenerate, zero-area box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its center and size.
    pub fn new(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self { cx, cy, width, height }
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get the left coordinate (cx - width / 2).
    pub fn left(&self) -> f64 {
        self.cx - self.width / 2.0
    }

    /// Get the top coordinate (cy - height / 2).
    pub fn top(&self) -> f64 {
        self.cy - self.height / 2.0
    }

    /// Get the right coordinate (cx + width / 2).
    pub fn right(&self) -> f64 {
        self.cx + self.width / 2.0
    }

    /// Get the bottom coordinate (cy + height / 2).
    pub fn bottom(&self) -> f64 {
        self.cy + self.height / 2.0
    }

    /// Check if the bounding box is valid (positive dimensions).
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A single predicted object, as produced by the external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub bbox: BoundingBox,
    /// Confidence score in `[0, 1]`.
    pub confidence: f64,
    /// Per-class probabilities, when the detector exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_probabilities: Option<Vec<f64>>,
}

impl Detection {
    /// Create a detection carrying only a scalar confidence.
    pub fn new(label: impl Into<String>, bbox: BoundingBox, confidence: f64) -> Self {
        Self {
            label: label.into(),
            bbox,
            confidence,
            class_probabilities: None,
        }
    }

    /// Attach a per-class probability distribution.
    pub fn with_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.class_probabilities = Some(probabilities);
        self
    }
}

/// An annotated object parsed from a label record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthBox {
    pub label: String,
    pub bbox: BoundingBox,
    /// Set once by the matcher when a prediction claims this box.
    #[serde(default)]
    pub matched: bool,
}

impl GroundTruthBox {
    /// Create an unmatched ground truth box.
    pub fn new(label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            bbox,
            matched: false,
        }
    }
}

/// Metrics for a single evaluated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerImageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    #[serde(rename = "mAP50")]
    pub map50: f64,
    #[serde(rename = "mAP50-95")]
    pub map50_95: f64,
}

/// A paired observation used for correlation analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSample {
    pub x: f64,
    pub y: f64,
}

impl CorrelationSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Everything the evaluator needs to know about one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSample {
    pub image_id: String,
    pub detections: Vec<Detection>,
    pub ground_truth: Vec<GroundTruthBox>,
}

impl ImageSample {
    pub fn new(
        image_id: impl Into<String>,
        detections: Vec<Detection>,
        ground_truth: Vec<GroundTruthBox>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            detections,
            ground_truth,
        }
    }
}
