//! Loading utilities for label records, class names and predictions.
//!
//! Label records use one line per annotated object:
//!
//! ```text
//! <class_index> <cx> <cy> <w> <h>
//! ```
//!
//! with coordinates normalized to `[0, 1]`. Lines that cannot be read are
//! skipped, and a missing record file means the image has no annotations.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::types::{BoundingBox, Detection, GroundTruthBox};

/// Index-to-name table for label records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// One name per line; blank lines are ignored.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    /// A JSON array of names, e.g. `["person", "bird"]`.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let names: Vec<String> = serde_json::from_str(json_str)?;
        Ok(Self { names })
    }

    /// Read a `.json` array or a newline-separated text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Ok(Self::from_lines(&text))
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parsed ground truth for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelRecord {
    pub boxes: Vec<GroundTruthBox>,
    /// Non-blank lines that were discarded
    pub skipped_lines: usize,
}

fn parse_label_line(line: &str, class_names: &ClassNames) -> Option<GroundTruthBox> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return None;
    }

    let class_index: usize = tokens[0].parse().ok()?;
    let label = class_names.get(class_index)?;

    let mut values = [0.0f64; 4];
    for (value, token) in values.iter_mut().zip(&tokens[1..]) {
        *value = token.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
    }
    let [cx, cy, width, height] = values;
    if width < 0.0 || height < 0.0 {
        return None;
    }

    Some(GroundTruthBox::new(label, BoundingBox::new(cx, cy, width, height)))
}

/// Parse a label record.
///
/// # Example
///
/// ```
/// use det_eval::loader::{parse_label_record, ClassNames};
///
/// let names = ClassNames::new(["person", "bird"]);
/// let record = parse_label_record("1 0.5 0.5 0.2 0.2\n1 0.5 0.5\n", &names);
/// assert_eq!(record.boxes.len(), 1);
/// assert_eq!(record.boxes[0].label, "bird");
/// assert_eq!(record.skipped_lines, 1);
/// ```
pub fn parse_label_record(text: &str, class_names: &ClassNames) -> LabelRecord {
    let mut record = LabelRecord::default();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_label_line(line, class_names) {
            Some(gt) => record.boxes.push(gt),
            None => {
                debug!(line = line_no + 1, content = line, "skipping malformed label line");
                record.skipped_lines += 1;
            }
        }
    }

    record
}

/// Read and parse a label record file.
///
/// A file that does not exist yields an empty record.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_label_file<P: AsRef<Path>>(path: P, class_names: &ClassNames) -> Result<LabelRecord> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => {
            let record = parse_label_record(&text, class_names);
            if record.skipped_lines > 0 {
                warn!(
                    path = %path.display(),
                    skipped = record.skipped_lines,
                    "label record contains malformed lines"
                );
            }
            Ok(record)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no label record, assuming no objects");
            Ok(LabelRecord::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Predictions keyed by image identifier.
pub type Predictions = BTreeMap<String, Vec<Detection>>;

/// Load predictions from a JSON file.
///
/// The file holds an object mapping image identifiers to detection arrays:
///
/// ```json
/// {
///   "img_001": [
///     {"label": "bird", "bbox": {"cx": 0.5, "cy": 0.5, "width": 0.2, "height": 0.2}, "confidence": 0.91}
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a detection
/// is invalid.
pub fn load_predictions_from_file<P: AsRef<Path>>(path: P) -> Result<Predictions> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let predictions: Predictions = serde_json::from_reader(reader)?;

    validate_predictions(&predictions)?;

    Ok(predictions)
}

/// Load predictions from a JSON string.
///
/// # Example
///
/// ```
/// use det_eval::loader::load_predictions_from_str;
///
/// let json = r#"{
///     "img_001": [
///         {"label": "bird", "bbox": {"cx": 0.5, "cy": 0.5, "width": 0.2, "height": 0.2}, "confidence": 0.91}
///     ],
///     "img_002": []
/// }"#;
/// let predictions = load_predictions_from_str(json).unwrap();
/// assert_eq!(predictions["img_001"].len(), 1);
/// ```
pub fn load_predictions_from_str(json_str: &str) -> Result<Predictions> {
    let predictions: Predictions = serde_json::from_str(json_str)?;
    validate_predictions(&predictions)?;
    Ok(predictions)
}

fn validate_predictions(predictions: &Predictions) -> Result<()> {
    for (image_id, detections) in predictions {
        for (idx, det) in detections.iter().enumerate() {
            let size_ok = |v: f64| v.is_finite() && v >= 0.0;
            if !(size_ok(det.bbox.width) && size_ok(det.bbox.height)) {
                return Err(EvalError::InvalidBoundingBox(format!(
                    "Detection {} of image {} has negative or non-finite dimensions",
                    idx, image_id
                )));
            }
            if !(0.0..=1.0).contains(&det.confidence) {
                return Err(EvalError::InvalidDetection(format!(
                    "Detection {} of image {} has confidence {} outside [0, 1]",
                    idx, image_id, det.confidence
                )));
            }
        }
    }

    Ok(())
}
