//! Comprehensive tests for loader and type modules.
//!
//! Tests for BoundingBox, Detection, label record parsing, predictions loading,
//! and class name tables.

use std::fs;
use std::path::PathBuf;

use det_eval::loader::{
    load_label_file, load_predictions_from_file, load_predictions_from_str, parse_label_record,
    ClassNames,
};
use det_eval::types::{BoundingBox, Detection, GroundTruthBox};

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("det_eval_loader_tests_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn test_bounding_box_new() {
    let bbox = BoundingBox::new(0.1, 0.2, 0.3, 0.4);
    assert_eq!(bbox.cx, 0.1);
    assert_eq!(bbox.cy, 0.2);
    assert_eq!(bbox.width, 0.3);
    assert_eq!(bbox.height, 0.4);
}

#[test]
fn test_bounding_box_area() {
    let bbox = BoundingBox::new(0.5, 0.5, 0.5, 0.2);
    assert!((bbox.area() - 0.1).abs() < 1e-12);
}

#[test]
fn test_bounding_box_area_zero() {
    let bbox = BoundingBox::new(0.5, 0.5, 0.0, 0.0);
    assert_eq!(bbox.area(), 0.0);
    assert!(!bbox.is_valid());
}

#[test]
fn test_ground_truth_starts_unmatched() {
    let gt = GroundTruthBox::new("bird", BoundingBox::new(0.5, 0.5, 0.1, 0.1));
    assert!(!gt.matched);
}

#[test]
fn test_detection_serialization_roundtrip() {
    let det = Detection::new("bird", BoundingBox::new(0.5, 0.5, 0.1, 0.1), 0.8)
        .with_probabilities(vec![0.8, 0.15, 0.05]);
    let json = serde_json::to_string(&det).unwrap();
    let back: Detection = serde_json::from_str(&json).unwrap();
    assert_eq!(det, back);
}

#[test]
fn test_label_record_with_blank_and_whitespace_lines() {
    let names = ClassNames::new(["bird"]);
    let text = "\n   \n0\t0.5\t0.5\t0.1\t0.1\n  0 0.2 0.2 0.1 0.1  \n";
    let record = parse_label_record(text, &names);
    assert_eq!(record.boxes.len(), 2);
    assert_eq!(record.skipped_lines, 0);
}

#[test]
fn test_load_label_file() {
    let path = scratch_path("img_001.txt");
    fs::write(&path, "0 0.5 0.5 0.2 0.2\n1 0.1 0.1 0.05 0.05\nbad line\n").unwrap();

    let names = ClassNames::new(["bird", "cat"]);
    let record = load_label_file(&path, &names).unwrap();
    assert_eq!(record.boxes.len(), 2);
    assert_eq!(record.boxes[0].label, "bird");
    assert_eq!(record.boxes[1].label, "cat");
    assert_eq!(record.skipped_lines, 1);
}

#[test]
fn test_class_names_from_text_file() {
    let path = scratch_path("classes.txt");
    fs::write(&path, "person\nbird\ncat\n").unwrap();

    let names = ClassNames::from_file(&path).unwrap();
    assert_eq!(names.len(), 3);
    assert_eq!(names.get(2), Some("cat"));
}

#[test]
fn test_class_names_from_json_file() {
    let path = scratch_path("classes.json");
    fs::write(&path, r#"["person", "bird"]"#).unwrap();

    let names = ClassNames::from_file(&path).unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names.get(1), Some("bird"));
}

#[test]
fn test_load_predictions_from_file() {
    let path = scratch_path("predictions.json");
    fs::write(
        &path,
        r#"{
            "img_001": [
                {"label": "bird", "bbox": {"cx": 0.5, "cy": 0.5, "width": 0.2, "height": 0.2}, "confidence": 0.9},
                {"label": "cat", "bbox": {"cx": 0.1, "cy": 0.1, "width": 0.1, "height": 0.1}, "confidence": 0.4,
                 "class_probabilities": [0.6, 0.4]}
            ],
            "img_002": []
        }"#,
    )
    .unwrap();

    let predictions = load_predictions_from_file(&path).unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions["img_001"].len(), 2);
    assert_eq!(
        predictions["img_001"][1].class_probabilities.as_deref(),
        Some(&[0.6, 0.4][..])
    );
    assert!(predictions["img_002"].is_empty());
}

#[test]
fn test_load_predictions_missing_field() {
    let json = r#"{"img": [{"label": "bird", "confidence": 0.9}]}"#;
    assert!(load_predictions_from_str(json).is_err());
}

#[test]
fn test_degenerate_prediction_box_is_accepted() {
    let json = r#"{"img": [{"label": "bird", "bbox": {"cx": 0.5, "cy": 0.5, "width": 0.0, "height": 0.0}, "confidence": 0.9}]}"#;
    let predictions = load_predictions_from_str(json).unwrap();
    assert!(!predictions["img"][0].bbox.is_valid());
}
