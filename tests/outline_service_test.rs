//! Tests for OutlineService

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use versetree::application::services::OutlineService;
use versetree::application::ApplicationError;
use versetree::domain::ScratchPolicy;
use versetree::infrastructure::traits::RealFileSystem;
use versetree::util::testing::{chapter, init_test_setup, read_json, write_json};

fn service() -> OutlineService {
    OutlineService::new(Arc::new(RealFileSystem), 2)
}

fn fixture(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    write_json(&path, value);
    path
}

#[test]
fn given_unit_file_when_aggregating_then_writes_parent_text_in_same_shape() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "MLS_en.json", &chapter(1, 4));
    let output = temp.path().join("out/aggregated.json");

    // Act
    let report = service().aggregate(&input, &output, false).unwrap();

    // Assert
    assert_eq!(report.nodes, 5);
    assert_eq!(report.with_text, 3);
    let written = read_json(&output);
    assert!(written.is_object());
    assert_eq!(written["text"], "1.1.1 text\n\n1.2.1 text");
    assert_eq!(written["children"][0]["text"], "1.1.1 text");
}

#[test]
fn given_list_document_when_saving_then_keeps_list_shape() {
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "list.json", &json!([chapter(1, 4)]));

    service().aggregate(&input, &input, false).unwrap();

    let written = read_json(&input);
    assert_eq!(written.as_array().map(Vec::len), Some(1));
}

#[test]
fn given_missing_file_when_loading_then_returns_not_found() {
    let temp = TempDir::new().unwrap();

    let err = service().load(&temp.path().join("nope.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[test]
fn given_invalid_json_when_loading_then_reports_decode_failure_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Json { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn given_output_under_a_regular_file_when_aggregating_then_reports_io_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "MLS_en.json", &chapter(1, 4));
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    // Act
    let err = service()
        .aggregate(&input, &blocker.join("out.json"), false)
        .unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Io { .. }));
    assert!(err.to_string().contains("out.json"));
}

#[test]
fn given_children_as_string_when_loading_then_fails_validation() {
    let temp = TempDir::new().unwrap();
    let path = fixture(
        &temp,
        "bad.json",
        &json!({"level": "chapter", "id": "1", "title": "c", "children": "x"}),
    );

    let err = service().load(&path).unwrap_err();

    match err {
        ApplicationError::Validation(v) => assert_eq!(v.path, "root[0]/1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_unit_when_exporting_parents_then_writes_internal_nodes() {
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "MLS_en.json", &chapter(2, 6));
    let output = temp.path().join("parents.json");

    let n = service().export_parents(&input, &output, false).unwrap();

    assert_eq!(n, 3);
    let written = read_json(&output);
    assert_eq!(written[0]["id"], "2");
    assert_eq!(written[2]["span"], "4-6");
}

#[test]
fn given_unit_with_text_when_stripping_then_leaf_text_is_removed() {
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "MLS_en.json", &chapter(1, 4));
    let output = temp.path().join("stripped.json");

    let n = service()
        .strip(&input, &output, &ScratchPolicy::default())
        .unwrap();

    assert_eq!(n, 5);
    let written = read_json(&output);
    assert!(written["children"][0]["children"][0].get("text").is_none());
}

#[test]
fn given_segments_spans_when_filling_then_leaves_get_root_lines() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = fixture(
        &temp,
        "outline.json",
        &json!({"level": "chapter", "id": "1", "title": "c", "children": [
            {"level": "verse", "id": "1.1", "title": "", "segments_span": "1-2"},
            {"level": "verse", "id": "1.2", "title": "", "segments_span": "3"},
            {"level": "verse", "id": "1.3", "title": "", "segments_span": "9-12"}
        ]}),
    );
    let root_text = temp.path().join("chapter_root_bo.txt");
    std::fs::write(&root_text, "line one\nline two\nline three\n").unwrap();
    let output = temp.path().join("filled.json");

    // Act
    let fill = service().fill_segments(&input, &root_text, &output).unwrap();

    // Assert
    assert_eq!(fill.filled, 2);
    assert_eq!(fill.skipped.len(), 1);
    assert_eq!(fill.skipped[0].0, "root[0]/1/1.3");
    let written = read_json(&output);
    assert_eq!(written["children"][0]["text"], "line one\nline two");
    assert_eq!(written["children"][1]["text"], "line three");
    assert!(written["children"][2].get("text").is_none());
}

#[test]
fn given_root_text_files_when_counting_then_counts_non_empty_lines() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("ch1")).unwrap();
    std::fs::write(temp.path().join("ch1/ch1_root_bo.txt"), "a\n\nb\n   \nc\n").unwrap();
    std::fs::write(temp.path().join("ch1/ch1_en.txt"), "ignored\n").unwrap();
    std::fs::write(temp.path().join("root_bo.txt"), "x\n").unwrap();

    // Act
    let counts = service().count_root_lines(temp.path()).unwrap();

    // Assert
    let lines: Vec<usize> = counts.iter().map(|c| c.lines).collect();
    assert_eq!(counts.len(), 2);
    assert_eq!(lines.iter().sum::<usize>(), 4);
}

#[test]
fn given_indent_four_when_saving_then_uses_four_spaces() {
    let temp = TempDir::new().unwrap();
    let input = fixture(&temp, "one.json", &json!({"level": "chapter", "id": "1", "title": "བོད"}));
    let svc = OutlineService::new(Arc::new(RealFileSystem), 4);
    let outline = svc.load(&input).unwrap();

    svc.save(&input, &outline).unwrap();

    let content = std::fs::read_to_string(&input).unwrap();
    assert!(content.contains("\n    \"title\": \"བོད\""));
}
