mod common;

use common::temp_file;
use tabstat::{load_with_fallback, CellValue, DataSource, Dataset, EmbeddedSource, Error, FileSource, FnSource};

const PAYLOAD: &str = r#"{
    "success": true,
    "columns": ["name", "score"],
    "data": [
        {"score": 3.5, "name": "a"},
        {"name": "b"},
        {"name": "c", "score": "4"}
    ]
}"#;

#[test]
fn test_file_source() {
    let file = temp_file(PAYLOAD, ".json");
    let source = FileSource::new(file.path());
    let ds = source.fetch().unwrap();

    assert_eq!(ds.columns(), &["name", "score"]);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.get(0, "score"), Some(&CellValue::Number(3.5)));
    assert_eq!(ds.get(1, "score"), None);
    assert_eq!(ds.get(2, "score"), Some(&CellValue::from("4")));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Dataset::from_json_file("/definitely/not/here.json");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_reported_failure_falls_back() {
    let failing = EmbeddedSource::new("api", r#"{"success": false, "error": "upload expired"}"#);
    assert!(matches!(failing.fetch(), Err(Error::Load(msg)) if msg == "upload expired"));

    let fallback = EmbeddedSource::new("page", PAYLOAD);
    let ds = load_with_fallback(&failing, &fallback).unwrap();
    assert_eq!(ds.row_count(), 3);
}

#[test]
fn test_remote_then_file() {
    let file = temp_file(r#"[{"x": 1}, {"x": 2}]"#, ".json");
    let remote = FnSource::new("remote", || Err(Error::Load("offline".into())));
    let ds = load_with_fallback(&remote, &FileSource::new(file.path())).unwrap();
    assert_eq!(ds.row_count(), 2);

    // both failing reports the fallback's error
    let missing = FileSource::new("/definitely/not/here.json");
    assert!(matches!(load_with_fallback(&remote, &missing), Err(Error::Io(_))));
}

#[test]
fn test_loaded_dataset_analyzes() {
    let ds = Dataset::from_json(PAYLOAD).unwrap();
    let profile = tabstat::analyze(&ds).unwrap();
    let score = profile.get("score").unwrap().as_numeric().unwrap();
    assert_eq!(score.stats.count, 2);
    assert_eq!(score.missing, 1);
    assert_eq!(score.stats.mean, 3.75);
}
