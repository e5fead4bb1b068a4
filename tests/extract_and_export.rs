#[path = "common/mod.rs"]
mod common;

use common::*;
use retl_threads::{init_thread_pool, ExportFormat, Record, ThreadETL};
use serde_json::json;

/// Folder run end to end: two good threads, one corrupt file, one non-JSON
/// file that the name pattern skips. Exports CSV with the fixed header.
#[test]
fn run_folder_to_csv() {
    let second = json!([
        listing(vec![post("p2", "Sidewalks, again", "Line one\nline \"two\"")]),
        listing(vec![comment("d1", "t3_p2", "ok", vec![])]),
    ]);
    let tmp = write_docs(&[
        ("a_thread.json", thread_basic().to_string()),
        ("b_thread.json", second.to_string()),
        ("c_broken.json", "[{\"kind\":".to_string()),
        ("notes.txt", "ignore me".to_string()),
    ]);
    let dir = tmp.path();
    let out = dir.join("out").join("combined.csv");

    let (outcome, summary) = ThreadETL::new()
        .input_dir(dir)
        .progress(false)
        .run_to(&out, None)
        .unwrap();

    assert_eq!(summary.documents_found, 3);
    assert_eq!(summary.documents_ok, 2);
    assert_eq!(summary.documents_failed, 1);
    assert_eq!(outcome.failures[0].document_id, "c_broken.json");
    assert_eq!(outcome.table.len(), 6);

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), Record::COLUMNS.join(","));
    let first = lines.next().unwrap();
    assert!(first.starts_with("post,p1,,bob,annarbor,Is Ann Arbor walkable?,Asking for a friend.,42,3,"));
    assert!(first.ends_with(",a_thread.json"));
    assert!(text.contains("\"Sidewalks, again\""));
    assert!(text.contains("\"Line one\nline \"\"two\"\"\""));
    assert!(!dir.join("out").join("combined.csv.tmp").exists());
}

/// JSONL export with human-readable timestamps: created_utc becomes RFC3339.
#[test]
fn jsonl_with_human_timestamps() {
    let tmp = write_docs(&[("t.json", thread_basic().to_string())]);
    let dir = tmp.path();
    let out = dir.join("rows.jsonl");

    ThreadETL::new()
        .input_dir(dir)
        .progress(false)
        .timestamps_human_readable(true)
        .run_to(&out, Some(ExportFormat::Jsonl))
        .unwrap();

    let rows = read_jsonl_values(&out);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["created_utc"], "2023-11-14T22:13:20Z");
    assert_eq!(rows[1]["type"], "comment");
    assert_eq!(rows[1]["url"], "https://reddit.com/r/annarbor/comments/p1/t/c1/");
    assert!(rows[1]["title"].is_null());
}

/// Zst export decompresses to one JSON line per record; JSON array export
/// holds the same rows.
#[test]
fn zst_and_json_array_exports() {
    let tmp = write_docs(&[("t.json", thread_basic().to_string())]);
    let dir = tmp.path();
    let etl = ThreadETL::new().input_dir(dir).progress(false).parallel_documents(false);
    let outcome = etl.run().unwrap();

    let zst = dir.join("rows.zst");
    assert_eq!(etl.export(&outcome, &zst, ExportFormat::Zst).unwrap(), 4);
    let lines = decompress_zst_lines(&zst);
    assert_eq!(lines.len(), 4);
    let back: Record = serde_json::from_str(&lines[2]).unwrap();
    assert_eq!(back.id.as_deref(), Some("c2"));
    assert_eq!(back.source_document.as_deref(), Some("t.json"));

    let arr = dir.join("rows.json");
    etl.export(&outcome, &arr, ExportFormat::Json { pretty: true }).unwrap();
    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&arr).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 4);
}

/// Recursive discovery uses relative paths as document ids; the default is flat.
#[test]
fn discovery_flat_and_recursive() {
    let tmp = write_docs(&[
        ("top.JSON", thread_basic().to_string()),
        ("2024/nested.json", thread_basic().to_string()),
    ]);
    let dir = tmp.path();

    let flat = ThreadETL::new().input_dir(dir).discover().unwrap();
    assert_eq!(flat.iter().map(|j| j.document_id.as_str()).collect::<Vec<_>>(), vec!["top.JSON"]);

    let deep = ThreadETL::new().input_dir(dir).recursive(true).discover().unwrap();
    assert_eq!(
        deep.iter().map(|j| j.document_id.as_str()).collect::<Vec<_>>(),
        vec!["2024/nested.json", "top.JSON"]
    );
}

/// An empty or missing folder is not an error: empty table, no failures.
#[test]
fn empty_folder_yields_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = ThreadETL::new()
        .input_dir(dir.path().join("missing"))
        .progress(false)
        .run()
        .unwrap();
    assert!(outcome.table.is_empty());
    assert!(outcome.failures.is_empty());
}

/// An unknown output extension with no explicit format is rejected up front.
#[test]
fn unknown_export_extension_is_rejected() {
    let tmp = write_docs(&[("t.json", thread_basic().to_string())]);
    let dir = tmp.path();
    let err = ThreadETL::new()
        .input_dir(dir)
        .progress(false)
        .run_to(&dir.join("rows.parquet"), None)
        .unwrap_err();
    assert!(err.to_string().contains("cannot infer export format"));
}

/// The rayon global pool is built once per process. A later request for a
/// different size is reported as not installed, and runs that ask for their
/// own parallelism still complete on the existing pool.
#[test]
fn second_thread_pool_request_is_ignored() {
    init_thread_pool(Some(2));
    assert!(!init_thread_pool(Some(3)));
    assert!(!init_thread_pool(None));
    assert!(!init_thread_pool(Some(0)));

    let tmp = write_docs(&[("t.json", thread_basic().to_string())]);
    let outcome = ThreadETL::new()
        .input_dir(tmp.path())
        .parallelism(5)
        .progress(false)
        .run()
        .unwrap();
    assert_eq!(outcome.table.len(), 4);
}
