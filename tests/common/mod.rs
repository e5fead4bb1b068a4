#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tempfile::TempDir;

/// Wrap things into a listing container: `{kind: Listing, data: {children}}`.
pub fn listing(children: Vec<Value>) -> Value {
    json!({ "kind": "Listing", "data": { "after": null, "before": null, "children": children } })
}

/// A `t3` post thing.
pub fn post(id: &str, title: &str, selftext: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id, "author": "bob", "subreddit": "annarbor", "title": title,
            "selftext": selftext, "score": 42, "num_comments": 3,
            "created_utc": 1700000000.0, "url": format!("https://www.reddit.com/r/annarbor/comments/{id}/")
        }
    })
}

/// A `t1` comment thing with the given replies (empty → `""` sentinel, as the archive does).
pub fn comment(id: &str, parent_id: &str, body: &str, replies: Vec<Value>) -> Value {
    let replies = if replies.is_empty() { json!("") } else { listing(replies) };
    json!({
        "kind": "t1",
        "data": {
            "id": id, "parent_id": parent_id, "author": format!("user_{id}"),
            "subreddit": "annarbor", "body": body, "score": 1,
            "created_utc": 1700000100.0,
            "permalink": format!("/r/annarbor/comments/p1/t/{id}/"),
            "replies": replies
        }
    })
}

/// A `more` stub as found at the tail of large comment listings.
pub fn more_stub(ids: &[&str]) -> Value {
    json!({ "kind": "more", "data": { "count": ids.len(), "children": ids } })
}

/// Post `p1` with comment `c1` (→ reply `c2`), plus sibling `c3`.
pub fn thread_basic() -> Value {
    json!([
        listing(vec![post("p1", "Is Ann Arbor walkable?", "  Asking for a friend.  ")]),
        listing(vec![
            comment("c1", "t3_p1", "Very walkable downtown.", vec![
                comment("c2", "t1_c1", "Agreed.", vec![]),
            ]),
            comment("c3", "t3_p1", "Not in the suburbs.", vec![]),
        ]),
    ])
}

/// Write `docs` as JSON files under a fresh temp dir. The dir is removed when
/// the returned guard drops.
pub fn write_docs(docs: &[(&str, String)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in docs {
        let p = dir.path().join(name);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        let mut f = File::create(&p).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }
    dir
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Read a JSONL file into values (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<Value> {
    read_lines(path).iter().map(|s| serde_json::from_str(s).unwrap()).collect()
}

/// Decompress a `.zst` file and collect its non-empty lines.
pub fn decompress_zst_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let dec = zstd::stream::read::Decoder::new(f).unwrap();
    let r = BufReader::new(dec);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}
