use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One discovered document on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentJob {
    /// Path relative to the input directory, `/`-separated.
    pub document_id: String,
    pub path: PathBuf,
}

/// Find documents under `dir` whose file name matches `pattern`.
/// Returns jobs sorted by document id. A missing directory yields nothing.
pub fn discover_documents(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<DocumentJob>> {
    let re = Regex::new(pattern).with_context(|| format!("invalid file pattern {pattern:?}"))?;
    let mut jobs = Vec::new();
    if !dir.exists() {
        return Ok(jobs);
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let ent = match entry {
            Ok(ent) => ent,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !ent.file_type().is_file() {
            continue;
        }
        let Some(name) = ent.file_name().to_str() else { continue };
        if !re.is_match(name) {
            continue;
        }
        let rel = ent.path().strip_prefix(dir).unwrap_or(ent.path());
        let document_id = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        jobs.push(DocumentJob { document_id, path: ent.path().to_path_buf() });
    }
    jobs.sort_by(|a, b| a.document_id.cmp(&b.document_id));
    Ok(jobs)
}
