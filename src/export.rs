//! Table export: CSV, JSONL, a single JSON array, or zstd-compressed JSONL.
//! Output is written next to the destination and promoted atomically.

use crate::corpus::RecordTable;
use crate::date::epoch_to_rfc3339;
use crate::record::Record;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zstd::stream::write::Encoder as ZstdEncoder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Jsonl,
    Json { pretty: bool },
    Zst,
}

impl ExportFormat {
    /// Guess from the output file extension (`.csv`, `.jsonl`/`.ndjson`, `.json`, `.zst`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "jsonl" | "ndjson" => Some(ExportFormat::Jsonl),
            "json" => Some(ExportFormat::Json { pretty: false }),
            "zst" => Some(ExportFormat::Zst),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    pub human_readable_timestamps: bool,
    pub write_buffer_bytes: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { human_readable_timestamps: false, write_buffer_bytes: 256 * 1024 }
    }
}

fn tmp_path_for(out: &Path) -> PathBuf {
    let name = out.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "export".into());
    out.with_file_name(format!("{name}.tmp"))
}

/// Write `table` to `out_path`. Returns the number of rows written.
pub fn export_table(table: &RecordTable, out_path: &Path, format: ExportFormat, opts: ExportOptions) -> Result<u64> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = tmp_path_for(out_path);
    let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::with_capacity(opts.write_buffer_bytes.max(8 * 1024), file);
    let human = opts.human_readable_timestamps;

    let written = match format {
        ExportFormat::Csv => write_csv(&mut w, table.records(), human)?,
        ExportFormat::Jsonl => write_jsonl(&mut w, table.records(), human)?,
        ExportFormat::Json { pretty } => write_json_array(&mut w, table.records(), pretty, human)?,
        ExportFormat::Zst => {
            let mut enc = ZstdEncoder::new(&mut w, 19)?;
            let n = write_jsonl(&mut enc, table.records(), human)?;
            enc.finish()?;
            n
        }
    };
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);

    replace_file_atomic_backoff(&tmp, out_path)?;
    tracing::info!(path = %out_path.display(), rows = written, ?format, "table exported");
    Ok(written)
}

/// Record as a JSON object with every column present.
pub fn record_to_value(r: &Record, human_timestamps: bool) -> Result<Value> {
    let mut v = serde_json::to_value(r)?;
    if human_timestamps {
        if let Some(obj) = v.as_object_mut() {
            if let Some(slot) = obj.get_mut("created_utc") {
                if let Some(s) = r.created_at.and_then(epoch_to_rfc3339) {
                    *slot = Value::String(s);
                }
            }
        }
    }
    Ok(v)
}

fn write_jsonl<W: Write>(w: &mut W, records: &[Record], human: bool) -> Result<u64> {
    let mut n = 0u64;
    for r in records {
        if human {
            serde_json::to_writer(&mut *w, &record_to_value(r, true)?)?;
        } else {
            serde_json::to_writer(&mut *w, r)?;
        }
        w.write_all(b"\n")?;
        n += 1;
    }
    Ok(n)
}

fn write_json_array<W: Write>(w: &mut W, records: &[Record], pretty: bool, human: bool) -> Result<u64> {
    let values = records
        .iter()
        .map(|r| record_to_value(r, human))
        .collect::<Result<Vec<_>>>()?;
    if pretty {
        serde_json::to_writer_pretty(&mut *w, &values)?;
    } else {
        serde_json::to_writer(&mut *w, &values)?;
    }
    Ok(values.len() as u64)
}

fn write_csv<W: Write>(w: &mut W, records: &[Record], human: bool) -> Result<u64> {
    write_csv_row(w, Record::COLUMNS.iter().map(|c| Some(Cow::Borrowed(*c))))?;
    for r in records {
        write_csv_row(w, csv_cells(r, human))?;
    }
    Ok(records.len() as u64)
}

/// Cells in `Record::COLUMNS` order; `None` is an empty cell.
fn csv_cells(r: &Record, human: bool) -> [Option<Cow<'_, str>>; 12] {
    fn borrowed(s: &Option<String>) -> Option<Cow<'_, str>> {
        s.as_deref().map(Cow::Borrowed)
    }
    let created = r.created_at.map(|ts| match human.then(|| epoch_to_rfc3339(ts)).flatten() {
        Some(s) => Cow::Owned(s),
        None => Cow::Owned(ts.to_string()),
    });
    [
        Some(Cow::Borrowed(r.kind.as_str())),
        borrowed(&r.id),
        borrowed(&r.parent_id),
        borrowed(&r.author),
        borrowed(&r.subreddit),
        borrowed(&r.title),
        Some(Cow::Borrowed(r.body.as_str())),
        r.score.map(|n| Cow::Owned(n.to_string())),
        r.num_comments.map(|n| Cow::Owned(n.to_string())),
        created,
        borrowed(&r.url),
        borrowed(&r.source_document),
    ]
}

fn write_csv_row<'a, W, I>(w: &mut W, cells: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Option<Cow<'a, str>>>,
{
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if let Some(cell) = cell {
            w.write_all(csv_escape(&cell).as_bytes())?;
        }
    }
    w.write_all(b"\n")?;
    Ok(())
}

/// RFC 4180 quoting: wrap in quotes when the cell holds a delimiter, quote,
/// or line break; double embedded quotes.
pub fn csv_escape(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
