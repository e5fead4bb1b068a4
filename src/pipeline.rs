use crate::config::FlattenOptions;
use crate::corpus::{decode_document, AggregateOutcome, CorpusAggregator, RunSummary};
use crate::error::DocumentError;
use crate::export::{export_table, ExportFormat, ExportOptions};
use crate::normalize::Normalizer;
use crate::paths::{discover_documents, DocumentJob};
use crate::progress::make_count_progress;
use crate::util::{init_thread_pool, init_tracing_once, open_with_backoff};
use anyhow::{anyhow, Result};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Folder-of-thread-documents ETL: discover, load, flatten, export.
#[derive(Clone)]
pub struct ThreadETL {
    pub(crate) opts: FlattenOptions,
}

impl Default for ThreadETL {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadETL {
    pub fn new() -> Self {
        Self { opts: FlattenOptions::default() }
    }

    pub fn from_options(opts: FlattenOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn file_pattern(mut self, pattern: impl Into<String>) -> Self { self.opts = self.opts.with_file_pattern(pattern); self }
    pub fn recursive(mut self, yes: bool) -> Self { self.opts = self.opts.with_recursive(yes); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn parallel_documents(mut self, yes: bool) -> Self { self.opts = self.opts.with_parallel_documents(yes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn timestamps_human_readable(mut self, yes: bool) -> Self { self.opts = self.opts.with_human_timestamps(yes); self }
    pub fn site_origin(mut self, origin: impl Into<String>) -> Self { self.opts = self.opts.with_site_origin(origin); self }

    // -------- Operations --------

    /// Matching documents under the input directory, sorted by id.
    pub fn discover(&self) -> Result<Vec<DocumentJob>> {
        discover_documents(&self.opts.input_dir, &self.opts.file_pattern, self.opts.recursive)
    }

    /// Load and flatten every discovered document into one table.
    /// Per-document read/decode failures are collected, never raised.
    pub fn run(&self) -> Result<AggregateOutcome> {
        init_tracing_once();
        init_thread_pool(self.opts.parallelism);

        let jobs = self.discover()?;
        if jobs.is_empty() {
            tracing::warn!(dir = %self.opts.input_dir.display(), "No JSON documents found");
            return Ok(AggregateOutcome::default());
        }
        tracing::info!("Found {} documents in {}", jobs.len(), self.opts.input_dir.display());

        let mut aggregator = CorpusAggregator::new(Normalizer::new(self.opts.site_origin.clone()))
            .parallel(self.opts.parallel_documents);
        let pb = self.opts.progress.then(|| {
            make_count_progress(jobs.len() as u64, self.opts.progress_label.as_deref().unwrap_or("Flattening"))
        });
        if let Some(pb) = &pb {
            aggregator = aggregator.progress(pb.clone());
        }

        let read_buf = self.opts.read_buffer_bytes;
        let docs = jobs.into_iter().map(|job| (job.document_id, job.path));
        let outcome = aggregator.aggregate_with(docs, |path: PathBuf| -> Result<_, DocumentError> {
            let bytes = read_document(&path, read_buf)?;
            decode_document(&bytes)
        });

        if let Some(pb) = pb { pb.finish_with_message("done"); }

        for stat in &outcome.processed {
            tracing::info!("Processed {} ({} comments)", stat.document_id, stat.comments);
        }
        for failure in &outcome.failures {
            tracing::warn!(document = %failure.document_id, error = %failure.error, "Error processing document");
        }
        tracing::info!("{}", outcome.summary());
        Ok(outcome)
    }

    /// `run`, then write the table to `out_path`.
    /// `format: None` picks the format from the file extension.
    pub fn run_to(&self, out_path: &Path, format: Option<ExportFormat>) -> Result<(AggregateOutcome, RunSummary)> {
        let format = match format.or_else(|| ExportFormat::from_path(out_path)) {
            Some(f) => f,
            None => return Err(anyhow!("cannot infer export format from {}", out_path.display())),
        };
        let outcome = self.run()?;
        self.export(&outcome, out_path, format)?;
        let summary = outcome.summary();
        Ok((outcome, summary))
    }

    pub fn export(&self, outcome: &AggregateOutcome, out_path: &Path, format: ExportFormat) -> Result<u64> {
        let opts = ExportOptions {
            human_readable_timestamps: self.opts.human_readable_timestamps,
            write_buffer_bytes: self.opts.write_buffer_bytes,
        };
        export_table(&outcome.table, out_path, format, opts)
    }
}

fn read_document(path: &Path, buf_bytes: usize) -> io::Result<Vec<u8>> {
    let f = open_with_backoff(path, 16, 50)?;
    let hint = f.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut r = BufReader::with_capacity(buf_bytes.max(8 * 1024), f);
    let mut bytes = Vec::with_capacity(hint);
    r.read_to_end(&mut bytes)?;
    Ok(bytes)
}
