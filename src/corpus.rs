//! Corpus aggregation: normalize many documents, tag each record with its
//! source, and concatenate everything into one table in input order.
//!
//! A document that cannot be decoded is recorded as a `DocumentFailure` and
//! contributes no rows; the remaining documents are unaffected.

use crate::error::{DocumentError, DocumentFailure};
use crate::normalize::{NormalizedThread, Normalizer};
use crate::record::{Record, RecordKind};
use ahash::AHashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Parse raw bytes into the document's listing sequence.
///
/// Every reply level nests about five JSON levels, so serde_json's default
/// limit of 128 would reject threads ~25 replies deep. The limit is lifted and
/// the parser grows its stack on demand instead.
pub fn decode_document(bytes: &[u8]) -> Result<Vec<Value>, DocumentError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let v = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    into_listings(v)
}

/// Accept an already-parsed document only if it is a JSON array.
pub fn into_listings(v: Value) -> Result<Vec<Value>, DocumentError> {
    match v {
        Value::Array(items) => Ok(items),
        other => Err(DocumentError::NotAListingSequence { found: json_type_name(&other) }),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The flat output table. Row order: documents in input order; within a
/// document the post first, then comments in pre-order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<Record>,
}

impl RecordTable {
    pub fn records(&self) -> &[Record] { &self.records }
    pub fn into_records(self) -> Vec<Record> { self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn head(&self, n: usize) -> &[Record] { &self.records[..n.min(self.records.len())] }

    pub fn posts(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_post())
    }

    pub fn comments(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_comment())
    }

    pub fn by_document<'a>(&'a self, document_id: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .filter(move |r| r.source_document.as_deref() == Some(document_id))
    }

    /// Ids seen on more than one row of the same kind, sorted.
    /// Overlapping archive captures legitimately produce these; they are
    /// reported, never removed.
    pub fn duplicate_ids(&self) -> Vec<(RecordKind, &str)> {
        let mut seen: AHashMap<(RecordKind, &str), usize> = AHashMap::with_capacity(self.records.len());
        for r in &self.records {
            if let Some(id) = r.id.as_deref() {
                *seen.entry((r.kind, id)).or_insert(0) += 1;
            }
        }
        let mut dups: Vec<(RecordKind, &str)> = seen
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(k, _)| k)
            .collect();
        dups.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        dups
    }

    fn extend_from(&mut self, document_id: &str, thread: NormalizedThread) {
        self.records.reserve(thread.record_count());
        self.records
            .extend(thread.into_records().map(|r| r.with_source(document_id)));
    }
}

/// Per-document success line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentStat {
    pub document_id: String,
    pub has_post: bool,
    pub comments: usize,
}

/// Everything one aggregation run produced.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub table: RecordTable,
    pub processed: Vec<DocumentStat>,
    pub failures: Vec<DocumentFailure>,
}

impl AggregateOutcome {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            documents_found: self.processed.len() + self.failures.len(),
            documents_ok: self.processed.len(),
            documents_failed: self.failures.len(),
            posts: self.table.posts().count(),
            comments: self.table.comments().count(),
            duplicate_ids: self.table.duplicate_ids().len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents_found: usize,
    pub documents_ok: usize,
    pub documents_failed: usize,
    pub posts: usize,
    pub comments: usize,
    pub duplicate_ids: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents ({} ok, {} failed): {} posts, {} comments, {} duplicate ids",
            self.documents_found,
            self.documents_ok,
            self.documents_failed,
            self.posts,
            self.comments,
            self.duplicate_ids
        )
    }
}

enum DocumentOutcome {
    Ok { document_id: String, thread: NormalizedThread },
    Failed(DocumentFailure),
}

/// Normalizes a collection of documents into a single `RecordTable`.
#[derive(Clone, Default)]
pub struct CorpusAggregator {
    normalizer: Normalizer,
    parallel: bool,
    progress: Option<ProgressBar>,
}

impl CorpusAggregator {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer, parallel: false, progress: None }
    }

    /// Normalize documents on the rayon pool. Output order is unchanged.
    pub fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    /// Tick `pb` once per document.
    pub fn progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    /// Aggregate already-parsed documents.
    pub fn aggregate<I, S>(&self, documents: I) -> AggregateOutcome
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        self.aggregate_with(documents, into_listings)
    }

    /// Aggregate raw JSON bytes, decoding each document inside its own
    /// failure boundary.
    pub fn aggregate_bytes<I, S, B>(&self, documents: I) -> AggregateOutcome
    where
        I: IntoIterator<Item = (S, B)>,
        S: Into<String>,
        B: AsRef<[u8]> + Send,
    {
        self.aggregate_with(documents, |b: B| decode_document(b.as_ref()))
    }

    /// Aggregate arbitrary raw payloads given a decoder for them. `decode`
    /// runs once per document; its error becomes that document's failure.
    pub fn aggregate_with<I, S, T, F>(&self, documents: I, decode: F) -> AggregateOutcome
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Send,
        F: Fn(T) -> Result<Vec<Value>, DocumentError> + Sync,
    {
        let docs: Vec<(String, T)> = documents.into_iter().map(|(id, raw)| (id.into(), raw)).collect();

        let run_one = |(document_id, raw): (String, T)| -> DocumentOutcome {
            let outcome = match decode(raw) {
                Ok(listings) => {
                    let thread = self.normalizer.normalize(&listings);
                    DocumentOutcome::Ok { document_id, thread }
                }
                Err(error) => DocumentOutcome::Failed(DocumentFailure { document_id, error }),
            };
            if let Some(pb) = &self.progress { pb.inc(1); }
            outcome
        };

        // Ordered collect: merge order follows input order, not completion order.
        let outcomes: Vec<DocumentOutcome> = if self.parallel {
            docs.into_par_iter().map(run_one).collect()
        } else {
            docs.into_iter().map(run_one).collect()
        };

        let mut out = AggregateOutcome::default();
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Ok { document_id, thread } => {
                    tracing::debug!(document = %document_id, records = thread.record_count(), "document normalized");
                    out.processed.push(DocumentStat {
                        document_id: document_id.clone(),
                        has_post: thread.post.is_some(),
                        comments: thread.comments.len(),
                    });
                    out.table.extend_from(&document_id, thread);
                }
                DocumentOutcome::Failed(failure) => {
                    tracing::debug!(document = %failure.document_id, error = %failure.error, "document failed");
                    out.failures.push(failure);
                }
            }
        }
        out
    }
}

/// Aggregate parsed documents with default settings.
pub fn aggregate<I, S>(documents: I) -> AggregateOutcome
where
    I: IntoIterator<Item = (S, Value)>,
    S: Into<String>,
{
    CorpusAggregator::default().aggregate(documents)
}
