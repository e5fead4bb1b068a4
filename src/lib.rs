mod config;
mod date;
mod paths;
mod progress;
mod util;
mod pipeline;

mod json_utils;
mod listing;
mod record;
mod normalize;
mod corpus;
mod error;
mod export;

pub use crate::config::{FlattenOptions, DEFAULT_FILE_PATTERN};
pub use crate::pipeline::ThreadETL;
pub use crate::paths::{discover_documents, DocumentJob};

// Core: listing views, normalizer, aggregator.
pub use crate::listing::{ListingClass, RawListing, Replies, Thing, ThingKind};
pub use crate::record::{Record, RecordKind};
pub use crate::normalize::{normalize, NormalizedThread, Normalizer, DEFAULT_SITE_ORIGIN};
pub use crate::corpus::{
    aggregate, decode_document, into_listings, AggregateOutcome, CorpusAggregator, DocumentStat, RecordTable,
    RunSummary,
};
pub use crate::error::{DocumentError, DocumentFailure};

// Export and formatting helpers.
pub use crate::export::{csv_escape, export_table, record_to_value, ExportFormat, ExportOptions};
pub use crate::date::epoch_to_rfc3339;

// Expose multiprogress so binaries can stack bars.
pub use crate::progress::{set_global_multiprogress, make_count_progress};

pub use crate::util::{init_thread_pool, init_tracing_once, open_with_backoff, create_with_backoff, replace_file_atomic_backoff};
