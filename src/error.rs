use std::io;

use thiserror::Error;

/// Why a single document contributed no records.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document: {0}")]
    Read(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected a JSON array of listings, found {found}")]
    NotAListingSequence { found: &'static str },
}

/// A per-document failure as surfaced to the caller.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: DocumentError,
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.document_id, self.error)
    }
}
