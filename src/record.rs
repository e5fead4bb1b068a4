//! The flat, schema-uniform output unit: one `Record` per post or comment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates the two record shapes that share one schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Post,
    Comment,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Post => "post",
            RecordKind::Comment => "comment",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized row.
///
/// Fields that do not apply to a record's kind are `None` and serialize as
/// `null`; nothing is skipped, so every row carries every column.
/// Serialized names follow the combined-table header (`type`, `created_utc`,
/// `source_file`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub id: Option<String>,
    /// Raw `t3_`/`t1_` parent reference; comments only.
    pub parent_id: Option<String>,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    /// Posts only.
    pub title: Option<String>,
    /// Trimmed; never null (absent text becomes `""`).
    pub body: String,
    pub score: Option<i64>,
    /// Posts only.
    pub num_comments: Option<i64>,
    /// Unix seconds as found in the archive (may carry a fractional part).
    #[serde(rename = "created_utc")]
    pub created_at: Option<f64>,
    pub url: Option<String>,
    /// Set by the corpus aggregator, never by the normalizer.
    #[serde(rename = "source_file")]
    pub source_document: Option<String>,
}

impl Record {
    /// Column names in table order.
    pub const COLUMNS: [&'static str; 12] = [
        "type",
        "id",
        "parent_id",
        "author",
        "subreddit",
        "title",
        "body",
        "score",
        "num_comments",
        "created_utc",
        "url",
        "source_file",
    ];

    pub fn is_post(&self) -> bool {
        self.kind == RecordKind::Post
    }

    pub fn is_comment(&self) -> bool {
        self.kind == RecordKind::Comment
    }

    /// Copy of this record tagged with its originating document.
    pub fn with_source(mut self, document_id: impl Into<String>) -> Self {
        self.source_document = Some(document_id.into());
        self
    }
}
