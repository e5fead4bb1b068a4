//! Document normalizer: one parsed document in, `(post?, comments)` out.

use crate::json_utils::{epoch_field, int_field, non_empty_str_field, str_field, text_field, Payload};
use crate::listing::{ListingClass, RawListing, Thing, ThingKind};
use crate::record::{Record, RecordKind};
use serde_json::Value;

pub const DEFAULT_SITE_ORIGIN: &str = "https://reddit.com";

/// Result of normalizing a single document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedThread {
    pub post: Option<Record>,
    /// Pre-order: every comment precedes the comments in its `replies`.
    pub comments: Vec<Record>,
}

impl NormalizedThread {
    /// Post first (when present), then comments.
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.post.into_iter().chain(self.comments)
    }

    pub fn record_count(&self) -> usize {
        usize::from(self.post.is_some()) + self.comments.len()
    }
}

/// Flattens listing documents into records. Holds only the site origin used
/// to build comment URLs, so it is cheap to clone and share across threads.
#[derive(Clone, Debug)]
pub struct Normalizer {
    site_origin: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_ORIGIN)
    }
}

impl Normalizer {
    pub fn new(site_origin: impl Into<String>) -> Self {
        let mut site_origin = site_origin.into();
        while site_origin.ends_with('/') {
            site_origin.pop();
        }
        Self { site_origin }
    }

    pub fn site_origin(&self) -> &str {
        &self.site_origin
    }

    /// Normalize one document given as its sequence of top-level listings.
    ///
    /// The first post listing sets the post; later ones are ignored. Every
    /// comment listing contributes its `t1` children and all their nested
    /// `t1` replies.
    pub fn normalize(&self, listings: &[Value]) -> NormalizedThread {
        let mut out = NormalizedThread::default();

        for listing in listings {
            let children = match RawListing::from_value(listing) {
                RawListing::Container(children) if !children.is_empty() => children,
                _ => continue,
            };
            match ListingClass::classify(children) {
                ListingClass::Post => {
                    if out.post.is_none() {
                        out.post = Some(self.post_record(Thing::from_value(&children[0]).data));
                    } else {
                        tracing::debug!("ignoring additional post listing");
                    }
                }
                ListingClass::Comment => self.flatten_comments(children, &mut out.comments),
                ListingClass::Ignored => {}
            }
        }

        tracing::trace!(
            has_post = out.post.is_some(),
            comments = out.comments.len(),
            "normalized document"
        );
        out
    }

    /// Pre-order walk over a comment forest with an explicit stack.
    /// Children are pushed in reverse so they pop in source order.
    fn flatten_comments(&self, roots: &[Value], out: &mut Vec<Record>) {
        let mut stack: Vec<Thing<'_>> = comments_of(roots).rev().collect();
        while let Some(thing) = stack.pop() {
            out.push(self.comment_record(thing.data));
            stack.extend(comments_of(thing.replies().children()).rev());
        }
    }

    fn post_record(&self, data: &Payload) -> Record {
        Record {
            kind: RecordKind::Post,
            id: str_field(data, "id"),
            parent_id: None,
            author: str_field(data, "author"),
            subreddit: str_field(data, "subreddit"),
            title: str_field(data, "title"),
            body: text_field(data, "selftext"),
            score: int_field(data, "score"),
            num_comments: int_field(data, "num_comments"),
            created_at: epoch_field(data, "created_utc"),
            url: str_field(data, "url"),
            source_document: None,
        }
    }

    fn comment_record(&self, data: &Payload) -> Record {
        Record {
            kind: RecordKind::Comment,
            id: str_field(data, "id"),
            parent_id: str_field(data, "parent_id"),
            author: str_field(data, "author"),
            subreddit: str_field(data, "subreddit"),
            title: None,
            body: text_field(data, "body"),
            score: int_field(data, "score"),
            num_comments: None,
            created_at: epoch_field(data, "created_utc"),
            url: non_empty_str_field(data, "permalink").map(|p| format!("{}{}", self.site_origin, p)),
            source_document: None,
        }
    }
}

/// `t1` things among `children`, in source order; `more` stubs and other
/// kinds are dropped.
fn comments_of(children: &[Value]) -> impl DoubleEndedIterator<Item = Thing<'_>> {
    children
        .iter()
        .map(Thing::from_value)
        .filter(|t| t.kind == ThingKind::Comment)
}

/// Normalize with the default site origin.
pub fn normalize(listings: &[Value]) -> NormalizedThread {
    Normalizer::default().normalize(listings)
}
