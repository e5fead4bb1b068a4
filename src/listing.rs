//! Typed, borrowed views over the raw listing wire format.
//!
//! A document is a JSON array of listings. A listing is a container
//! `{ "data": { "children": [thing, ..] } }`; a thing is
//! `{ "kind": "t3" | "t1" | .., "data": { .. } }`. Every accessor here is
//! total: shapes that do not match degrade to `Other`/empty instead of failing.

use crate::json_utils::{kind_tag, Payload};
use serde_json::Value;
use std::sync::OnceLock;

fn empty_payload() -> &'static Payload {
    static EMPTY: OnceLock<Payload> = OnceLock::new();
    EMPTY.get_or_init(Payload::new)
}

/// `data.children` of a container-shaped value.
fn container_children(v: &Value) -> Option<&[Value]> {
    v.get("data")?.get("children")?.as_array().map(Vec::as_slice)
}

/// One top-level element of a document.
#[derive(Clone, Copy, Debug)]
pub enum RawListing<'a> {
    Container(&'a [Value]),
    Other,
}

impl<'a> RawListing<'a> {
    pub fn from_value(v: &'a Value) -> Self {
        match container_children(v) {
            Some(children) => RawListing::Container(children),
            None => RawListing::Other,
        }
    }
}

/// How a listing is treated, decided by the kind of its first child only.
///
/// Listings in the archive format are homogeneous: a submission listing holds
/// one `t3`, a comment listing holds `t1`s (plus `more` stubs). A listing whose
/// first child is anything else is ignored as a whole, even if later children
/// would qualify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingClass {
    Post,
    Comment,
    Ignored,
}

impl ListingClass {
    pub fn classify(children: &[Value]) -> Self {
        match children.first().map(Thing::from_value).map(|t| t.kind) {
            Some(ThingKind::Post) => ListingClass::Post,
            Some(ThingKind::Comment) => ListingClass::Comment,
            _ => ListingClass::Ignored,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThingKind {
    Post,    // t3
    Comment, // t1
    Other,
}

impl ThingKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("t3") => ThingKind::Post,
            Some("t1") => ThingKind::Comment,
            _ => ThingKind::Other,
        }
    }
}

/// A kind-tagged node with its payload. A missing or non-object `data`
/// reads as an empty payload.
#[derive(Clone, Copy, Debug)]
pub struct Thing<'a> {
    pub kind: ThingKind,
    pub data: &'a Payload,
}

impl<'a> Thing<'a> {
    pub fn from_value(v: &'a Value) -> Self {
        let data = v
            .get("data")
            .and_then(Value::as_object)
            .unwrap_or_else(|| empty_payload());
        Self { kind: ThingKind::from_tag(kind_tag(v)), data }
    }

    pub fn replies(&self) -> Replies<'a> {
        Replies::from_field(self.data.get("replies"))
    }
}

/// A comment's `replies` field: either a nested listing, or nothing
/// (absent, `""`, null, or any other sentinel).
#[derive(Clone, Copy, Debug)]
pub enum Replies<'a> {
    Listing(&'a [Value]),
    None,
}

impl<'a> Replies<'a> {
    pub fn from_field(field: Option<&'a Value>) -> Self {
        match field.filter(|v| v.is_object()).and_then(container_children) {
            Some(children) => Replies::Listing(children),
            None => Replies::None,
        }
    }

    pub fn children(&self) -> &'a [Value] {
        match *self {
            Replies::Listing(children) => children,
            Replies::None => &[],
        }
    }
}
