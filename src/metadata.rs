// src/metadata.rs
//! # Metadata Normalizer
//! Reduces an arbitrary reddit submission object to a fixed whitelist of
//! fields, recursing into the crosspost ancestry.
//!
//! The output always carries every whitelisted key (possibly `null`) and
//! nothing else, so it can be stored as the link's metadata and re-read later
//! without surprises. Pure; never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::ValueExt;

/// Ancestry chains deeper than this are cut off.
pub const MAX_CROSSPOST_DEPTH: usize = 16;

/// Every key a normalized object carries, in serialization order.
pub const WHITELIST: &[&str] = &[
    "id",
    "is_self",
    "is_video",
    "is_reddit_media_domain",
    "spoiler",
    "over_18",
    "num_comments",
    "post_hint",
    "preview",
    "thumbnail",
    "media",
    "secure_media",
    "media_embed",
    "secure_media_embed",
    "url",
    "permalink",
    "gallery_data",
    "media_metadata",
    "subreddit",
    "crosspost_parent_list",
];

/// Whitelisted view of one submission.
///
/// Sub-objects (`preview`, `media`, ...) stay untyped: their inner shape is
/// only inspected by the embed strategies, which treat every lookup as optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedMetadata {
    pub id: Option<String>,
    pub is_self: Option<bool>,
    pub is_video: Option<bool>,
    pub is_reddit_media_domain: Option<bool>,
    pub spoiler: Option<bool>,
    pub over_18: Option<bool>,
    pub num_comments: Option<i64>,
    pub post_hint: Option<String>,
    pub preview: Value,
    pub thumbnail: Option<String>,
    pub media: Value,
    pub secure_media: Value,
    pub media_embed: Value,
    pub secure_media_embed: Value,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub gallery_data: Value,
    pub media_metadata: Value,
    pub subreddit: Option<String>,
    pub crosspost_parent_list: Vec<NormalizedMetadata>,
}

impl NormalizedMetadata {
    pub fn is_self_post(&self) -> bool {
        self.is_self == Some(true)
    }

    /// The submission followed by every ancestor, depth-first in source order.
    pub fn lineage(&self) -> Vec<&NormalizedMetadata> {
        let mut out = vec![self];
        for parent in &self.crosspost_parent_list {
            out.extend(parent.lineage());
        }
        out
    }
}

/// Normalize a raw submission object. Non-object input yields an all-null result.
pub fn normalize(raw: &Value) -> NormalizedMetadata {
    normalize_at(raw, 0)
}

fn normalize_at(raw: &Value, depth: usize) -> NormalizedMetadata {
    let crosspost_parent_list = if depth < MAX_CROSSPOST_DEPTH {
        raw.field("crosspost_parent_list")
            .items()
            .iter()
            .filter(|p| p.is_object())
            .map(|p| normalize_at(p, depth + 1))
            .collect()
    } else {
        if !raw.field("crosspost_parent_list").items().is_empty() {
            tracing::debug!(target: "embed", depth, "crosspost ancestry truncated");
        }
        Vec::new()
    };

    NormalizedMetadata {
        id: string(raw.field("id")),
        is_self: raw.field("is_self").as_bool(),
        is_video: raw.field("is_video").as_bool(),
        is_reddit_media_domain: raw.field("is_reddit_media_domain").as_bool(),
        spoiler: raw.field("spoiler").as_bool(),
        over_18: raw.field("over_18").as_bool(),
        num_comments: raw.field("num_comments").as_i64(),
        post_hint: string(raw.field("post_hint")),
        preview: object(raw.field("preview")),
        thumbnail: string(raw.field("thumbnail")),
        media: object(raw.field("media")),
        secure_media: object(raw.field("secure_media")),
        media_embed: object(raw.field("media_embed")),
        secure_media_embed: object(raw.field("secure_media_embed")),
        url: string(raw.field("url")),
        permalink: string(raw.field("permalink")),
        gallery_data: object(raw.field("gallery_data")),
        media_metadata: object(raw.field("media_metadata")),
        subreddit: topic_name(raw.field("subreddit")),
        crosspost_parent_list,
    }
}

fn string(v: &Value) -> Option<String> {
    v.as_str().map(str::to_owned)
}

fn object(v: &Value) -> Value {
    if v.is_object() {
        v.clone()
    } else {
        Value::Null
    }
}

/// Topic name from either a plain string or a subreddit object.
/// A leading `r/` or `/r/` is dropped.
pub fn topic_name(v: &Value) -> Option<String> {
    static PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/?r/").expect("topic prefix regex"));

    let raw = match v {
        Value::String(s) => s.as_str(),
        Value::Object(_) => v
            .field("display_name")
            .as_str()
            .or_else(|| v.field("name").as_str())?,
        _ => return None,
    };
    let name = PREFIX.replace(raw.trim(), "");
    (!name.is_empty()).then(|| name.into_owned())
}
