// src/embed/mod.rs
//! # Embed Resolver
//! Derives at most one renderable preview (`Embed`) for a submission.
//!
//! Strategies are tried in a fixed priority order. Each strategy is applied to
//! the submission first and then to every crosspost ancestor before the next
//! strategy gets a turn; the first hit wins. Self posts never get a preview.

pub mod layout;
pub mod strategies;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::{normalize, NormalizedMetadata};

/// Variant tag of a preview descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Html,
    Video,
    Image,
    Gallery,
}

impl EmbedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedKind::Html => "html",
            EmbedKind::Video => "video",
            EmbedKind::Image => "image",
            EmbedKind::Gallery => "gallery",
        }
    }
}

/// Preview descriptor handed to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub kind: EmbedKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<Embed>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Box<Embed>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_18: Option<bool>,
}

impl Embed {
    fn bare(kind: EmbedKind) -> Self {
        Self {
            kind,
            url: None,
            html: None,
            width: None,
            height: None,
            gallery: None,
            video: None,
            over_18: None,
        }
    }

    pub fn image(url: impl Into<String>, width: Option<u32>, height: Option<u32>, over_18: Option<bool>) -> Self {
        Self {
            url: Some(url.into()),
            width,
            height,
            over_18,
            ..Self::bare(EmbedKind::Image)
        }
    }

    pub fn clip(url: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            url: Some(url.into()),
            width,
            height,
            ..Self::bare(EmbedKind::Video)
        }
    }

    pub fn html(markup: String, width: u32, height: u32, over_18: Option<bool>) -> Self {
        Self {
            html: Some(markup),
            width: Some(width),
            height: Some(height),
            over_18,
            ..Self::bare(EmbedKind::Html)
        }
    }

    /// A video shown over a still frame: the poster's fields with the clip attached.
    /// Without a poster the frame is an empty image carrying only `over_18`.
    pub fn video_over(poster: Option<Embed>, clip: Embed, over_18: Option<bool>) -> Self {
        let frame = poster.unwrap_or_else(|| Self {
            over_18,
            ..Self::bare(EmbedKind::Image)
        });
        Self {
            kind: EmbedKind::Video,
            video: Some(Box::new(clip)),
            ..frame
        }
    }

    /// Top-level gallery descriptor: the first image's fields plus the full list.
    pub fn gallery(images: Vec<Embed>) -> Option<Self> {
        let first = images.first()?.clone();
        Some(Self {
            kind: EmbedKind::Gallery,
            gallery: Some(images),
            ..first
        })
    }
}

/// A single way of deriving a preview from one metadata node.
pub type Strategy = fn(&NormalizedMetadata) -> Option<Embed>;

/// Priority order. Earlier strategies win over later ones across the whole lineage.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("reddit_video_fallback", strategies::reddit_video_fallback),
    ("preview_video_variant", strategies::preview_video_variant),
    ("video_preview_fallback", strategies::video_preview_fallback),
    ("media_embed", strategies::media_embed),
    ("gallery", strategies::gallery),
    ("preview_image", strategies::preview_image),
];

/// Resolve the preview of a normalized submission.
pub fn resolve(md: &NormalizedMetadata) -> Option<Embed> {
    ensure_metrics_described();

    if md.is_self_post() {
        return None;
    }
    let lineage: Vec<&NormalizedMetadata> = md
        .lineage()
        .into_iter()
        .filter(|node| !node.is_self_post())
        .collect();

    let found = first_hit(STRATEGIES, &lineage);
    match &found {
        Some((name, embed)) => {
            tracing::debug!(target: "embed", id = ?md.id, strategy = name, kind = embed.kind.as_str(), "embed resolved");
            metrics::counter!("embed_resolved_total", "kind" => embed.kind.as_str()).increment(1);
        }
        None => {
            metrics::counter!("embed_unresolved_total").increment(1);
        }
    }
    found.map(|(_, embed)| embed)
}

/// Resolve straight from a raw submission object.
pub fn resolve_raw(raw: &Value) -> Option<Embed> {
    resolve(&normalize(raw))
}

/// First non-empty result, strategy-major over the node sequence.
fn first_hit(
    strategies: &[(&'static str, Strategy)],
    nodes: &[&NormalizedMetadata],
) -> Option<(&'static str, Embed)> {
    strategies.iter().find_map(|(name, strategy)| {
        nodes.iter().find_map(|node| strategy(node)).map(|e| (*name, e))
    })
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        metrics::describe_counter!("embed_resolved_total", "Submissions that produced a preview, by kind.");
        metrics::describe_counter!("embed_unresolved_total", "Submissions rendered without a preview.");
    });
}
