// src/embed/strategies.rs
//! Individual preview strategies, one metadata node at a time.
//!
//! Every function is total over arbitrary shapes: a missing or malformed
//! field means "does not apply", never an error.

use serde_json::Value;

use super::layout::{embed_container, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use super::Embed;
use crate::access::ValueExt;
use crate::metadata::NormalizedMetadata;

/// `media.reddit_video.fallback_url` (then `secure_media`), over the node's poster image.
pub fn reddit_video_fallback(md: &NormalizedMetadata) -> Option<Embed> {
    reddit_videos(md).find_map(|rv| video_from("fallback_url", rv, md))
}

/// First `preview.images[].variants.mp4.source.url`.
pub fn preview_video_variant(md: &NormalizedMetadata) -> Option<Embed> {
    md.preview
        .field("images")
        .items()
        .iter()
        .find_map(|img| {
            let src = img.field("variants").field("mp4").field("source");
            video_from("url", src, md)
        })
}

/// `preview.reddit_video_preview.fallback_url`.
pub fn video_preview_fallback(md: &NormalizedMetadata) -> Option<Embed> {
    let rvp = md.preview.field("reddit_video_preview");
    video_from("fallback_url", rvp, md)
}

/// Provider markup from `media_embed`, then `secure_media_embed`.
/// Twitter cards are left to the link itself.
pub fn media_embed(md: &NormalizedMetadata) -> Option<Embed> {
    if md.media.field("type").as_str() == Some("twitter.com") {
        return None;
    }
    [&md.media_embed, &md.secure_media_embed]
        .into_iter()
        .filter(|e| e.is_truthy())
        .find_map(|e| {
            let content = e.field("content").non_empty_str()?;
            let width = e.field("width").dimension().unwrap_or(DEFAULT_WIDTH);
            let height = e.field("height").dimension().unwrap_or(DEFAULT_HEIGHT);
            Some(Embed::html(
                embed_container(content, width, height),
                width,
                height,
                md.over_18,
            ))
        })
}

/// Gallery images in source order; the first one doubles as the top-level preview.
pub fn gallery(md: &NormalizedMetadata) -> Option<Embed> {
    let images = md
        .gallery_data
        .field("items")
        .items()
        .iter()
        .filter_map(|item| item.field("media_id").non_empty_str())
        .map(|media_id| md.media_metadata.field(media_id).field("s"))
        .filter_map(|src| {
            let url = src.field("u").non_empty_str()?;
            Some(Embed::image(
                url,
                src.field("x").dimension(),
                src.field("y").dimension(),
                md.over_18,
            ))
        })
        .collect();
    Embed::gallery(images)
}

/// First `preview.images[].source` image, unless the submission is a plain link.
pub fn preview_image(md: &NormalizedMetadata) -> Option<Embed> {
    if md.post_hint.as_deref() == Some("link") {
        return None;
    }
    poster_image(md)
}

/// `preview_image` without the `post_hint` gate; used for video posters.
pub fn poster_image(md: &NormalizedMetadata) -> Option<Embed> {
    md.preview
        .field("images")
        .items()
        .iter()
        .find_map(|img| {
            let src = img.field("source");
            let url = src.field("url").non_empty_str()?;
            Some(Embed::image(
                url,
                src.field("width").dimension(),
                src.field("height").dimension(),
                md.over_18,
            ))
        })
}

fn video_from(url_field: &str, node: &Value, base: &NormalizedMetadata) -> Option<Embed> {
    let url = node.field(url_field).non_empty_str()?;
    let clip = Embed::clip(url, node.field("width").dimension(), node.field("height").dimension());
    Some(Embed::video_over(poster_image(base), clip, base.over_18))
}

fn reddit_videos(md: &NormalizedMetadata) -> impl Iterator<Item = &Value> {
    [&md.media, &md.secure_media]
        .into_iter()
        .map(|m| m.field("reddit_video"))
        .filter(|rv| rv.is_truthy())
}
