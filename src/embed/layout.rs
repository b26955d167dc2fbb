// src/embed/layout.rs
//! Aspect-ratio math and the responsive markup wrappers built on it.

use html_escape::encode_double_quoted_attribute;

use crate::access::ValueExt;
use crate::metadata::NormalizedMetadata;

/// 16:9 fallback used when an HTML embed carries no usable dimensions.
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// `100 * height / width` with two decimals, or `None` unless both are positive.
pub fn padding_percent(height: Option<u32>, width: Option<u32>) -> Option<String> {
    match (height, width) {
        (Some(h), Some(w)) if h > 0 && w > 0 => {
            Some(format!("{:.2}", 100.0 * f64::from(h) / f64::from(w)))
        }
        _ => None,
    }
}

/// Wrap pre-escaped embed markup in a container sized by its aspect ratio.
/// `content` is trusted as-is; only the computed style is escaped.
pub fn embed_container(content: &str, width: u32, height: u32) -> String {
    let padding = padding_percent(Some(height), Some(width))
        .unwrap_or_else(|| "56.25".to_string());
    let style = format!("padding-top: {padding}%");
    format!(
        r#"<div class="embed" style="{}">{}</div>"#,
        encode_double_quoted_attribute(&style),
        content
    )
}

/// Responsive iframe for reddit's hosted media page of this submission.
/// Uses the first reddit video (plain, then secure) with usable dimensions.
pub fn reddit_video_iframe(md: &NormalizedMetadata) -> Option<String> {
    let id = md.id.as_deref().filter(|id| !id.is_empty())?;
    let padding = [&md.media, &md.secure_media]
        .into_iter()
        .map(|m| m.field("reddit_video"))
        .filter(|rv| rv.is_truthy())
        .find_map(|rv| padding_percent(rv.field("height").dimension(), rv.field("width").dimension()))?;

    Some(format!(
        concat!(
            r#"<div class="embed" style="padding-top: {}%">"#,
            r#"<iframe class="responsive" allowfullscreen scrolling="no" gesture="media" allow="encrypted-media" "#,
            r#"src="https://old.reddit.com/mediaembed/{}"></iframe></div>"#
        ),
        padding,
        encode_double_quoted_attribute(id)
    ))
}
