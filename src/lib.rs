// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod access;
pub mod api;
pub mod config;
pub mod embed;
pub mod link;
pub mod metadata;
pub mod metrics;
pub mod scoring;
pub mod seen;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::embed::{resolve, resolve_raw, Embed, EmbedKind};
pub use crate::metadata::{normalize, NormalizedMetadata};
pub use crate::scoring::{RelativeScoring, ScoringCache, ScoringError};
pub use crate::seen::{MemorySeenStore, SeenStore};
