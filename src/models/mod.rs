//! Models module for the Universal Embedder
//!
//! This module contains the data models shared by the search engine and
//! the widget: embed tags, widget configuration and the dashboard tree.

pub mod config;
pub mod dashboard;
pub mod serde_helpers;
pub mod tag;

// Re-export commonly used types
pub use config::{dashboard_url_path, EmbedderConfig, RawConfig, DEFAULT_DASHBOARD};
pub use dashboard::{CardPath, DashboardConfig, PathSegment};
pub use tag::{tag_in_icon, validate_embed_id, EmbedTag};
