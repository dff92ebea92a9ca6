//! Tag availability scanner
//!
//! Collects every embed tag used in a dashboard and proposes the lowest free
//! one. Uses the same traversal as the card search, stack edge included.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::embedder::host::EmbedderHost;
use crate::models::config::dashboard_url_path;
use crate::models::tag::{EmbedTag, MAX_TAG, MIN_TAG};

use super::{card_tag, walk_views};

/// All tags carried by cards in `views`
pub fn used_tags(views: &[Value]) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    walk_views(views, |card, _| {
        if let Some(tag) = card_tag(card) {
            used.insert(tag.to_string());
        }
    });
    used
}

/// Lowest tag in 001..=999 not used by any card; `None` when all are taken
pub fn lowest_unused_tag(views: &[Value]) -> Option<EmbedTag> {
    let used = used_tags(views);
    (MIN_TAG..=MAX_TAG)
        .filter_map(EmbedTag::from_number)
        .find(|tag| !used.contains(tag.as_str()))
}

/// Fetch `dashboard` through the host and propose a free tag.
///
/// A failed fetch is logged and answered with "001".
pub async fn find_unused_id<H: EmbedderHost>(
    host: &H,
    state: &H::State,
    dashboard: &str,
) -> Option<EmbedTag> {
    log::info!("Analyzing available embed IDs in '{}'...", dashboard);

    let config = match host.fetch_dashboard(state, dashboard_url_path(dashboard)).await {
        Ok(config) => config,
        Err(e) => {
            log::error!("ID search failed: {}", e);
            return EmbedTag::from_number(MIN_TAG);
        }
    };

    match lowest_unused_tag(&config.views) {
        Some(tag) => {
            log::info!("Available embed ID: {}", tag);
            Some(tag)
        }
        None => {
            log::warn!("All embed IDs (001-999) are in use!");
            None
        }
    }
}
