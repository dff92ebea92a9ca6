//! Load sequence: fetch the dashboard, find the tagged card, realize it

use serde_json::Value;

use crate::errors::{EmbedderError, LoadFailure};
use crate::models::config::EmbedderConfig;
use crate::models::dashboard::{CardPath, DashboardConfig, TITLE_KEY};
use crate::search::search_views;

use super::host::EmbedderHost;

/// Everything the load sequence needs, detached from the widget
#[derive(Debug, Clone)]
pub struct LoadRequest<S> {
    /// Distinguishes loads across reconfigurations
    pub generation: u64,
    pub config: EmbedderConfig,
    pub state: S,
}

/// Card descriptor ready for the card factory
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCard {
    /// Deep copy of the matched node, title removed if requested
    pub descriptor: Value,
    pub path: CardPath,
    pub duplicate: bool,
}

/// Realized card plus what the search learned about its tag
#[derive(Debug)]
pub struct Realized<C> {
    pub card: C,
    pub duplicate: bool,
}

/// Search `dashboard` for the configured tag and prepare a working copy
pub fn resolve_card(
    dashboard: &DashboardConfig,
    config: &EmbedderConfig,
) -> Result<ResolvedCard, EmbedderError> {
    let tag = config.embed_id.as_str();
    let result = search_views(&dashboard.views, tag);

    let (card, path) = match (result.card, result.path) {
        (Some(card), Some(path)) => (card, path),
        _ => {
            return Err(EmbedderError::CardNotFound {
                tag: tag.to_string(),
                dashboard: config.dashboard.clone(),
            })
        }
    };

    if result.duplicate {
        log::warn!(
            "Duplicate embed ID #{} found ({} cards)! Using first occurrence at {}.",
            tag,
            result.matches,
            path
        );
    }

    log::info!("Successfully located card #{} in {}", tag, config.dashboard);

    let mut descriptor = card.clone();
    if !config.show_title {
        if let Some(fields) = descriptor.as_object_mut() {
            fields.remove(TITLE_KEY);
        }
    }

    Ok(ResolvedCard {
        descriptor,
        path,
        duplicate: result.duplicate,
    })
}

/// Run the whole load sequence against the host
pub async fn load_card<H: EmbedderHost>(
    host: &H,
    request: &LoadRequest<H::State>,
) -> Result<Realized<H::Card>, EmbedderError> {
    let config = &request.config;
    log::info!(
        "Searching for card #{} in '{}'",
        config.embed_id,
        config.dashboard
    );

    let resolved = fetch_and_resolve(host, request)
        .await
        .map_err(|e| EmbedderError::from_load_failure(e, &config.dashboard))?;

    let card = host
        .create_card(resolved.descriptor)
        .await
        .map_err(|e| EmbedderError::Search(e.message))?;

    Ok(Realized {
        card,
        duplicate: resolved.duplicate,
    })
}

async fn fetch_and_resolve<H: EmbedderHost>(
    host: &H,
    request: &LoadRequest<H::State>,
) -> Result<ResolvedCard, LoadFailure> {
    let config = &request.config;
    let dashboard = host.fetch_dashboard(&request.state, config.url_path()).await?;
    Ok(resolve_card(&dashboard, config)?)
}
