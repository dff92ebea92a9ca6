//! Seam between the embedder and the application hosting it
//!
//! The browser binding implements these over the `hass` object and the
//! Lovelace card helpers; tests implement them in memory.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::HostError;
use crate::models::dashboard::DashboardConfig;

/// Message type of the dashboard configuration request
pub const CONFIG_MESSAGE_TYPE: &str = "lovelace/config";

/// A card realized by the host's card factory
pub trait CardUnit {
    /// Live application state pushed into the card
    type State;

    fn set_state(&mut self, state: &Self::State);
}

#[async_trait(?Send)]
pub trait EmbedderHost {
    type State: Clone;
    type Card: CardUnit<State = Self::State>;

    /// Request the configuration tree of a dashboard.
    ///
    /// `url_path` is `None` for the default dashboard.
    async fn fetch_dashboard(
        &self,
        state: &Self::State,
        url_path: Option<&str>,
    ) -> Result<DashboardConfig, HostError>;

    /// Turn a card descriptor into a renderable unit
    async fn create_card(&self, descriptor: Value) -> Result<Self::Card, HostError>;
}
