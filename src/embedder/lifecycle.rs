//! Embedder lifecycle
//!
//! One [`Embedder`] per widget instance. State changes only through the
//! methods below:
//!
//! ```text
//! Unconfigured --configure--> Configured --first state--> Loading
//! Loading --complete_load--> Ready | Failed
//! any --configure--> Configured
//! ```
//!
//! `Failed` is terminal until the host configures the widget again.

use crate::errors::EmbedderError;
use crate::models::config::{EmbedderConfig, RawConfig};

use super::host::{CardUnit, EmbedderHost};
use super::loader::{load_card, LoadRequest, Realized};
use super::visibility::Visibility;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Unconfigured,
    Configured,
    Loading,
    Ready,
    Failed(EmbedderError),
}

/// What happened to a state delivery from the host
#[derive(Debug)]
pub enum StateDelivery<S> {
    /// No configuration yet; nothing to do
    Ignored,
    /// First delivery: the caller must run the load sequence
    StartLoad(LoadRequest<S>),
    /// A load is in flight; the state is kept for when it finishes
    Deferred,
    /// Pushed to the realized card
    Forwarded,
    /// Load failed earlier; no retry
    Stale,
}

pub struct Embedder<C: CardUnit> {
    config: Option<EmbedderConfig>,
    phase: LoadPhase,
    generation: u64,
    state: Option<C::State>,
    card: Option<C>,
    duplicate: bool,
    visibility: Visibility,
}

impl<C: CardUnit> Default for Embedder<C>
where
    C::State: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CardUnit> Embedder<C>
where
    C::State: Clone,
{
    pub fn new() -> Self {
        Self {
            config: None,
            phase: LoadPhase::Unconfigured,
            generation: 0,
            state: None,
            card: None,
            duplicate: false,
            visibility: Visibility::Visible,
        }
    }

    /// Validate and store the configuration; errors go straight to the host
    pub fn configure(&mut self, raw: RawConfig) -> Result<(), EmbedderError> {
        let config = EmbedderConfig::from_raw(raw)?;
        self.apply_config(config);
        Ok(())
    }

    /// Install an already validated configuration
    pub fn apply_config(&mut self, config: EmbedderConfig) {
        self.generation += 1;
        self.visibility = Visibility::from_default(config.default_visible);
        self.phase = LoadPhase::Configured;
        self.state = None;
        self.card = None;
        self.duplicate = false;
        self.config = Some(config);
    }

    /// Accept a new application state from the host
    pub fn receive_state(&mut self, state: C::State) -> StateDelivery<C::State> {
        let Some(config) = self.config.as_ref() else {
            return StateDelivery::Ignored;
        };
        let delivery = match self.phase {
            LoadPhase::Unconfigured => return StateDelivery::Ignored,
            LoadPhase::Configured => {
                let request = LoadRequest {
                    generation: self.generation,
                    config: config.clone(),
                    state: state.clone(),
                };
                self.phase = LoadPhase::Loading;
                StateDelivery::StartLoad(request)
            }
            LoadPhase::Loading => StateDelivery::Deferred,
            LoadPhase::Ready => {
                if let Some(card) = self.card.as_mut() {
                    card.set_state(&state);
                }
                StateDelivery::Forwarded
            }
            LoadPhase::Failed(_) => StateDelivery::Stale,
        };
        self.state = Some(state);
        delivery
    }

    /// Finish the load started by `generation`.
    ///
    /// Returns false when the result belongs to an outdated configuration
    /// and was dropped.
    pub fn complete_load(
        &mut self,
        generation: u64,
        result: Result<Realized<C>, EmbedderError>,
    ) -> bool {
        if generation != self.generation || self.phase != LoadPhase::Loading {
            log::debug!("Dropping load result of generation {}", generation);
            return false;
        }

        match result {
            Ok(Realized { mut card, duplicate }) => {
                if let Some(state) = self.state.as_ref() {
                    card.set_state(state);
                }
                self.card = Some(card);
                self.duplicate = duplicate;
                self.phase = LoadPhase::Ready;
                self.log_ready();
            }
            Err(e) => {
                log::error!("Embedding failed: {}", e);
                self.phase = LoadPhase::Failed(e);
            }
        }
        true
    }

    /// Deliver state and, when it starts the load, run it to completion
    pub async fn deliver_state<H>(&mut self, host: &H, state: C::State) -> &LoadPhase
    where
        H: EmbedderHost<State = C::State, Card = C>,
    {
        if let StateDelivery::StartLoad(request) = self.receive_state(state) {
            let result = load_card(host, &request).await;
            self.complete_load(request.generation, result);
        }
        &self.phase
    }

    fn log_ready(&self) {
        if let Some(config) = &self.config {
            log::info!("Universal Embedder successfully embedded card #{}", config.embed_id);
            log::info!(
                "   Dashboard: {} | Title: \"{}\" | Show close: {} | Show title: {} | Default visible: {}",
                config.dashboard,
                config.embedder_title,
                config.show_close,
                config.show_title,
                config.default_visible
            );
            log::info!("   Hash control: use {}", config.embed_id.fragment());
        }
    }

    /// React to the current URL fragment.
    ///
    /// Only a ready embedder whose own fragment is present reacts; it becomes
    /// visible and reports the match. Anything else leaves visibility alone.
    pub fn check_fragment(&mut self, fragment: &str) -> bool {
        let Some(expected) = self.expected_fragment() else {
            return false;
        };
        if self.phase != LoadPhase::Ready {
            return false;
        }
        log::debug!("Hash check - current: \"{}\", mine: \"{}\"", fragment, expected);
        if fragment != expected {
            return false;
        }
        log::info!("Hash matched! Opening embedder {}", expected);
        self.visibility = Visibility::Visible;
        true
    }

    pub fn show(&mut self) -> Visibility {
        self.visibility = Visibility::Visible;
        self.visibility
    }

    pub fn hide(&mut self) -> Visibility {
        self.visibility = Visibility::Hidden;
        self.visibility
    }

    pub fn toggle(&mut self) -> Visibility {
        self.visibility = self.visibility.toggled();
        self.visibility
    }

    /// Close control activation
    pub fn close(&mut self) -> Visibility {
        if let Some(config) = &self.config {
            log::info!("Closed via X button - embed_id: {}", config.embed_id);
        }
        self.hide()
    }

    /// Layout size reported to the host
    pub fn card_size(&self) -> u32 {
        self.config.as_ref().map_or(1, |c| c.card_size)
    }

    /// `#embed_<tag>` for this widget
    pub fn expected_fragment(&self) -> Option<String> {
        self.config.as_ref().map(|c| c.embed_id.fragment())
    }

    pub fn config(&self) -> Option<&EmbedderConfig> {
        self.config.as_ref()
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    pub fn failure(&self) -> Option<&EmbedderError> {
        match &self.phase {
            LoadPhase::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The first match was used although other cards carry the same tag
    pub fn has_duplicate_tag(&self) -> bool {
        self.duplicate
    }

    pub fn card(&self) -> Option<&C> {
        self.card.as_ref()
    }

    pub fn card_mut(&mut self) -> Option<&mut C> {
        self.card.as_mut()
    }
}
