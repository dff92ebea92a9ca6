//! Embedding widget core
//!
//! Host-independent part of the widget: lifecycle, load sequence,
//! visibility and the presentation plan. The browser binding in `api`
//! drives it and turns its output into DOM.

pub mod host;
pub mod hub;
pub mod lifecycle;
pub mod loader;
pub mod presentation;
pub mod visibility;

pub use host::{CardUnit, EmbedderHost, CONFIG_MESSAGE_TYPE};
pub use hub::{EmbedderHub, InstanceId, ScopeId};
pub use lifecycle::{Embedder, LoadPhase, StateDelivery};
pub use loader::{load_card, resolve_card, LoadRequest, Realized, ResolvedCard};
pub use presentation::{failure_panel, loading_panel, Header, Overflow, Presentation};
pub use visibility::{Visibility, VisibilityChange};
