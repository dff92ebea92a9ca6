//! Universal Embedder browser API
//!
//! Binds the embedder core to the Home Assistant frontend.
//!
//! # Module Structure
//!
//! - `helpers`: property access, serialization and error extraction on `JsValue`s
//! - `host`: `EmbedderHost` over `hass.connection` and the card helpers
//! - `dom`: builds the wrapper, header and panels from the presentation plan
//! - `element`: controller behind each `<universal-embedder>` element
//! - `registration`: custom element, editor catalog and `window.embedderHelpers`

pub mod dom;
pub mod element;
pub mod helpers;
pub mod host;
pub mod registration;

pub use element::{live_embedders, EmbedderElement};
pub use registration::{find_unused_id_js, register, validate_embed_id_js, ELEMENT_TAG};
