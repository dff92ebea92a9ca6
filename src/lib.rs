//! Universal Embedder WASM Module
//!
//! Dashboard card that finds another card by its `EMBED#<tag>` icon marker
//! and renders it in place, with optional title/close chrome and
//! `#embed_<tag>` fragment control.

pub mod embedder;
pub mod errors;
pub mod models;
pub mod search;

#[cfg(target_arch = "wasm32")]
pub mod api;

// Re-export commonly used types
pub use embedder::{Embedder, EmbedderHost, EmbedderHub, LoadPhase, Visibility};
pub use errors::{EmbedderError, HostError};
pub use models::{DashboardConfig, EmbedTag, EmbedderConfig, RawConfig};
pub use search::{search_views, SearchResult};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::error_1(&format!("failed to initialize logger: {}", e).into());
    }

    match api::register() {
        Ok(()) => log::info!("Universal Embedder WASM module initialized"),
        Err(e) => log::error!("Universal Embedder registration failed: {:?}", e),
    }
}
