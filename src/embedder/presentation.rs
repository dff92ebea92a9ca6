//! Presentation plan for the embedder
//!
//! Computes what the DOM layer has to build: the wrapper chrome around the
//! realized card, plus the loading and failure panels. Styles mirror the
//! host's own card header so an embedded card looks native.

use serde::Serialize;

use crate::models::config::EmbedderConfig;

/// Root element: fills the slot the host gives it
pub const ROOT_STYLE: &str =
    "width: 100%; height: 100%; min-height: 0; padding: 0; margin: 0; border-radius: 0;";

pub const CONTAINER_CLASS: &str = "universal-embedder-container";
pub const CONTAINER_STYLE: &str = "padding: 0; margin: 0; height: 100%;";

/// Element the card is wrapped in
pub const WRAPPER_TAG: &str = "ha-card";
pub const WRAPPER_STYLE: &str = "display: flex; flex-direction: column; height: 100%; width: 100%; \
     padding: 0; margin: 0; border-radius: 0; background: none; box-shadow: none;";

pub const HEADER_CLASS: &str = "card-header";
pub const HEADER_STYLE: &str = "display: flex; justify-content: space-between; align-items: center; \
     padding: 8px 16px; min-height: 48px;";

pub const TITLE_CLASS: &str = "name";
pub const TITLE_STYLE: &str =
    "font-size: 16px; font-weight: 500; color: var(--primary-text-color); flex: 1;";

pub const CLOSE_CLASS: &str = "close-button";
pub const CLOSE_LABEL: &str = "×";
pub const CLOSE_STYLE: &str = "background: none; border: none; font-size: 24px; cursor: pointer; \
     color: var(--secondary-text-color); padding: 0; width: 32px; height: 32px; display: flex; \
     align-items: center; justify-content: center; border-radius: 50%; \
     transition: background-color 0.3s; margin: 0;";
pub const CLOSE_HOVER_BACKGROUND: &str = "var(--divider-color, #e0e0e0)";
pub const CLOSE_REST_BACKGROUND: &str = "transparent";

pub const CONTENT_CLASS: &str = "card-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Auto,
    Visible,
}

impl Overflow {
    pub fn as_css(self) -> &'static str {
        match self {
            Overflow::Auto => "auto",
            Overflow::Visible => "visible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub title: String,
    pub show_close: bool,
}

/// Chrome around a realized card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    /// Absent when there is neither a title nor a close control
    pub header: Option<Header>,
    pub overflow: Overflow,
}

impl Presentation {
    pub fn for_config(config: &EmbedderConfig) -> Self {
        let header = config.has_header().then(|| Header {
            title: config.embedder_title.clone(),
            show_close: config.show_close,
        });
        let overflow = if config.enable_scroll {
            Overflow::Auto
        } else {
            Overflow::Visible
        };
        Self { header, overflow }
    }

    pub fn content_style(&self) -> String {
        format!(
            "flex: 1; min-height: 0; display: flex; flex-direction: column; padding: 0; overflow: {};",
            self.overflow.as_css()
        )
    }
}

/// Placeholder shown while the dashboard is fetched
pub fn loading_panel(config: &EmbedderConfig) -> String {
    format!(
        r#"<div style="padding: 20px; text-align: center; color: var(--primary-color);">
  <div style="font-style: italic; margin-bottom: 10px;">Universal Embedder initializing...</div>
  <div style="font-size: 0.9em; color: var(--secondary-text-color);">Searching for card ID: <strong>{}</strong></div>
</div>"#,
        html_escape(config.embed_id.as_str())
    )
}

/// Panel replacing the widget when the load sequence fails
pub fn failure_panel(config: &EmbedderConfig, message: &str) -> String {
    format!(
        r#"<div style="color: var(--error-color); padding: 20px; text-align: center;">
  <div style="font-size: 1.2em; margin-bottom: 10px;">🔍 Embedding Failed</div>
  <div style="margin-bottom: 15px;">{message}</div>
  <div style="font-size: 0.9em; color: var(--secondary-text-color);">
    <strong>Troubleshooting tips:</strong><br>
    1. Add <code>icon: {icon}</code> to your source card<br>
    2. Verify dashboard name: "{dashboard}"<br>
    3. Ensure embed_id is unique (001-999)
  </div>
</div>"#,
        message = html_escape(message),
        icon = html_escape(&config.embed_id.icon()),
        dashboard = html_escape(&config.dashboard),
    )
}

/// Escape text interpolated into panel markup
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
