//! Widget configuration
//!
//! The host hands over a loosely typed mapping (the Lovelace YAML for the
//! card). It is deserialized into [`RawConfig`], validated once, and frozen
//! into an [`EmbedderConfig`] for the lifetime of the widget.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EmbedderError;
use crate::models::serde_helpers::{positive_size, text, truthy, unless_false};
use crate::models::tag::{validate_embed_id, EmbedTag};

/// Dashboard name that denotes the host's default (unnamed) dashboard
pub const DEFAULT_DASHBOARD: &str = "lovelace";

/// Configuration exactly as supplied by the host, before validation.
///
/// Only `embed_id` and `dashboard` can make it invalid; optional settings of
/// the wrong type are coerced.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawConfig {
    /// String or number; numbers are stringified before validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub show_close: Option<bool>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub embedder_title: Option<String>,
    #[serde(default, deserialize_with = "unless_false", skip_serializing_if = "Option::is_none")]
    pub show_title: Option<bool>,
    #[serde(default, deserialize_with = "unless_false", skip_serializing_if = "Option::is_none")]
    pub default_visible: Option<bool>,
    #[serde(default, deserialize_with = "unless_false", skip_serializing_if = "Option::is_none")]
    pub enable_scroll: Option<bool>,
    #[serde(default, deserialize_with = "positive_size", skip_serializing_if = "Option::is_none")]
    pub card_size: Option<u32>,
}

impl RawConfig {
    /// Configuration offered to the dashboard editor for a freshly added card
    pub fn stub() -> Self {
        Self {
            embed_id: Some(Value::String("001".to_string())),
            dashboard: Some(DEFAULT_DASHBOARD.to_string()),
            ..Default::default()
        }
    }

    /// The embed id as text, treating empty/zero/null like an absent value
    fn embed_id_text(&self) -> Option<String> {
        match self.embed_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Validated, immutable widget configuration
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EmbedderConfig {
    pub embed_id: EmbedTag,
    pub dashboard: String,
    pub show_close: bool,
    pub embedder_title: String,
    pub show_title: bool,
    pub default_visible: bool,
    pub enable_scroll: bool,
    pub card_size: u32,
}

impl EmbedderConfig {
    /// Validate the raw mapping and apply defaults for optional fields
    pub fn from_raw(raw: RawConfig) -> Result<Self, EmbedderError> {
        let embed_id = raw.embed_id_text();
        let dashboard = raw.dashboard.clone().filter(|d| !d.is_empty());

        let (embed_id, dashboard) = match (embed_id, dashboard) {
            (Some(id), Some(dashboard)) => (id, dashboard),
            _ => {
                return Err(EmbedderError::configuration(
                    "Universal Embedder requires both embed_id AND dashboard parameters",
                ))
            }
        };

        if validate_embed_id(&embed_id).is_err() {
            return Err(EmbedderError::configuration(
                "embed_id must be a 3-digit number (001-999)",
            ));
        }
        let embed_id: EmbedTag = embed_id.parse()?;

        Ok(Self {
            embed_id,
            dashboard,
            show_close: raw.show_close.unwrap_or(false),
            embedder_title: raw.embedder_title.unwrap_or_default(),
            show_title: raw.show_title.unwrap_or(true),
            default_visible: raw.default_visible.unwrap_or(true),
            enable_scroll: raw.enable_scroll.unwrap_or(true),
            card_size: raw.card_size.filter(|&n| n > 0).unwrap_or(1),
        })
    }

    /// Validate an arbitrary JSON mapping (as received from the host)
    pub fn from_value(value: Value) -> Result<Self, EmbedderError> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| EmbedderError::configuration(format!("Invalid configuration: {}", e)))?;
        Self::from_raw(raw)
    }

    /// Validate a Lovelace YAML snippet
    pub fn from_yaml(yaml: &str) -> Result<Self, EmbedderError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)
            .map_err(|e| EmbedderError::configuration(format!("Invalid configuration: {}", e)))?;
        Self::from_raw(raw)
    }

    /// Path parameter for the configuration request; `None` for the default dashboard
    pub fn url_path(&self) -> Option<&str> {
        dashboard_url_path(&self.dashboard)
    }

    /// A header row is built only when there is something to put in it
    pub fn has_header(&self) -> bool {
        !self.embedder_title.is_empty() || self.show_close
    }
}

/// Map a dashboard name to the request path parameter
pub fn dashboard_url_path(dashboard: &str) -> Option<&str> {
    if dashboard == DEFAULT_DASHBOARD {
        None
    } else {
        Some(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let config = EmbedderConfig::from_value(json!({
            "type": "custom:universal-embedder",
            "embed_id": "042",
            "dashboard": "lovelace"
        }))
        .unwrap();

        assert_eq!(config.embed_id.as_str(), "042");
        assert!(!config.show_close);
        assert_eq!(config.embedder_title, "");
        assert!(config.show_title);
        assert!(config.default_visible);
        assert!(config.enable_scroll);
        assert_eq!(config.card_size, 1);
        assert_eq!(config.url_path(), None);
        assert!(!config.has_header());
    }

    #[test]
    fn test_missing_required_fields() {
        let err = EmbedderConfig::from_value(json!({ "embed_id": "042" })).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Universal Embedder requires both embed_id AND dashboard parameters"
        );

        let err = EmbedderConfig::from_value(json!({ "dashboard": "home" })).unwrap_err();
        assert!(err.is_configuration());

        let err = EmbedderConfig::from_value(json!({ "embed_id": "", "dashboard": "home" }))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_tag() {
        for id in ["42", "4200", "abc", "0a2", "000"] {
            let err = EmbedderConfig::from_value(json!({ "embed_id": id, "dashboard": "home" }))
                .unwrap_err();
            assert_eq!(err.to_string(), "embed_id must be a 3-digit number (001-999)");
        }
    }

    #[test]
    fn test_numeric_embed_id_is_stringified() {
        let config =
            EmbedderConfig::from_value(json!({ "embed_id": 123, "dashboard": "home" })).unwrap();
        assert_eq!(config.embed_id.as_str(), "123");

        // 7 stringifies to "7", which is not three digits
        assert!(EmbedderConfig::from_value(json!({ "embed_id": 7, "dashboard": "home" })).is_err());
    }

    #[test]
    fn test_named_dashboard_path() {
        let config = EmbedderConfig::from_yaml(
            "embed_id: \"007\"\ndashboard: dashboard-climate\nembedder_title: Climate\ncard_size: 4\n",
        )
        .unwrap();
        assert_eq!(config.url_path(), Some("dashboard-climate"));
        assert_eq!(config.card_size, 4);
        assert!(config.has_header());
    }

    #[test]
    fn test_zero_card_size_falls_back() {
        let config = EmbedderConfig::from_value(json!({
            "embed_id": "001", "dashboard": "lovelace", "card_size": 0
        }))
        .unwrap();
        assert_eq!(config.card_size, 1);
    }

    #[test]
    fn test_stub_config_is_valid() {
        let config = EmbedderConfig::from_raw(RawConfig::stub()).unwrap();
        assert_eq!(config.embed_id.as_str(), "001");
        assert_eq!(config.dashboard, DEFAULT_DASHBOARD);
    }

    #[test]
    fn test_mistyped_optional_settings_are_coerced() {
        let config = EmbedderConfig::from_value(json!({
            "embed_id": "001",
            "dashboard": "lovelace",
            "card_size": 2.5,
            "embedder_title": 12,
            "show_close": 1,
            "show_title": "no",
            "enable_scroll": 0
        }))
        .unwrap();
        assert_eq!(config.card_size, 3);
        assert_eq!(config.embedder_title, "12");
        assert!(config.show_close);
        assert!(config.show_title);
        assert!(config.enable_scroll);

        let config = EmbedderConfig::from_value(json!({
            "embed_id": "001", "dashboard": "lovelace", "card_size": "3", "default_visible": false
        }))
        .unwrap();
        assert_eq!(config.card_size, 3);
        assert!(!config.default_visible);

        let config = EmbedderConfig::from_value(json!({
            "embed_id": "001", "dashboard": "lovelace", "card_size": "huge", "show_close": ""
        }))
        .unwrap();
        assert_eq!(config.card_size, 1);
        assert!(!config.show_close);
    }

    #[test]
    fn test_mistyped_yaml_settings_are_coerced() {
        let config = EmbedderConfig::from_yaml(
            "embed_id: \"005\"\ndashboard: lovelace\nshow_close: yes please\ncard_size: \"2\"\n",
        )
        .unwrap();
        assert!(config.show_close);
        assert_eq!(config.card_size, 2);
    }
}
