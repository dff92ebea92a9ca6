//! Host adapter over the Home Assistant frontend
//!
//! Dashboard configuration comes from `hass.connection.sendMessagePromise`,
//! cards are realized through `window.loadCardHelpers().createCardElement`.

use async_trait::async_trait;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::embedder::{CardUnit, EmbedderHost, CONFIG_MESSAGE_TYPE};
use crate::errors::HostError;
use crate::models::DashboardConfig;

use super::helpers::{call, deserialize, get, resolve, serialize, set};

/// Card element created by the host's card factory
pub struct LovelaceCard {
    element: HtmlElement,
}

impl LovelaceCard {
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl CardUnit for LovelaceCard {
    type State = JsValue;

    fn set_state(&mut self, hass: &JsValue) {
        if let Err(e) = set(&self.element, "hass", hass) {
            log::error!("Failed to forward hass to embedded card: {}", e);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HassHost;

#[async_trait(?Send)]
impl EmbedderHost for HassHost {
    type State = JsValue;
    type Card = LovelaceCard;

    async fn fetch_dashboard(
        &self,
        hass: &JsValue,
        url_path: Option<&str>,
    ) -> Result<DashboardConfig, HostError> {
        let connection = get(hass, "connection")?;

        let message: JsValue = js_sys::Object::new().into();
        set(&message, "type", &JsValue::from_str(CONFIG_MESSAGE_TYPE))?;
        let url_path = url_path.map(JsValue::from_str).unwrap_or(JsValue::NULL);
        set(&message, "url_path", &url_path)?;

        let pending = call(&connection, "sendMessagePromise", &[&message])?;
        let response = resolve(pending).await?;
        deserialize(response, "Malformed dashboard configuration")
    }

    async fn create_card(&self, descriptor: Value) -> Result<LovelaceCard, HostError> {
        let window = web_sys::window().ok_or_else(|| HostError::new("No window"))?;
        let helpers = resolve(call(&window, "loadCardHelpers", &[])?).await?;

        let config = serialize(&descriptor, "Card descriptor")?;
        let created = resolve(call(&helpers, "createCardElement", &[&config])?).await?;
        let element = created
            .dyn_into::<HtmlElement>()
            .map_err(|_| HostError::new("Card factory did not return an element"))?;

        Ok(LovelaceCard { element })
    }
}
