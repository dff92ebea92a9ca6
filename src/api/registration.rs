//! One-time registration with the host page
//!
//! - defines the `universal-embedder` custom element (skipped if defined)
//! - adds the card to `window.customCards` for the dashboard editor
//! - installs `window.embedderHelpers`
//!
//! Each step checks what is already there, so evaluating the module twice
//! leaves the page unchanged.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{HtmlElement, Window};

use crate::models::{validate_embed_id, DEFAULT_DASHBOARD};
use crate::search::find_unused_id;

use super::element::EmbedderElement;
use super::helpers::{get, serialize, set};
use super::host::HassHost;

pub const ELEMENT_TAG: &str = "universal-embedder";

// The controller exists only while the element is connected. Configuration
// and state are kept on the element and replayed when it is reattached.
#[wasm_bindgen(inline_js = r#"
export function define_embedder_element(tag, create, inspect, stubConfig) {
  class UniversalEmbedderElement extends HTMLElement {
    connectedCallback() {
      if (this._embedder) return;
      this._embedder = create(this);
      if (this._config) this._embedder.setConfig(this._config);
      if (this._hass) this._embedder.setHass(this._hass);
    }
    disconnectedCallback() {
      if (!this._embedder) return;
      this._embedder.free();
      this._embedder = null;
    }
    setConfig(config) {
      this._cardSize = inspect(config);
      if (this._embedder) this._embedder.setConfig(config);
      this._config = config;
    }
    set hass(hass) {
      this._hass = hass;
      if (this._embedder) this._embedder.setHass(hass);
    }
    getCardSize() {
      return this._embedder ? this._embedder.getCardSize() : (this._cardSize ?? 1);
    }
    show() { this._embedder?.show(); }
    hide() { this._embedder?.hide(); }
    toggle() { this._embedder?.toggle(); }
    static getStubConfig() { return { ...stubConfig }; }
  }
  customElements.define(tag, UniversalEmbedderElement);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn define_embedder_element(
        tag: &str,
        create: &js_sys::Function,
        inspect: &js_sys::Function,
        stub_config: &JsValue,
    ) -> Result<(), JsValue>;
}

/// Entry of the editor's card picker
#[derive(Serialize, Debug, Clone)]
struct CatalogEntry {
    #[serde(rename = "type")]
    card_type: &'static str,
    name: &'static str,
    preview: bool,
    description: &'static str,
}

const CATALOG_ENTRY: CatalogEntry = CatalogEntry {
    card_type: ELEMENT_TAG,
    name: "Universal Embedder",
    preview: true,
    description: "Card Embedding - Universal solution",
};

pub fn register() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;

    define_element(&window)?;
    add_catalog_entry(&window)?;
    install_helpers(&window)?;
    Ok(())
}

fn define_element(window: &Window) -> Result<(), JsValue> {
    let registry = window.custom_elements();
    if !registry.get(ELEMENT_TAG).is_undefined() {
        log::debug!("<{}> already defined", ELEMENT_TAG);
        return Ok(());
    }

    let create = Closure::wrap(Box::new(|element: HtmlElement| {
        JsValue::from(EmbedderElement::new(element))
    }) as Box<dyn Fn(HtmlElement) -> JsValue>);
    let inspect: Closure<dyn Fn(JsValue) -> Result<u32, JsValue>> =
        Closure::new(|config: JsValue| EmbedderElement::inspect_config(config).map_err(JsValue::from));
    let stub = EmbedderElement::stub_config().map_err(JsValue::from)?;

    define_embedder_element(
        ELEMENT_TAG,
        create.as_ref().unchecked_ref(),
        inspect.as_ref().unchecked_ref(),
        &stub,
    )?;
    create.forget();
    inspect.forget();

    log::info!("Registered <{}>", ELEMENT_TAG);
    Ok(())
}

fn add_catalog_entry(window: &Window) -> Result<(), JsValue> {
    let catalog = match get(window, "customCards")?.dyn_into::<js_sys::Array>() {
        Ok(catalog) => catalog,
        Err(_) => {
            let catalog = js_sys::Array::new();
            set(window, "customCards", &catalog)?;
            catalog
        }
    };

    let listed = catalog.iter().any(|entry| {
        get(&entry, "type")
            .ok()
            .and_then(|t| t.as_string())
            .is_some_and(|t| t == ELEMENT_TAG)
    });
    if !listed {
        catalog.push(&serialize(&CATALOG_ENTRY, "Catalog entry")?);
    }
    Ok(())
}

fn install_helpers(window: &Window) -> Result<(), JsValue> {
    let existing = get(window, "embedderHelpers")?;
    if !existing.is_undefined() && !existing.is_null() {
        return Ok(());
    }

    let helpers: JsValue = js_sys::Object::new().into();

    let find: Closure<dyn Fn(JsValue, JsValue) -> js_sys::Promise> =
        Closure::new(|hass: JsValue, dashboard: JsValue| {
            future_to_promise(async move { Ok(find_unused_id_js(hass, dashboard.as_string()).await) })
        });
    set(&helpers, "findUnusedId", find.as_ref())?;
    find.forget();

    let validate: Closure<dyn Fn(JsValue) -> Result<bool, JsValue>> =
        Closure::new(|id: JsValue| validate_embed_id_js(&id.as_string().unwrap_or_default()).map_err(JsValue::from));
    set(&helpers, "validateEmbedId", validate.as_ref())?;
    validate.forget();

    set(window, "embedderHelpers", &helpers)?;
    Ok(())
}

/// Lowest unused embed id on `dashboard` (default dashboard when omitted)
#[wasm_bindgen(js_name = findUnusedId)]
pub async fn find_unused_id_js(hass: JsValue, dashboard: Option<String>) -> JsValue {
    let dashboard = dashboard.unwrap_or_else(|| DEFAULT_DASHBOARD.to_string());
    match find_unused_id(&HassHost, &hass, &dashboard).await {
        Some(tag) => JsValue::from_str(tag.as_str()),
        None => JsValue::NULL,
    }
}

/// `true` for a canonical tag, throws otherwise
#[wasm_bindgen(js_name = validateEmbedId)]
pub fn validate_embed_id_js(id: &str) -> Result<bool, JsError> {
    validate_embed_id(id).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(true)
}
