//! JavaScript-facing embedder controller
//!
//! Every `<universal-embedder>` element owns one [`EmbedderElement`]. All
//! embedders on the page live in a single [`EmbedderHub`]; the hub is only
//! borrowed for short synchronous sections, never across an await.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;

use crate::embedder::{
    load_card, EmbedderHub, InstanceId, LoadPhase, LoadRequest, Realized, ScopeId, StateDelivery,
    VisibilityChange,
};
use crate::errors::EmbedderError;
use crate::models::{EmbedderConfig, RawConfig};

use super::dom;
use super::host::{HassHost, LovelaceCard};

/// Enclosing element that scopes sibling embedders
const VIEW_SELECTOR: &str = "hui-view";
const SCOPE_ATTRIBUTE: &str = "data-embedder-scope";
const HASH_CHANGE: &str = "hashchange";
/// Delay of the one-shot fragment check after assembly
const INITIAL_CHECK_DELAY_MS: i32 = 100;

thread_local! {
    static HUB: RefCell<EmbedderHub<LovelaceCard>> = RefCell::new(EmbedderHub::new());
    static ELEMENTS: RefCell<HashMap<InstanceId, HtmlElement>> = RefCell::new(HashMap::new());
    static LISTENERS: RefCell<HashMap<InstanceId, Closure<dyn Fn()>>> = RefCell::new(HashMap::new());
    static NEXT_INSTANCE: Cell<InstanceId> = const { Cell::new(1) };
    static NEXT_SCOPE: Cell<u64> = const { Cell::new(1) };
}

/// Run `f` on the hub; `None` when the hub is already borrowed further up the
/// stack (a nested embedder reacting to a state push from its parent)
fn with_hub<R>(f: impl FnOnce(&mut EmbedderHub<LovelaceCard>) -> R) -> Option<R> {
    HUB.with(|hub| hub.try_borrow_mut().ok().map(|mut hub| f(&mut hub)))
}

fn read_hub<R>(f: impl FnOnce(&EmbedderHub<LovelaceCard>) -> R) -> Option<R> {
    HUB.with(|hub| hub.try_borrow().ok().map(|hub| f(&hub)))
}

/// Embedders currently attached to the page; `None` while the hub is busy
pub fn live_embedders() -> Option<usize> {
    read_hub(|hub| hub.len())
}

fn element_of(id: InstanceId) -> Option<HtmlElement> {
    ELEMENTS.with(|elements| elements.borrow().get(&id).cloned())
}

fn apply_changes(changes: &[VisibilityChange]) {
    for change in changes {
        if let Some(element) = element_of(change.id) {
            dom::apply_visibility(&element, change.visibility);
        }
    }
}

fn parse_config(config: JsValue) -> Result<EmbedderConfig, JsError> {
    let raw: RawConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid configuration: {}", e)))?;
    EmbedderConfig::from_raw(raw).map_err(|e| JsError::new(&e.to_string()))
}

/// Controller of one connected `<universal-embedder>` element.
///
/// Dropping it (`free()` from the element's `disconnectedCallback`) removes
/// the embedder from the page registry and stops its fragment listener.
#[wasm_bindgen]
pub struct EmbedderElement {
    id: InstanceId,
}

#[wasm_bindgen]
impl EmbedderElement {
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement) -> EmbedderElement {
        let id = NEXT_INSTANCE.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        ELEMENTS.with(|elements| elements.borrow_mut().insert(id, element));
        attach(id);
        EmbedderElement { id }
    }

    /// Validate the card configuration; throws on invalid input
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsError> {
        let config = parse_config(config)?;
        with_hub(|hub| hub.ensure(self.id).apply_config(config))
            .ok_or_else(|| JsError::new("Embedder busy, configuration rejected"))
    }

    /// Validate a configuration without an attached embedder and return the
    /// card size it asks for
    #[wasm_bindgen(js_name = inspectConfig)]
    pub fn inspect_config(config: JsValue) -> Result<u32, JsError> {
        Ok(parse_config(config)?.card_size)
    }

    /// New application state from the host
    #[wasm_bindgen(js_name = setHass)]
    pub fn set_hass(&self, hass: JsValue) {
        deliver_state(self.id, hass);
    }

    #[wasm_bindgen(js_name = getCardSize)]
    pub fn card_size(&self) -> u32 {
        read_hub(|hub| hub.get(self.id).map(|e| e.card_size()))
            .flatten()
            .unwrap_or(1)
    }

    pub fn show(&self) {
        self.change(EmbedderHub::show);
    }

    pub fn hide(&self) {
        self.change(EmbedderHub::hide);
    }

    pub fn toggle(&self) {
        self.change(EmbedderHub::toggle);
    }

    /// Configuration offered to the dashboard editor
    #[wasm_bindgen(js_name = stubConfig)]
    pub fn stub_config() -> Result<JsValue, JsError> {
        super::helpers::serialize(&RawConfig::stub(), "Stub config")
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

impl EmbedderElement {
    fn change(
        &self,
        f: impl FnOnce(&mut EmbedderHub<LovelaceCard>, InstanceId) -> Option<VisibilityChange>,
    ) {
        if let Some(Some(change)) = with_hub(|hub| f(hub, self.id)) {
            apply_changes(&[change]);
        }
    }
}

impl Drop for EmbedderElement {
    fn drop(&mut self) {
        ELEMENTS.with(|elements| elements.borrow_mut().remove(&self.id));
        remove_fragment_listener(self.id);
        detach(self.id);
    }
}

/// Add `id` to the hub, on the next tick if the hub is busy. Skipped once
/// the element has been released.
fn attach(id: InstanceId) {
    if element_of(id).is_none() {
        return;
    }
    if with_hub(|hub| {
        hub.ensure(id);
    })
    .is_none()
    {
        spawn_local(async move { attach(id) });
    }
}

fn detach(id: InstanceId) {
    if with_hub(|hub| {
        hub.remove(id);
    })
    .is_none()
    {
        spawn_local(async move { detach(id) });
    }
}

/// Hand `hass` to the embedder, retrying on the next tick if the hub is busy
fn deliver_state(id: InstanceId, hass: JsValue) {
    let delivery = HUB.with(|hub| match hub.try_borrow_mut() {
        Ok(mut hub) => Ok(hub.get_mut(id).map(|embedder| embedder.receive_state(hass))),
        Err(_) => Err(hass),
    });

    match delivery {
        Ok(Some(StateDelivery::StartLoad(request))) => start_load(id, request),
        Ok(_) => {}
        Err(hass) => spawn_local(async move { deliver_state(id, hass) }),
    }
}

fn start_load(id: InstanceId, request: LoadRequest<JsValue>) {
    let Some(root) = element_of(id) else {
        return;
    };
    if let Some(visibility) = read_hub(|hub| hub.get(id).map(|e| e.visibility())).flatten() {
        dom::show_loading(&root, &request.config, visibility);
    }

    spawn_local(async move {
        let result = load_card(&HassHost, &request).await;
        finish_load(id, root, request, result);
    });
}

fn finish_load(
    id: InstanceId,
    root: HtmlElement,
    request: LoadRequest<JsValue>,
    result: Result<Realized<LovelaceCard>, EmbedderError>,
) {
    let applied = HUB.with(|hub| match hub.try_borrow_mut() {
        Ok(mut hub) => Ok(hub
            .get_mut(id)
            .is_some_and(|embedder| embedder.complete_load(request.generation, result))),
        Err(_) => Err(result),
    });

    match applied {
        Ok(true) => render_outcome(id, root, request.config),
        Ok(false) => {}
        Err(result) => spawn_local(async move { finish_load(id, root, request, result) }),
    }
}

fn render_outcome(id: InstanceId, root: HtmlElement, config: EmbedderConfig) {
    let outcome = read_hub(|hub| {
        let embedder = hub.get(id)?;
        Some(match embedder.phase() {
            LoadPhase::Ready => Ok(embedder.card().map(|c| c.element().clone())),
            LoadPhase::Failed(e) => Err(e.to_string()),
            _ => Ok(None),
        })
    });

    let outcome = match outcome {
        Some(outcome) => outcome,
        None => {
            spawn_local(async move { render_outcome(id, root, config) });
            return;
        }
    };

    match outcome {
        Some(Ok(Some(card))) => {
            let on_close = move || {
                if let Some(Some(change)) = with_hub(|hub| hub.close(id)) {
                    apply_changes(&[change]);
                }
            };
            if let Err(e) = dom::assemble(&root, &config, &card, on_close) {
                log::error!("Failed to assemble embedder #{}: {:?}", config.embed_id, e);
                return;
            }
            install_fragment_control(id);
        }
        Some(Err(message)) => dom::show_failure(&root, &config, &message),
        _ => {}
    }
}

/// Listen for fragment changes and check once shortly after assembly
fn install_fragment_control(id: InstanceId) {
    let Some(window) = web_sys::window() else {
        return;
    };

    remove_fragment_listener(id);
    let on_hash_change: Closure<dyn Fn()> = Closure::new(move || check_fragment(id));
    match window.add_event_listener_with_callback(HASH_CHANGE, on_hash_change.as_ref().unchecked_ref()) {
        Ok(()) => {
            LISTENERS.with(|listeners| listeners.borrow_mut().insert(id, on_hash_change));
        }
        Err(e) => log::error!("Failed to listen for hashchange: {:?}", e),
    }

    let initial = Closure::once_into_js(move || check_fragment(id));
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        initial.unchecked_ref(),
        INITIAL_CHECK_DELAY_MS,
    ) {
        log::error!("Failed to schedule initial hash check: {:?}", e);
    }
}

fn remove_fragment_listener(id: InstanceId) {
    let Some(listener) = LISTENERS.with(|listeners| listeners.borrow_mut().remove(&id)) else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) =
        window.remove_event_listener_with_callback(HASH_CHANGE, listener.as_ref().unchecked_ref())
    {
        log::error!("Failed to remove hashchange listener: {:?}", e);
    }
}

fn check_fragment(id: InstanceId) {
    let hash = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();

    let elements: Vec<(InstanceId, HtmlElement)> = ELEMENTS.with(|elements| {
        elements
            .borrow()
            .iter()
            .map(|(&member, element)| (member, element.clone()))
            .collect()
    });
    let scopes: Vec<(InstanceId, Option<ScopeId>)> = elements
        .iter()
        .map(|(member, element)| (*member, scope_of(element)))
        .collect();

    let changes = with_hub(|hub| {
        for (member, scope) in scopes {
            hub.set_scope(member, scope);
        }
        hub.check_fragment(id, &hash)
    })
    .unwrap_or_default();

    apply_changes(&changes);
}

/// Identity of the view containing `element`, stamped on the view on first use
fn scope_of(element: &HtmlElement) -> Option<ScopeId> {
    let view = element.closest(VIEW_SELECTOR).ok().flatten()?;
    if let Some(existing) = view
        .get_attribute(SCOPE_ATTRIBUTE)
        .and_then(|v| v.parse().ok())
    {
        return Some(ScopeId(existing));
    }

    let scope = NEXT_SCOPE.with(|next| {
        let scope = next.get();
        next.set(scope + 1);
        scope
    });
    if let Err(e) = view.set_attribute(SCOPE_ATTRIBUTE, &scope.to_string()) {
        log::error!("Failed to stamp view scope: {:?}", e);
    }
    Some(ScopeId(scope))
}
