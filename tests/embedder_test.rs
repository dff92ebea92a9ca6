// Load sequence and lifecycle against an in-memory host

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use futures::executor::block_on;
use serde_json::{json, Value};

use universal_embedder::embedder::{
    load_card, CardUnit, Embedder, EmbedderHost, LoadPhase, StateDelivery, Visibility,
};
use universal_embedder::search::find_unused_id;
use universal_embedder::{DashboardConfig, EmbedderError, HostError, RawConfig};

#[derive(Debug)]
struct MockCard {
    descriptor: Value,
    states: Vec<u32>,
}

impl CardUnit for MockCard {
    type State = u32;

    fn set_state(&mut self, state: &u32) {
        self.states.push(*state);
    }
}

#[derive(Default)]
struct MockHost {
    dashboards: HashMap<Option<String>, DashboardConfig>,
    requests: RefCell<Vec<Option<String>>>,
    created: RefCell<Vec<Value>>,
    factory_error: Option<String>,
}

impl MockHost {
    fn with_dashboard(url_path: Option<&str>, views: Vec<Value>) -> Self {
        let mut host = MockHost::default();
        host.dashboards
            .insert(url_path.map(str::to_string), DashboardConfig::new(views));
        host
    }
}

#[async_trait(?Send)]
impl EmbedderHost for MockHost {
    type State = u32;
    type Card = MockCard;

    async fn fetch_dashboard(
        &self,
        _state: &u32,
        url_path: Option<&str>,
    ) -> Result<DashboardConfig, HostError> {
        let key = url_path.map(str::to_string);
        self.requests.borrow_mut().push(key.clone());
        self.dashboards
            .get(&key)
            .cloned()
            .ok_or_else(|| HostError::new("Not found"))
    }

    async fn create_card(&self, descriptor: Value) -> Result<MockCard, HostError> {
        if let Some(message) = &self.factory_error {
            return Err(HostError::new(message.clone()));
        }
        self.created.borrow_mut().push(descriptor.clone());
        Ok(MockCard {
            descriptor,
            states: Vec::new(),
        })
    }
}

fn raw(value: Value) -> RawConfig {
    serde_json::from_value(value).unwrap()
}

fn embedder(config: Value) -> Embedder<MockCard> {
    let mut embedder = Embedder::new();
    embedder.configure(raw(config)).unwrap();
    embedder
}

fn home_views() -> Vec<Value> {
    vec![json!({ "title": "Home", "cards": [
        { "type": "entities", "title": "Heating", "icon": "EMBED#042", "entities": ["climate.hall"] },
        { "type": "vertical-stack", "cards": [
            { "type": "glance", "title": "Doors", "icon": "EMBED#043" },
            { "type": "glance", "title": "Doors again", "icon": "EMBED#043" }
        ]}
    ]})]
}

#[test]
fn test_default_dashboard_loads_with_null_path() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));

    let phase = block_on(widget.deliver_state(&host, 1)).clone();
    assert_eq!(phase, LoadPhase::Ready);
    assert_eq!(*host.requests.borrow(), vec![None]);

    let card = widget.card().unwrap();
    assert_eq!(card.descriptor["title"], "Heating");
    assert_eq!(card.states, vec![1]);
    assert!(!widget.has_duplicate_tag());
}

#[test]
fn test_named_dashboard_uses_its_path() {
    let host = MockHost::with_dashboard(Some("dashboard-climate"), home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "dashboard-climate" }));

    block_on(widget.deliver_state(&host, 1));
    assert!(widget.is_ready());
    assert_eq!(
        *host.requests.borrow(),
        vec![Some("dashboard-climate".to_string())]
    );
}

#[test]
fn test_subsequent_states_are_forwarded_without_refetch() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));

    block_on(widget.deliver_state(&host, 1));
    block_on(widget.deliver_state(&host, 2));
    assert!(matches!(widget.receive_state(3), StateDelivery::Forwarded));

    assert_eq!(host.requests.borrow().len(), 1);
    assert_eq!(host.created.borrow().len(), 1);
    assert_eq!(widget.card().unwrap().states, vec![1, 2, 3]);
}

#[test]
fn test_duplicate_tag_is_a_warning_not_an_error() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "043", "dashboard": "lovelace" }));

    block_on(widget.deliver_state(&host, 1));
    assert!(widget.is_ready());
    assert!(widget.has_duplicate_tag());
    assert_eq!(widget.card().unwrap().descriptor["title"], "Doors");
}

#[test]
fn test_title_suppression() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut hidden = embedder(json!({ "embed_id": "042", "dashboard": "lovelace", "show_title": false }));
    block_on(hidden.deliver_state(&host, 1));
    assert!(hidden.card().unwrap().descriptor.get("title").is_none());
    assert_eq!(hidden.card().unwrap().descriptor["entities"], json!(["climate.hall"]));

    let mut shown = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));
    block_on(shown.deliver_state(&host, 1));
    assert_eq!(shown.card().unwrap().descriptor["title"], "Heating");
}

#[test]
fn test_realized_copies_are_independent() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut first = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));
    let mut second = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));
    block_on(first.deliver_state(&host, 1));
    block_on(second.deliver_state(&host, 1));

    first.card_mut().unwrap().descriptor["title"] = json!("mutated");

    assert_eq!(second.card().unwrap().descriptor["title"], "Heating");
    assert_eq!(host.created.borrow()[1]["title"], "Heating");
    assert_eq!(host.dashboards[&None].views[0]["cards"][0]["title"], "Heating");
}

#[test]
fn test_card_not_found_is_contained() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "099", "dashboard": "lovelace" }));

    block_on(widget.deliver_state(&host, 1));
    let failure = widget.failure().unwrap();
    assert_eq!(
        failure,
        &EmbedderError::CardNotFound {
            tag: "099".to_string(),
            dashboard: "lovelace".to_string()
        }
    );
    assert!(failure.to_string().contains("#099"));
    assert!(failure.to_string().contains("'lovelace'"));
    assert!(host.created.borrow().is_empty());

    // Terminal: later states neither retry nor fetch
    assert!(matches!(widget.receive_state(2), StateDelivery::Stale));
    block_on(widget.deliver_state(&host, 3));
    assert_eq!(host.requests.borrow().len(), 1);
}

#[test]
fn test_unknown_dashboard_maps_to_access_error() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "nowhere" }));

    block_on(widget.deliver_state(&host, 1));
    assert_eq!(
        widget.failure().unwrap().to_string(),
        "Dashboard 'nowhere' not found or inaccessible"
    );
}

#[test]
fn test_factory_failure_is_a_search_error() {
    let mut host = MockHost::with_dashboard(None, home_views());
    host.factory_error = Some("Custom element doesn't exist".to_string());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));

    block_on(widget.deliver_state(&host, 1));
    assert_eq!(
        widget.failure().unwrap().to_string(),
        "Search error: Custom element doesn't exist"
    );
}

#[test]
fn test_split_load_keeps_latest_state() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "lovelace" }));

    let StateDelivery::StartLoad(request) = widget.receive_state(1) else {
        panic!("first state must start the load");
    };
    assert!(matches!(widget.receive_state(2), StateDelivery::Deferred));
    assert!(matches!(widget.receive_state(3), StateDelivery::Deferred));

    let result = block_on(load_card(&host, &request));
    assert!(widget.complete_load(request.generation, result));
    assert_eq!(widget.card().unwrap().states, vec![3]);
}

#[test]
fn test_close_survives_later_states() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "042", "dashboard": "lovelace", "show_close": true }));
    block_on(widget.deliver_state(&host, 1));

    assert_eq!(widget.close(), Visibility::Hidden);
    block_on(widget.deliver_state(&host, 2));
    assert_eq!(widget.visibility(), Visibility::Hidden);
}

#[test]
fn test_reconfigure_restarts_from_configured() {
    let host = MockHost::with_dashboard(None, home_views());
    let mut widget = embedder(json!({ "embed_id": "099", "dashboard": "lovelace" }));
    block_on(widget.deliver_state(&host, 1));
    assert!(widget.failure().is_some());

    widget
        .configure(raw(json!({ "embed_id": "042", "dashboard": "lovelace", "default_visible": false })))
        .unwrap();
    assert_eq!(widget.phase(), &LoadPhase::Configured);
    assert_eq!(widget.visibility(), Visibility::Hidden);

    block_on(widget.deliver_state(&host, 2));
    assert!(widget.is_ready());
}

#[test]
fn test_invalid_config_is_rejected_at_configure() {
    let mut widget: Embedder<MockCard> = Embedder::new();
    let err = widget
        .configure(raw(json!({ "embed_id": "7", "dashboard": "lovelace" })))
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(widget.phase(), &LoadPhase::Unconfigured);
}

#[test]
fn test_find_unused_id() {
    let host = MockHost::with_dashboard(None, home_views());
    let tag = block_on(find_unused_id(&host, &0, "lovelace")).unwrap();
    assert_eq!(tag.as_str(), "001");

    let taken: Vec<Value> = (1..=5)
        .map(|n| json!({ "icon": format!("EMBED#{:03}", n) }))
        .collect();
    let host = MockHost::with_dashboard(Some("busy"), vec![json!({ "cards": taken })]);
    let tag = block_on(find_unused_id(&host, &0, "busy")).unwrap();
    assert_eq!(tag.as_str(), "006");
}

#[test]
fn test_find_unused_id_falls_back_on_fetch_error() {
    let host = MockHost::default();
    let tag = block_on(find_unused_id(&host, &0, "missing")).unwrap();
    assert_eq!(tag.as_str(), "001");
}
