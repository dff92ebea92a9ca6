//! Card discovery
//!
//! Pre-order walk over a dashboard tree looking for the card whose icon
//! carries `EMBED#<tag>`. The whole tree is always walked so that a second
//! card with the same tag can be reported; the first card in pre-order wins.
//!
//! Cards nest through two structural edges: generic children (grids,
//! conditional wrappers, ...) and stacks (cards whose `type` contains
//! `stack`). Both keep their nested cards under the same `cards` key, so a
//! single descent covers both and a card inside a stack is never counted as
//! its own duplicate.

pub mod scanner;

use serde_json::Value;

use crate::models::dashboard::{card_sequence, CardPath, PathSegment, ICON_KEY};
use crate::models::tag::tag_in_icon;

pub use scanner::{find_unused_id, lowest_unused_tag, used_tags};

/// Nesting limit; the host promises an acyclic tree but the walk never relies on it
pub const MAX_DEPTH: usize = 64;

/// Outcome of a search over one dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult<'a> {
    /// First matching card in pre-order
    pub card: Option<&'a Value>,
    /// Where the first match sits in the tree
    pub path: Option<CardPath>,
    /// More than one card carries the tag
    pub duplicate: bool,
    /// Total number of matching cards
    pub matches: usize,
}

impl SearchResult<'_> {
    pub fn found(&self) -> bool {
        self.card.is_some()
    }
}

/// Visit every card reachable from `views` in pre-order.
///
/// Views without a card sequence are skipped, as are entries that are not
/// objects (nulls, numbers, strings).
pub fn walk_views<'a, F>(views: &'a [Value], mut visit: F)
where
    F: FnMut(&'a Value, &CardPath),
{
    for (index, view) in views.iter().enumerate() {
        if let Some(cards) = card_sequence(view) {
            walk_cards(cards, &CardPath::view(index), 0, &mut visit);
        }
    }
}

fn walk_cards<'a, F>(cards: &'a [Value], path: &CardPath, depth: usize, visit: &mut F)
where
    F: FnMut(&'a Value, &CardPath),
{
    if depth > MAX_DEPTH {
        log::warn!("Card nesting deeper than {} at {}, not descending further", MAX_DEPTH, path);
        return;
    }

    for (index, card) in cards.iter().enumerate() {
        if !card.is_object() {
            continue;
        }

        let card_path = path.child(PathSegment::Index(index));
        visit(card, &card_path);

        if let Some(nested) = card_sequence(card) {
            walk_cards(nested, &card_path.child(PathSegment::Cards), depth + 1, visit);
        }
    }
}

/// The embed tag a card carries in its icon, if any
pub fn card_tag(card: &Value) -> Option<&str> {
    card.get(ICON_KEY).and_then(Value::as_str).and_then(tag_in_icon)
}

/// Find the card tagged `target` across all views
pub fn search_views<'a>(views: &'a [Value], target: &str) -> SearchResult<'a> {
    let mut result = SearchResult::default();

    walk_views(views, |card, path| {
        if card_tag(card) != Some(target) {
            return;
        }
        result.matches += 1;
        if result.card.is_some() {
            result.duplicate = true;
        } else {
            log::debug!("Found #{} at path: {}", target, path);
            result.card = Some(card);
            result.path = Some(path.clone());
        }
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn views() -> Vec<Value> {
        vec![
            json!({ "title": "Home", "cards": [
                { "type": "entities", "icon": "mdi:home" },
                { "type": "vertical-stack", "cards": [
                    { "type": "glance", "icon": "EMBED#001", "title": "Lights" }
                ]}
            ]}),
            json!({ "title": "Climate" }),
        ]
    }

    #[test]
    fn test_finds_card_inside_stack() {
        let views = views();
        let result = search_views(&views, "001");
        assert!(result.found());
        assert!(!result.duplicate);
        assert_eq!(result.matches, 1);
        assert_eq!(result.card.unwrap()["title"], "Lights");
        assert_eq!(result.path.unwrap().to_string(), "view_0/1/cards/0");
    }

    #[test]
    fn test_missing_tag() {
        let views = views();
        let result = search_views(&views, "002");
        assert!(!result.found());
        assert_eq!(result.matches, 0);
        assert!(result.path.is_none());
    }

    #[test]
    fn test_stack_children_counted_once() {
        for stack_type in ["vertical-stack", "horizontal-stack", "custom:layout-stack"] {
            let views = vec![json!({ "cards": [
                { "type": stack_type, "cards": [{ "icon": "EMBED#004" }] }
            ]})];
            let result = search_views(&views, "004");
            assert_eq!(result.matches, 1, "{}", stack_type);
            assert!(!result.duplicate, "{}", stack_type);
            assert_eq!(result.path.unwrap().to_string(), "view_0/0/cards/0");
        }
    }

    #[test]
    fn test_stack_without_cards_is_a_leaf() {
        let views = vec![json!({ "cards": [{ "type": "vertical-stack", "icon": "EMBED#006" }] })];
        let mut visited = 0;
        walk_views(&views, |_, _| visited += 1);
        assert_eq!(visited, 1);
        assert!(search_views(&views, "006").found());
    }

    #[test]
    fn test_skips_non_object_entries() {
        let views = vec![json!({ "cards": [null, 3, "text", [], { "icon": "EMBED#005" }] })];
        let result = search_views(&views, "005");
        assert!(result.found());
        assert_eq!(result.path.unwrap().to_string(), "view_0/4");
    }

    #[test]
    fn test_depth_cap_stops_descent() {
        let mut card = json!({ "icon": "EMBED#009" });
        for _ in 0..(MAX_DEPTH + 5) {
            card = json!({ "type": "grid", "cards": [card] });
        }
        let views = vec![json!({ "cards": [card] })];
        let result = search_views(&views, "009");
        assert!(!result.found());
    }
}
