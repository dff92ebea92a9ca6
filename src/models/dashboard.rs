//! Dashboard configuration tree
//!
//! The host returns an ordered list of views, each with an ordered list of
//! cards. Cards are open-ended mappings, so they stay as raw JSON values and
//! the search engine inspects only the few keys it cares about.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Card property holding the embed marker
pub const ICON_KEY: &str = "icon";
/// Card property holding nested cards (generic children and stacks alike)
pub const CARDS_KEY: &str = "cards";
/// Card property holding the card's own display title
pub const TITLE_KEY: &str = "title";

/// Response of the `lovelace/config` request
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DashboardConfig {
    pub views: Vec<Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DashboardConfig {
    pub fn new(views: Vec<Value>) -> Self {
        Self {
            views,
            extra: serde_json::Map::new(),
        }
    }
}

/// Cards of a view or container, if it has a card sequence
pub fn card_sequence(node: &Value) -> Option<&Vec<Value>> {
    node.get(CARDS_KEY).and_then(Value::as_array)
}

/// Location of a card in the tree, e.g. `view_0/2/cards/1`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardPath(Vec<PathSegment>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    View(usize),
    Cards,
    Index(usize),
}

impl CardPath {
    pub fn view(index: usize) -> Self {
        CardPath(vec![PathSegment::View(index)])
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        CardPath(segments)
    }

    pub fn depth(&self) -> usize {
        self.0
            .iter()
            .filter(|s| matches!(s, PathSegment::Index(_)))
            .count()
    }
}

impl fmt::Display for CardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, "/")?;
            }
            first = false;
            match segment {
                PathSegment::View(i) => write!(f, "view_{}", i)?,
                PathSegment::Cards => write!(f, "cards")?,
                PathSegment::Index(i) => write!(f, "{}", i)?,
            }
        }
        Ok(())
    }
}
