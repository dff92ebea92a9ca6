//! Registry of all embedders on a page
//!
//! Embedders inside the same view container are siblings: when one of them
//! is opened through the URL fragment the others in that view are hidden.
//! Scopes are tracked explicitly as `scope -> instances` instead of being
//! rediscovered from rendered output.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::host::CardUnit;
use super::lifecycle::Embedder;
use super::visibility::{Visibility, VisibilityChange};

pub type InstanceId = u32;

/// Identity of an enclosing view container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u64);

struct Member<C: CardUnit> {
    embedder: Embedder<C>,
    scope: Option<ScopeId>,
}

pub struct EmbedderHub<C: CardUnit> {
    next_id: InstanceId,
    members: BTreeMap<InstanceId, Member<C>>,
    scopes: HashMap<ScopeId, BTreeSet<InstanceId>>,
}

impl<C: CardUnit> Default for EmbedderHub<C>
where
    C::State: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CardUnit> EmbedderHub<C>
where
    C::State: Clone,
{
    pub fn new() -> Self {
        Self {
            next_id: 1,
            members: BTreeMap::new(),
            scopes: HashMap::new(),
        }
    }

    /// Register a new, unconfigured embedder
    pub fn create(&mut self) -> InstanceId {
        self.insert(Embedder::new())
    }

    pub fn insert(&mut self, embedder: Embedder<C>) -> InstanceId {
        let id = self.next_id;
        self.next_id += 1;
        self.members.insert(id, Member { embedder, scope: None });
        id
    }

    /// Embedder registered under a caller-chosen `id`, created unconfigured
    /// if it is not there yet
    pub fn ensure(&mut self, id: InstanceId) -> &mut Embedder<C> {
        self.next_id = self.next_id.max(id.saturating_add(1));
        &mut self
            .members
            .entry(id)
            .or_insert_with(|| Member {
                embedder: Embedder::new(),
                scope: None,
            })
            .embedder
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<Embedder<C>> {
        self.set_scope(id, None);
        self.members.remove(&id).map(|m| m.embedder)
    }

    pub fn get(&self, id: InstanceId) -> Option<&Embedder<C>> {
        self.members.get(&id).map(|m| &m.embedder)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Embedder<C>> {
        self.members.get_mut(&id).map(|m| &mut m.embedder)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Move an instance into `scope` (or out of any scope)
    pub fn set_scope(&mut self, id: InstanceId, scope: Option<ScopeId>) {
        let Some(member) = self.members.get_mut(&id) else {
            return;
        };
        if member.scope == scope {
            return;
        }
        if let Some(old) = member.scope.take() {
            if let Some(ids) = self.scopes.get_mut(&old) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.scopes.remove(&old);
                }
            }
        }
        if let Some(new) = scope {
            self.scopes.entry(new).or_default().insert(id);
        }
        member.scope = scope;
    }

    pub fn scope_of(&self, id: InstanceId) -> Option<ScopeId> {
        self.members.get(&id).and_then(|m| m.scope)
    }

    /// Other instances sharing `id`'s scope, in registration order
    pub fn siblings(&self, id: InstanceId) -> Vec<InstanceId> {
        self.scope_of(id)
            .and_then(|scope| self.scopes.get(&scope))
            .map(|ids| ids.iter().copied().filter(|&other| other != id).collect())
            .unwrap_or_default()
    }

    /// Run the fragment check for one instance.
    ///
    /// On a match the instance is shown and every configured sibling in its
    /// view is hidden. No match, no changes.
    pub fn check_fragment(&mut self, id: InstanceId, fragment: &str) -> Vec<VisibilityChange> {
        let matched = self
            .get_mut(id)
            .is_some_and(|embedder| embedder.check_fragment(fragment));
        if !matched {
            return Vec::new();
        }

        let mut changes = vec![VisibilityChange {
            id,
            visibility: Visibility::Visible,
        }];

        if self.scope_of(id).is_none() {
            log::debug!("No view found for closing others");
            return changes;
        }

        let mut closed = 0;
        for sibling in self.siblings(id) {
            if let Some(embedder) = self.get_mut(sibling) {
                if embedder.config().is_some() {
                    changes.push(VisibilityChange {
                        id: sibling,
                        visibility: embedder.hide(),
                    });
                    closed += 1;
                }
            }
        }
        log::debug!("Closed {} other embedder(s)", closed);

        changes
    }

    pub fn show(&mut self, id: InstanceId) -> Option<VisibilityChange> {
        self.change(id, Embedder::show)
    }

    pub fn hide(&mut self, id: InstanceId) -> Option<VisibilityChange> {
        self.change(id, Embedder::hide)
    }

    pub fn toggle(&mut self, id: InstanceId) -> Option<VisibilityChange> {
        self.change(id, Embedder::toggle)
    }

    pub fn close(&mut self, id: InstanceId) -> Option<VisibilityChange> {
        self.change(id, Embedder::close)
    }

    fn change<F>(&mut self, id: InstanceId, f: F) -> Option<VisibilityChange>
    where
        F: FnOnce(&mut Embedder<C>) -> Visibility,
    {
        self.get_mut(id).map(|embedder| VisibilityChange {
            id,
            visibility: f(embedder),
        })
    }
}
