//! The set of events a batch applies to.

use crate::event::ResourceId;

/// Ordered, de-duplicated selection of resource ids.
///
/// Passed by value into the engine's entry points instead of living in
/// process-wide state, so concurrent triggers cannot observe each other's
/// half-built selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    ids: Vec<ResourceId>,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState::default()
    }

    /// Add `id` if it is not already selected. Returns whether it was added.
    pub fn insert(&mut self, id: ResourceId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: &ResourceId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    /// Select `id` if unselected, otherwise deselect it.
    pub fn toggle(&mut self, id: ResourceId) {
        if !self.remove(&id) {
            self.ids.push(id);
        }
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }
}

impl FromIterator<ResourceId> for SelectionState {
    fn from_iter<T: IntoIterator<Item = ResourceId>>(iter: T) -> Self {
        let mut selection = SelectionState::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}
