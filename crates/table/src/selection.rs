//! Row selection for the rows currently on screen.

use std::collections::BTreeSet;

use backoffice_core::ResourceId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<ResourceId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove one id; returns whether it is now selected.
    pub fn toggle(&mut self, id: &ResourceId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Select every visible row, or clear the selection if all already are.
    pub fn toggle_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a ResourceId>) {
        let visible: BTreeSet<ResourceId> = visible.into_iter().cloned().collect();
        if !visible.is_empty() && visible.is_subset(&self.ids) {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    pub fn is_selected(&self, id: &ResourceId) -> bool {
        self.ids.contains(id)
    }

    pub fn all_selected<'a>(&self, visible: impl IntoIterator<Item = &'a ResourceId>) -> bool {
        let mut any = false;
        for id in visible {
            any = true;
            if !self.ids.contains(id) {
                return false;
            }
        }
        any
    }

    /// Drop ids that are no longer among `visible`.
    pub fn retain_visible(&mut self, visible: &[ResourceId]) {
        self.ids.retain(|id| visible.contains(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.ids.iter().cloned().collect()
    }
}
