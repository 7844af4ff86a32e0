//! The set of currently selected elements.

use cutreel_composition::ElementId;

/// Ordered selection of element ids. Order is insertion order; the first
/// id is the primary selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, id: impl Into<ElementId>) {
        self.ids = vec![id.into()];
    }

    /// Add the element to the selection, or remove it if already selected.
    pub fn toggle(&mut self, id: impl Into<ElementId>) {
        let id = id.into();
        if let Some(idx) = self.ids.iter().position(|i| *i == id) {
            self.ids.remove(idx);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
