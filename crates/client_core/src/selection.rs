//! The selected-structure set. Checkbox state is always derived from here.

use shared::domain::Identifier;

/// Minimum selection size accepted by the alignment actions.
pub const MIN_ALIGNMENT_SELECTION: usize = 2;

/// Set of selected identifiers. Iteration follows selection order so the
/// list sent to the service, and therefore its choice of reference, is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    members: Vec<Identifier>,
}

/// Banner shown above the alignment actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSummary {
    Hidden,
    NeedsMore(Identifier),
    Ready(Vec<Identifier>),
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &Identifier) -> bool {
        if let Some(index) = self.members.iter().position(|member| member == id) {
            self.members.remove(index);
            false
        } else {
            self.members.push(id.clone());
            true
        }
    }

    /// Replaces the selection with exactly `ids`, dropping duplicates.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a Identifier>) {
        self.members.clear();
        for id in ids {
            if !self.contains(id) {
                self.members.push(id.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.members.iter().any(|member| member == id)
    }

    pub fn ordered(&self) -> &[Identifier] {
        &self.members
    }

    pub fn summary(&self) -> SelectionSummary {
        match self.members.as_slice() {
            [] => SelectionSummary::Hidden,
            [only] => SelectionSummary::NeedsMore(only.clone()),
            many => SelectionSummary::Ready(many.to_vec()),
        }
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
