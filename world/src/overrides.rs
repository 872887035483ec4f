//! Sparse record of player-caused cell mutations.

use std::collections::BTreeMap;

use token_grid_core::{CellId, CellOverride};

/// Overrides keyed by cell. Entries are never evicted.
#[derive(Clone, Debug, Default)]
pub(crate) struct OverrideStore {
    entries: BTreeMap<CellId, CellOverride>,
}

impl OverrideStore {
    /// Creates an empty store.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the override recorded for the cell, if any.
    pub(crate) fn get(&self, cell: CellId) -> Option<&CellOverride> {
        self.entries.get(&cell)
    }

    /// Records an override, replacing any previous entry for the cell wholesale.
    pub(crate) fn set(&mut self, cell: CellId, value: CellOverride) {
        let _ = self.entries.insert(cell, value);
    }

    /// Number of overridden cells.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates overrides in cell order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellId, &CellOverride)> {
        self.entries.iter().map(|(cell, value)| (*cell, value))
    }
}
