//! Grid-stepped player movement.

use token_grid_core::{CellId, Direction, GeoPoint, GridMapper};

/// Player state. The position is authoritative; the cell is always derived
/// from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Player {
    position: GeoPoint,
    cell: CellId,
}

impl Player {
    /// Places the player at a continuous position.
    pub(crate) fn at(position: GeoPoint, mapper: &GridMapper) -> Self {
        Self {
            position,
            cell: mapper.to_cell_id(position),
        }
    }

    pub(crate) const fn position(&self) -> GeoPoint {
        self.position
    }

    pub(crate) const fn cell(&self) -> CellId {
        self.cell
    }

    /// Moves one whole cell, snapping onto the destination's center. Returns
    /// the cell occupied before the step.
    pub(crate) fn step(&mut self, direction: Direction, mapper: &GridMapper) -> CellId {
        let from = self.cell;
        let (d_row, d_col) = direction.delta();
        let destination = from.offset(d_row, d_col);
        *self = Self::at(mapper.cell_center(destination), mapper);
        from
    }
}
