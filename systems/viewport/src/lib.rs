#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Visible-set tracking for the map viewport.
//!
//! The tracker converts continuous map bounds into the set of cells they
//! cover and diffs successive sets, emitting materialize commands for cells
//! that scrolled into view and dematerialize commands for cells that left it.

use std::collections::BTreeSet;

use token_grid_core::{CellId, Command, GeoPoint, GeoRegion, GridMapper};

const FULL_TURN: f64 = 360.0;

/// Enumerates the canonical cells intersecting a region.
///
/// Rows run from `floor(south / s)` to `ceil(north / s) - 1` and columns
/// likewise, always covering at least one cell per axis. With wrapping
/// enabled the western edge is normalized first and a region whose eastern
/// edge lies west of it is treated as crossing the seam.
#[must_use]
pub fn cells_in_bounds(mapper: &GridMapper, region: GeoRegion) -> BTreeSet<CellId> {
    let size = mapper.cell_size();
    let (row_start, row_end) = axis_span(region.south / size, region.north / size);
    let columns = column_span(mapper, region);

    let mut cells = BTreeSet::new();
    for row in row_start..=row_end {
        for col in columns.0..=columns.1 {
            let _ = cells.insert(mapper.canonical(CellId::new(row, col)));
        }
    }
    cells
}

fn column_span(mapper: &GridMapper, region: GeoRegion) -> (i32, i32) {
    let size = mapper.cell_size();
    if !mapper.wraps_longitude() {
        return axis_span(region.west / size, region.east / size);
    }

    let mut width = region.east - region.west;
    if width < 0.0 {
        width += FULL_TURN;
    }
    if width >= FULL_TURN {
        if let Some(range) = mapper.column_range() {
            return range;
        }
    }

    let west = mapper.normalize_lng(region.west);
    axis_span(west / size, (west + width) / size)
}

fn axis_span(low: f64, high: f64) -> (i32, i32) {
    let start = low.floor() as i32;
    let end = high.ceil() as i32 - 1;
    (start, end.max(start))
}

/// Builds the region covering a square of cells around the cell holding
/// `center`, extending `radius_cells` cells in each direction.
///
/// Edges sit a quarter cell inside the outer ring so rounding never pulls in
/// an extra row or column.
#[must_use]
pub fn region_around(mapper: &GridMapper, center: GeoPoint, radius_cells: u32) -> GeoRegion {
    let size = mapper.cell_size();
    let cell = mapper.to_cell_id(center);
    let reach = f64::from(radius_cells);
    let row = f64::from(cell.row());
    let col = f64::from(cell.col());
    GeoRegion::new(
        (row - reach + 0.25) * size,
        (col - reach + 0.25) * size,
        (row + reach + 0.75) * size,
        (col + reach + 0.75) * size,
    )
}

/// Tracks the materialized set and reports how it changes between frames.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
    visible: BTreeSet<CellId>,
}

impl Viewport {
    /// Creates a tracker with nothing materialized.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells currently considered visible.
    #[must_use]
    pub fn visible(&self) -> &BTreeSet<CellId> {
        &self.visible
    }

    /// Diffs the visible set against `region`.
    ///
    /// Dematerialize commands precede materialize commands; each group is
    /// emitted in cell order.
    pub fn handle(&mut self, mapper: &GridMapper, region: GeoRegion, out: &mut Vec<Command>) {
        let next = cells_in_bounds(mapper, region);
        out.extend(
            self.visible
                .difference(&next)
                .map(|cell| Command::Dematerialize { cell: *cell }),
        );
        out.extend(
            next.difference(&self.visible)
                .map(|cell| Command::Materialize { cell: *cell }),
        );
        self.visible = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_region_still_covers_one_cell() {
        let mapper = GridMapper::new(1.0, true).expect("valid mapper");
        let cells = cells_in_bounds(&mapper, GeoRegion::new(1.2, 1.2, 1.2, 1.2));
        assert_eq!(cells.into_iter().collect::<Vec<_>>(), vec![CellId::new(1, 1)]);

        let on_edge = cells_in_bounds(&mapper, GeoRegion::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(on_edge.len(), 1);
    }

    #[test]
    fn whole_globe_uses_every_column_once() {
        let mapper = GridMapper::new(90.0, true).expect("valid mapper");
        let cells = cells_in_bounds(&mapper, GeoRegion::new(0.0, -180.0, 1.0, 180.0));
        let columns: Vec<i32> = cells.iter().map(|cell| cell.col()).collect();
        assert_eq!(columns, vec![-2, -1, 0, 1]);
    }
}
