//! Conversion between continuous map positions and discrete cells.
//!
//! Cells are half-open squares of `cell_size` degrees anchored at latitude and
//! longitude zero. When longitude wrapping is enabled, longitudes are first
//! normalized into `[-180, 180)` so that positions on either side of the seam
//! resolve to a single canonical column.

use serde::Serialize;

use crate::{CellId, ConfigError, DistanceMetric, GeoPoint};

const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;
/// Relative slack allowed when checking that cells tile a half turn.
const SEAM_TOLERANCE: f64 = 1e-9;

/// Continuous bounds of a single cell. Bounds are not normalized, so adjacent
/// cells always share an edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellBounds {
    /// Southern edge (inclusive).
    pub south: f64,
    /// Western edge (inclusive).
    pub west: f64,
    /// Northern edge (exclusive).
    pub north: f64,
    /// Eastern edge (exclusive).
    pub east: f64,
}

/// Maps continuous positions onto the cell grid and back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMapper {
    cell_size: f64,
    /// Columns on each side of the prime meridian when longitudes wrap.
    half_columns: Option<i32>,
}

impl GridMapper {
    /// Creates a mapper, failing fast on sizes that cannot partition the plane.
    ///
    /// With wrapping enabled the cell size must divide 180 degrees evenly, so
    /// the seam falls on a column edge and every column has one canonical id.
    pub fn new(cell_size: f64, wrap_longitude: bool) -> Result<Self, ConfigError> {
        let too_wide = wrap_longitude && cell_size > FULL_TURN;
        if !cell_size.is_finite() || cell_size <= 0.0 || too_wide {
            return Err(ConfigError::InvalidCellSize { cell_size });
        }
        let half_columns = if wrap_longitude {
            Some(seam_columns(cell_size).ok_or(ConfigError::SeamMisaligned { cell_size })?)
        } else {
            None
        };
        Ok(Self {
            cell_size,
            half_columns,
        })
    }

    /// Edge length of a cell in degrees.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Whether longitudes wrap around the seam.
    #[must_use]
    pub const fn wraps_longitude(&self) -> bool {
        self.half_columns.is_some()
    }

    /// Normalizes a longitude into `[-180, 180)` when wrapping is enabled.
    #[must_use]
    pub fn normalize_lng(&self, lng: f64) -> f64 {
        if self.half_columns.is_none() {
            return lng;
        }
        let shifted = (lng + HALF_TURN).rem_euclid(FULL_TURN);
        // rem_euclid may round up to the modulus for tiny negative inputs.
        let shifted = if shifted >= FULL_TURN { 0.0 } else { shifted };
        shifted - HALF_TURN
    }

    /// Returns the cell containing the provided position.
    ///
    /// With wrapping enabled the column always lies inside
    /// [`column_range`](Self::column_range), so the result is canonical.
    #[must_use]
    pub fn to_cell_id(&self, position: GeoPoint) -> CellId {
        let col = self.axis_index(self.normalize_lng(position.lng));
        let col = match self.column_range() {
            // Rounding next to the seam can land one column outside the range.
            Some((min, max)) => col.clamp(min, max),
            None => col,
        };
        CellId::new(self.axis_index(position.lat), col)
    }

    /// Returns the continuous bounds of a cell.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellId) -> CellBounds {
        let size = self.cell_size;
        CellBounds {
            south: f64::from(cell.row()) * size,
            west: f64::from(cell.col()) * size,
            north: (f64::from(cell.row()) + 1.0) * size,
            east: (f64::from(cell.col()) + 1.0) * size,
        }
    }

    /// Returns the midpoint of a cell's bounds.
    #[must_use]
    pub fn cell_center(&self, cell: CellId) -> GeoPoint {
        let bounds = self.cell_bounds(cell);
        GeoPoint::new(
            (bounds.south + bounds.north) / 2.0,
            self.normalize_lng((bounds.west + bounds.east) / 2.0),
        )
    }

    /// Resolves any cell to the canonical cell sharing its center.
    #[must_use]
    pub fn canonical(&self, cell: CellId) -> CellId {
        self.to_cell_id(self.cell_center(cell))
    }

    /// Lowest and highest canonical column, or `None` when longitudes do not
    /// wrap.
    #[must_use]
    pub fn column_range(&self) -> Option<(i32, i32)> {
        self.half_columns.map(|half| (-half, half - 1))
    }

    /// Column steps from `from` to `to`. With wrapping enabled the delta takes
    /// the short way around the seam and lies in `[-n/2, n/2)` for `n`
    /// columns.
    #[must_use]
    pub fn column_delta(&self, from: i32, to: i32) -> i32 {
        let delta = to.saturating_sub(from);
        let Some(half) = self.half_columns else {
            return delta;
        };
        delta.saturating_add(half).rem_euclid(half.saturating_mul(2)) - half
    }

    /// Distance between two cells under `metric`, wrapping across the seam
    /// when longitudes wrap.
    #[must_use]
    pub fn distance(&self, metric: DistanceMetric, from: CellId, to: CellId) -> u32 {
        let rows = from.row().abs_diff(to.row());
        let cols = self.column_delta(from.col(), to.col()).unsigned_abs();
        metric.combine(rows, cols)
    }

    fn axis_index(&self, value: f64) -> i32 {
        (value / self.cell_size).floor() as i32
    }
}

/// Number of columns between the prime meridian and the seam, when that
/// number is a whole count representable as a column index.
fn seam_columns(cell_size: f64) -> Option<i32> {
    let exact = HALF_TURN / cell_size;
    let rounded = exact.round();
    let aligned = (exact - rounded).abs() <= SEAM_TOLERANCE * rounded;
    if rounded < 1.0 || rounded > f64::from(i32::MAX / 2) || !aligned {
        return None;
    }
    Some(rounded as i32)
}
