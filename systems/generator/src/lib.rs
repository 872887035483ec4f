#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded content generation for grid cells.
//!
//! [`base_content`] is a pure function of the cell coordinates: the row and
//! column are mixed into a 32-bit seed, the seed is fed through
//! `frac(sin(seed) * 10000)`, and the resulting luck value is banded into a
//! token value. The formula is the compatibility contract rather than the
//! exact floating point bits, so platforms with a different `sin` may differ
//! in the last place.
//!
//! [`MemorylessSpawner`] supports the memoryless persistence policy, where
//! cells receive fresh content every time they are materialized.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use token_grid_core::{CellContent, CellId, Token};

/// Multiplier applied to the row before mixing.
pub const ROW_MULTIPLIER: i32 = 73_856_093;
/// Multiplier applied to the column before mixing.
pub const COLUMN_MULTIPLIER: i32 = 19_349_663;
/// Scale applied to `sin(seed)` before taking the fractional part.
pub const LUCK_SCALE: f64 = 10_000.0;
/// Luck values at or above this threshold produce empty cells.
pub const TOKEN_CHANCE: f64 = 0.35;

/// Exclusive upper luck edge of each value band, in ascending order.
const VALUE_BANDS: [(f64, u32); 4] = [(0.12, 1), (0.24, 2), (0.32, 4), (TOKEN_CHANCE, 8)];

const MEMORYLESS_TOKEN_CHANCE: f64 = 0.3;
const MEMORYLESS_MAX_VALUE: u32 = 3;

/// Mixes the cell coordinates into a single seed.
///
/// Products wrap to 32-bit two's complement before the xor.
#[must_use]
pub fn cell_seed(cell: CellId) -> i32 {
    cell.row().wrapping_mul(ROW_MULTIPLIER) ^ cell.col().wrapping_mul(COLUMN_MULTIPLIER)
}

/// Deterministic pseudo-random value in `[0, 1)` for the provided seed.
#[must_use]
pub fn luck(seed: i32) -> f64 {
    let x = f64::from(seed).sin() * LUCK_SCALE;
    let fraction = x - x.floor();
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

/// Maps a luck value onto cell content using the fixed value bands.
#[must_use]
pub fn content_for_luck(luck: f64) -> CellContent {
    VALUE_BANDS
        .iter()
        .find(|(edge, _)| luck < *edge)
        .map_or(CellContent::EMPTY, |&(_, value)| {
            CellContent::with_token(Token::new(value))
        })
}

/// Deterministic base content of a cell before any player mutation.
#[must_use]
pub fn base_content(cell: CellId) -> CellContent {
    content_for_luck(luck(cell_seed(cell)))
}

/// Source of fresh, history-free cell content.
#[derive(Clone, Debug)]
pub struct MemorylessSpawner {
    rng: ChaCha8Rng,
}

impl MemorylessSpawner {
    /// Creates a spawner whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws content for a newly materialized cell.
    pub fn spawn(&mut self) -> CellContent {
        if self.rng.gen::<f64>() < MEMORYLESS_TOKEN_CHANCE {
            let value = self.rng.gen_range(1..=MEMORYLESS_MAX_VALUE);
            CellContent::with_token(Token::new(value))
        } else {
            CellContent::EMPTY
        }
    }
}
