#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Token Grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters queue [`InputEvent`] values,
//! systems translate them into [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values that renderers and systems react to.
//! Renderers only ever observe a [`GameSnapshot`] captured after a tick has
//! been fully applied.

pub mod grid;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{CellBounds, GridMapper};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Token Grid.";

/// Identifies a single grid cell by its row (latitude axis) and column
/// (longitude axis) indices.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellId {
    row: i32,
    col: i32,
}

impl CellId {
    /// Creates a new cell identifier.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Row index; grows northward.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column index; grows eastward.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    /// Returns the cell displaced by the provided row and column deltas.
    #[must_use]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row.saturating_add(d_row),
            col: self.col.saturating_add(d_col),
        }
    }

    /// Largest per-axis index difference between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellId) -> u32 {
        self.row
            .abs_diff(other.row)
            .max(self.col.abs_diff(other.col))
    }

    /// Sum of per-axis index differences between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: CellId) -> u32 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// A collectible token carried by the player.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Token {
    value: u32,
}

impl Token {
    /// Creates a token with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Numeric value of the token.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Effective content of a cell. The value is always zero when no token is
/// present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellContent {
    has_token: bool,
    value: u32,
}

impl CellContent {
    /// Content of a cell without a token.
    pub const EMPTY: Self = Self {
        has_token: false,
        value: 0,
    };

    /// Content of a cell holding the provided token.
    #[must_use]
    pub const fn with_token(token: Token) -> Self {
        Self {
            has_token: true,
            value: token.value(),
        }
    }

    /// Builds content from raw fields, zeroing the value when no token is present.
    #[must_use]
    pub const fn from_parts(has_token: bool, value: u32) -> Self {
        if has_token {
            Self {
                has_token,
                value,
            }
        } else {
            Self::EMPTY
        }
    }

    /// Whether the cell holds a token.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.has_token
    }

    /// Value of the token, or zero for empty cells.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Token stored in the cell, if any.
    #[must_use]
    pub const fn token(&self) -> Option<Token> {
        if self.has_token {
            Some(Token::new(self.value))
        } else {
            None
        }
    }
}

/// Player-caused deviation from a cell's base content. Missing fields fall
/// back to the base generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOverride {
    /// Replacement token presence, if overridden.
    pub has_token: Option<bool>,
    /// Replacement token value, if overridden.
    pub value: Option<u32>,
}

impl CellOverride {
    /// Fully-specified override that leaves the cell empty.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            has_token: Some(false),
            value: Some(0),
        }
    }

    /// Fully-specified override that places the provided token in the cell.
    #[must_use]
    pub const fn placing(token: Token) -> Self {
        Self {
            has_token: Some(true),
            value: Some(token.value()),
        }
    }
}

/// Metric used to measure the distance between the player and a target cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Maximum of the per-axis differences; diagonal neighbours are one step away.
    #[default]
    Chebyshev,
    /// Sum of the per-axis differences; diagonal neighbours are two steps away.
    Manhattan,
}

impl DistanceMetric {
    /// Measures the distance between two cells in raw index space.
    ///
    /// Use [`GridMapper::distance`] when the seam must be crossed.
    #[must_use]
    pub fn distance(self, a: CellId, b: CellId) -> u32 {
        match self {
            Self::Chebyshev => a.chebyshev_distance(b),
            Self::Manhattan => a.manhattan_distance(b),
        }
    }

    /// Folds per-axis step counts into a single distance.
    #[must_use]
    pub fn combine(self, rows: u32, cols: u32) -> u32 {
        match self {
            Self::Chebyshev => rows.max(cols),
            Self::Manhattan => rows.saturating_add(cols),
        }
    }
}

/// Rule used to combine tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Dropping a held token onto an equal token doubles it in place.
    #[default]
    Double,
    /// Tokens are gathered into a held slot and bag, and crafting turns a
    /// pair of equal tokens into one token of the next value.
    Craft,
}

/// Policy describing whether player edits survive a cell leaving the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPersistence {
    /// Cells derive from the seeded generator and player edits persist as overrides.
    #[default]
    Overrides,
    /// Cells are spawned with fresh randomness when materialized and forgotten
    /// when dematerialized, together with any player edits.
    Memoryless,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward increasing row indices (latitude).
    North,
    /// Movement toward increasing column indices (longitude).
    East,
    /// Movement toward decreasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Row and column deltas of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::East => (0, 1),
            Self::South => (-1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Discrete intents produced by keyboard or button adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Step the player one cell in the provided direction.
    Move(Direction),
    /// Interact with the cell the player is standing on.
    Interact,
    /// Craft a pair of equal tokens from the held slot and bag.
    Craft,
}

/// Input queued by adapters and drained once per tick, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A named intent from the keyboard or a HUD button.
    Intent(Intent),
    /// A pointer click already translated into a cell.
    Click(CellId),
}

/// Inventory location receiving a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySlot {
    /// The single primary slot.
    Held,
    /// The secondary bag used by the crafting rule.
    Bag,
}

/// Reasons an interaction request may be rejected. Rejections never mutate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The target cell lies beyond the interaction radius.
    OutOfRange,
    /// The held token and the cell token carry different values.
    MismatchedValue,
    /// Nothing is held and the cell is empty.
    NothingToDo,
    /// The target cell has no content because it is not materialized.
    NotMaterialized,
}

/// Reasons a crafting request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftRejection {
    /// Crafting is only available under [`MergeRule::Craft`].
    WrongMode,
    /// No value appears at least twice across the held slot and bag.
    NoMatchingPair,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Steps the player one whole cell in the provided direction.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Interacts with an explicit target cell.
    Interact {
        /// Cell targeted by the interaction.
        cell: CellId,
    },
    /// Interacts with whichever cell the player occupies when the command runs.
    InteractHere,
    /// Crafts the highest available pair of equal tokens.
    Craft,
    /// Marks a cell as visible so it can be rendered.
    Materialize {
        /// Cell entering the visible set.
        cell: CellId,
    },
    /// Removes a cell from the visible set.
    Dematerialize {
        /// Cell leaving the visible set.
        cell: CellId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player stepped between two cells.
    PlayerMoved {
        /// Cell occupied before the step.
        from: CellId,
        /// Cell occupied after the step.
        to: CellId,
        /// Continuous position after snapping to the new cell's center.
        position: GeoPoint,
    },
    /// Lists materialized cells whose interactable status flipped after a move.
    InteractabilityChanged {
        /// Cells that entered or left the interaction radius.
        cells: Vec<CellId>,
    },
    /// Confirms that the player picked up a token from a cell.
    TokenPickedUp {
        /// Cell the token was taken from.
        cell: CellId,
        /// Token that was taken.
        token: Token,
        /// Inventory slot that received the token.
        slot: InventorySlot,
    },
    /// Confirms that the held token was dropped into an empty cell.
    TokenDropped {
        /// Cell receiving the token.
        cell: CellId,
        /// Token that was dropped.
        token: Token,
    },
    /// Confirms that the held token merged with an equal token in a cell.
    TokensMerged {
        /// Cell holding the merged token.
        cell: CellId,
        /// Value of each of the two consumed tokens.
        consumed: Token,
        /// Token left in the cell.
        produced: Token,
        /// Points awarded for the merge.
        score_delta: u64,
    },
    /// Reports that an interaction request was rejected.
    InteractionRejected {
        /// Cell targeted by the rejected request.
        cell: CellId,
        /// Specific reason the request failed.
        reason: RejectReason,
    },
    /// Confirms that a pair of tokens was crafted into a new token.
    TokensCrafted {
        /// Value of each of the two consumed tokens.
        consumed: Token,
        /// Token produced by crafting.
        produced: Token,
        /// Inventory slot that received the produced token.
        slot: InventorySlot,
    },
    /// Reports that a crafting request was rejected.
    CraftRejected {
        /// Specific reason the request failed.
        reason: CraftRejection,
    },
    /// Announces that the win threshold was reached. Emitted once per session.
    VictoryAchieved {
        /// Token that reached the threshold.
        token: Token,
        /// Configured threshold.
        target: u32,
        /// Rule that produced the winning token.
        rule: MergeRule,
    },
    /// Confirms that a cell entered the visible set.
    CellMaterialized {
        /// Cell that became visible.
        cell: CellId,
        /// Effective content at the time of materialization.
        content: CellContent,
    },
    /// Confirms that a cell left the visible set.
    CellDematerialized {
        /// Cell that is no longer visible.
        cell: CellId,
    },
}

/// Continuous map position measured in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new position.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned continuous region, typically the visible map bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRegion {
    /// Southern latitude edge.
    pub south: f64,
    /// Western longitude edge.
    pub west: f64,
    /// Northern latitude edge.
    pub north: f64,
    /// Eastern longitude edge. May be smaller than `west` when the region
    /// crosses the longitude seam.
    pub east: f64,
}

impl GeoRegion {
    /// Creates a new region from its four edges.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }
}

/// Session configuration. Every field falls back to the defaults of the map
/// prototype when omitted from a configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Edge length of a cell in degrees.
    pub cell_size: f64,
    /// Whether longitudes wrap into `[-180, 180)`.
    pub wrap_longitude: bool,
    /// Maximum distance, in cells, at which the player may interact.
    pub interact_radius: u32,
    /// Metric used for the interaction radius.
    pub distance_metric: DistanceMetric,
    /// Rule used to combine tokens.
    pub merge_rule: MergeRule,
    /// Whether player edits persist outside the viewport.
    pub persistence: CellPersistence,
    /// Token value that wins the session once produced.
    pub target_value: u32,
    /// Initial player position. Steps snap to cell centers from there.
    pub start: GeoPoint,
    /// Seed for the memoryless spawner.
    pub memoryless_seed: u64,
}

/// Default cell edge length in degrees.
pub const DEFAULT_CELL_SIZE: f64 = 0.0001;
/// Default interaction radius in cells.
pub const DEFAULT_INTERACT_RADIUS: u32 = 3;
/// Default win threshold.
pub const DEFAULT_TARGET_VALUE: u32 = 16;
/// Default starting position.
pub const DEFAULT_START: GeoPoint = GeoPoint::new(36.99898, -122.05502);

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            wrap_longitude: true,
            interact_radius: DEFAULT_INTERACT_RADIUS,
            distance_metric: DistanceMetric::default(),
            merge_rule: MergeRule::default(),
            persistence: CellPersistence::default(),
            target_value: DEFAULT_TARGET_VALUE,
            start: DEFAULT_START,
            memoryless_seed: 0x7a3c_91d2_4e60_b58f,
        }
    }
}

impl GameConfig {
    /// Validates the configuration, returning the grid mapper it describes.
    pub fn validate(&self) -> Result<GridMapper, ConfigError> {
        let mapper = GridMapper::new(self.cell_size, self.wrap_longitude)?;
        if !self.start.is_finite() {
            return Err(ConfigError::InvalidStart {
                lat: self.start.lat,
                lng: self.start.lng,
            });
        }
        if self.target_value == 0 {
            return Err(ConfigError::ZeroTargetValue);
        }
        Ok(mapper)
    }
}

/// Errors raised when a configuration cannot describe a playable session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Cell size must be a positive finite number, no wider than a full turn
    /// when longitudes wrap.
    #[error("cell size must be positive and finite (received {cell_size})")]
    InvalidCellSize {
        /// Rejected cell size.
        cell_size: f64,
    },
    /// With wrapping enabled the cell size must divide 180 degrees evenly.
    #[error("cell size {cell_size} must divide 180 degrees evenly when longitudes wrap")]
    SeamMisaligned {
        /// Rejected cell size.
        cell_size: f64,
    },
    /// Starting position must be finite.
    #[error("start position must be finite (received {lat}, {lng})")]
    InvalidStart {
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lng: f64,
    },
    /// A zero target would win before the first move.
    #[error("target value must be at least 1")]
    ZeroTargetValue,
}

/// Player state exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    /// Authoritative continuous position.
    pub position: GeoPoint,
    /// Cell derived from the position.
    pub cell: CellId,
}

/// Visible cell exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellView {
    /// Identifier of the cell.
    pub cell: CellId,
    /// Effective content of the cell.
    pub content: CellContent,
    /// Whether the cell lies within the interaction radius.
    pub interactable: bool,
}

/// Read-only snapshot handed to renderers once per tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    /// Player position and cell.
    pub player: PlayerSnapshot,
    /// Materialized cells in deterministic order.
    pub cells: Vec<CellView>,
    /// Token in the primary slot.
    pub held: Option<Token>,
    /// Secondary inventory in insertion order.
    pub bag: Vec<Token>,
    /// Accumulated score.
    pub score: u64,
    /// Whether the win threshold has been reached.
    pub has_won: bool,
    /// Active merge rule.
    pub merge_rule: MergeRule,
    /// Configured win threshold.
    pub target_value: u32,
}

impl GameSnapshot {
    /// Looks up a materialized cell.
    #[must_use]
    pub fn cell(&self, cell: CellId) -> Option<&CellView> {
        self.cells
            .binary_search_by_key(&cell, |view| view.cell)
            .ok()
            .and_then(|index| self.cells.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellContent, CellId, ConfigError, DistanceMetric, GameConfig, MergeRule, RejectReason,
        Token,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn distances_diverge_on_diagonals() {
        let origin = CellId::new(0, 0);
        let diagonal = CellId::new(2, -2);
        assert_eq!(DistanceMetric::Chebyshev.distance(origin, diagonal), 2);
        assert_eq!(DistanceMetric::Manhattan.distance(origin, diagonal), 4);
    }

    #[test]
    fn cell_key_is_row_then_column() {
        assert_eq!(CellId::new(-3, 12).to_string(), "-3,12");
        assert_eq!(CellId::new(1, 2), CellId::new(1, 2));
        assert_ne!(CellId::new(1, 2), CellId::new(2, 1));
    }

    #[test]
    fn empty_content_never_carries_a_value() {
        let content = CellContent::from_parts(false, 8);
        assert_eq!(content, CellContent::EMPTY);
        assert_eq!(content.value(), 0);
        assert_eq!(content.token(), None);

        let content = CellContent::with_token(Token::new(4));
        assert_eq!(content.token(), Some(Token::new(4)));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_id_round_trips_through_bincode() {
        assert_round_trip(&CellId::new(370_000, -1_220_550));
    }

    #[test]
    fn reject_reason_round_trips_through_bincode() {
        assert_round_trip(&RejectReason::MismatchedValue);
    }

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        let mapper = config.validate().expect("default config must validate");
        assert!((mapper.cell_size() - 0.0001).abs() < f64::EPSILON);
        assert_eq!(config.merge_rule, MergeRule::Double);
        assert_eq!(config.distance_metric, DistanceMetric::Chebyshev);
    }

    #[test]
    fn config_rejects_non_positive_cell_size() {
        let config = GameConfig {
            cell_size: 0.0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("zero cell size"),
            ConfigError::InvalidCellSize { cell_size: 0.0 }
        );
    }

    #[test]
    fn wrapping_config_rejects_cell_sizes_that_split_the_seam() {
        let config = GameConfig {
            cell_size: 0.7,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("0.7 does not tile 180 degrees"),
            ConfigError::SeamMisaligned { cell_size: 0.7 }
        );

        let unwrapped = GameConfig {
            wrap_longitude: false,
            ..config
        };
        assert!(unwrapped.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_target() {
        let config = GameConfig {
            target_value: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("zero target"),
            ConfigError::ZeroTargetValue
        );
    }
}
