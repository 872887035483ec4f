#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Token Grid adapters.

use anyhow::Result as AnyResult;
use glam::{DVec2, IVec2};
use std::time::Duration;
use token_grid_core::{
    CellBounds, CellId, CraftRejection, Event, GameSnapshot, GridMapper, InputEvent,
    InventorySlot, MergeRule, RejectReason, Token,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

/// Outline color shared by every cell.
pub const CELL_OUTLINE: Color = Color::from_rgb_u8(0, 123, 255);
/// Outline opacity of cells inside the interaction radius.
pub const NEAR_OPACITY: f32 = 0.9;
/// Outline opacity of cells outside the interaction radius.
pub const FAR_OPACITY: f32 = 0.25;
/// Fill opacity of interactable cells holding a token.
pub const TOKEN_FILL_OPACITY: f32 = 0.25;

/// Visual treatment of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    /// Outline color including its opacity.
    pub outline: Color,
    /// Fill color including its opacity. Fully transparent when unfilled.
    pub fill: Color,
}

impl CellStyle {
    /// Chooses the style for a cell from its interactability and content.
    #[must_use]
    pub const fn for_cell(interactable: bool, has_token: bool) -> Self {
        let outline_alpha = if interactable {
            NEAR_OPACITY
        } else {
            FAR_OPACITY
        };
        let fill_alpha = if interactable && has_token {
            TOKEN_FILL_OPACITY
        } else {
            0.0
        };
        Self {
            outline: CELL_OUTLINE.with_alpha(outline_alpha),
            fill: CELL_OUTLINE.with_alpha(fill_alpha),
        }
    }
}

/// Cell descriptor handed to backends.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneCell {
    /// Identifier of the cell.
    pub cell: CellId,
    /// Continuous bounds in degrees.
    pub bounds: CellBounds,
    /// Center in degrees, `x` being longitude and `y` latitude.
    pub center: DVec2,
    /// Grid offset from the player's cell, `x` counting columns and `y` rows.
    pub offset: IVec2,
    /// Whether the cell lies inside the interaction radius.
    pub interactable: bool,
    /// Token value shown on the cell, if any.
    pub label: Option<String>,
    /// Outline and fill.
    pub style: CellStyle,
}

/// Player marker handed to backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerMarker {
    /// Cell occupied by the player.
    pub cell: CellId,
    /// Position in degrees, `x` being longitude and `y` latitude.
    pub position: DVec2,
}

/// Inventory, score, and goal read-outs.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Description of the held slot.
    pub holding: String,
    /// Bag contents in insertion order.
    pub bag: Vec<Token>,
    /// Accumulated score.
    pub score: u64,
    /// Configured win threshold.
    pub target_value: u32,
    /// Whether the session has been won.
    pub has_won: bool,
}

/// Scene description built from a world snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Player marker.
    pub player: PlayerMarker,
    /// Visible cells in cell order.
    pub cells: Vec<SceneCell>,
    /// Inventory and score read-outs.
    pub hud: Hud,
    /// Status line describing the most recent action.
    pub status: Option<String>,
}

impl Scene {
    /// Projects a snapshot into a scene.
    #[must_use]
    pub fn from_snapshot(
        snapshot: &GameSnapshot,
        mapper: &GridMapper,
        status: Option<String>,
    ) -> Self {
        let origin = snapshot.player.cell;
        let cells = snapshot
            .cells
            .iter()
            .map(|view| {
                let center = mapper.cell_center(view.cell);
                SceneCell {
                    cell: view.cell,
                    bounds: mapper.cell_bounds(view.cell),
                    center: DVec2::new(center.lng, center.lat),
                    offset: IVec2::new(
                        mapper.column_delta(origin.col(), view.cell.col()),
                        view.cell.row().saturating_sub(origin.row()),
                    ),
                    interactable: view.interactable,
                    label: view
                        .content
                        .token()
                        .map(|token| token.value().to_string()),
                    style: CellStyle::for_cell(view.interactable, view.content.has_token()),
                }
            })
            .collect();

        Self {
            player: PlayerMarker {
                cell: origin,
                position: DVec2::new(snapshot.player.position.lng, snapshot.player.position.lat),
            },
            cells,
            hud: Hud {
                holding: holding_label(snapshot.held),
                bag: snapshot.bag.clone(),
                score: snapshot.score,
                target_value: snapshot.target_value,
                has_won: snapshot.has_won,
            },
            status,
        }
    }

    /// Looks up a cell by its grid offset from the player.
    #[must_use]
    pub fn cell_at_offset(&self, offset: IVec2) -> Option<&SceneCell> {
        self.cells.iter().find(|cell| cell.offset == offset)
    }
}

/// Describes the held slot the way the HUD shows it.
#[must_use]
pub fn holding_label(held: Option<Token>) -> String {
    held.map_or_else(
        || "nothing".to_owned(),
        |token| format!("{} pts", token.value()),
    )
}

/// Derives the status line from the events produced by the last action.
///
/// A victory outranks everything else. Otherwise the last event describing an
/// interaction or craft wins; movement and visibility events never change the
/// status.
#[must_use]
pub fn status_text(events: &[Event]) -> Option<String> {
    let victory = events.iter().find_map(|event| match event {
        Event::VictoryAchieved { target, rule, .. } => Some(match rule {
            MergeRule::Double => format!("victory! merged ≥ {target}"),
            MergeRule::Craft => format!("victory! crafted ≥ {target}"),
        }),
        _ => None,
    });
    victory.or_else(|| events.iter().rev().find_map(describe))
}

fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::TokenPickedUp {
            slot: InventorySlot::Held,
            ..
        } => "picked up token".to_owned(),
        Event::TokenPickedUp {
            slot: InventorySlot::Bag,
            ..
        } => "picked up token into bag".to_owned(),
        Event::TokenDropped { .. } => "dropped token".to_owned(),
        Event::TokensMerged {
            consumed, produced, ..
        } => format!("merged {consumed}+{consumed} → {produced}"),
        Event::TokensCrafted {
            consumed, produced, ..
        } => format!("crafted {consumed}+{consumed} → {produced}"),
        Event::InteractionRejected { reason, .. } => rejection_text(*reason).to_owned(),
        Event::CraftRejected { reason } => match reason {
            CraftRejection::WrongMode => "crafting is disabled",
            CraftRejection::NoMatchingPair => "need two equal tokens to craft",
        }
        .to_owned(),
        _ => return None,
    };
    Some(text)
}

fn rejection_text(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::OutOfRange => "too far to interact",
        RejectReason::MismatchedValue => "values do not match",
        RejectReason::NothingToDo => "nothing to do",
        RejectReason::NotMaterialized => "cell is not visible",
    }
}

/// Input gathered by a backend for a single frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Player input in arrival order.
    pub inputs: Vec<InputEvent>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Token Grid scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and the input captured for the frame, and replaces the scene before it
    /// is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene);
}
