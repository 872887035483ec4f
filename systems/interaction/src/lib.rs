#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction engine deciding pickup, drop, merge, and crafting.
//!
//! Nothing in this crate mutates state. Callers describe the player's slot and
//! the target cell, receive a [`Transition`] or [`CraftOutcome`], and write
//! the result back into the authoritative world. Rejections carry no
//! mutation, so replaying a rejected request is always safe.

use std::collections::BTreeMap;

use token_grid_core::{
    CellContent, CellId, CellOverride, CraftRejection, DistanceMetric, GridMapper, InventorySlot,
    MergeRule, RejectReason, Token,
};

/// Everything the engine needs to resolve a single interaction request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionRequest {
    /// Active merge rule.
    pub rule: MergeRule,
    /// Grid the cells live on; decides whether distances wrap across the seam.
    pub mapper: GridMapper,
    /// Metric used for the radius gate.
    pub metric: DistanceMetric,
    /// Maximum permitted distance in cells.
    pub radius: u32,
    /// Cell currently occupied by the player.
    pub player_cell: CellId,
    /// Cell targeted by the request.
    pub target: CellId,
    /// Token in the primary slot.
    pub held: Option<Token>,
    /// Effective content of the target, or `None` when it has no content.
    pub content: Option<CellContent>,
}

/// Observable result of an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A token moved from the cell into the inventory.
    PickedUp {
        /// Token taken from the cell.
        token: Token,
        /// Slot that received the token.
        slot: InventorySlot,
    },
    /// The held token was placed into an empty cell.
    Dropped {
        /// Token placed into the cell.
        token: Token,
    },
    /// The held token merged with an equal token in the cell.
    Merged {
        /// Value of each consumed token.
        consumed: Token,
        /// Token left in the cell.
        produced: Token,
        /// Points awarded.
        score_delta: u64,
    },
    /// Nothing changed.
    Rejected(RejectReason),
}

/// State changes implied by an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// What happened.
    pub outcome: Outcome,
    /// Token in the primary slot after the interaction.
    pub held: Option<Token>,
    /// Token to append to the bag, if any.
    pub bag_push: Option<Token>,
    /// Override to write for the target cell, if any.
    pub write: Option<CellOverride>,
}

impl Transition {
    fn rejected(reason: RejectReason, held: Option<Token>) -> Self {
        Self {
            outcome: Outcome::Rejected(reason),
            held,
            bag_push: None,
            write: None,
        }
    }

    /// Whether the transition mutates anything.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self.outcome, Outcome::Rejected(_))
    }
}

/// Reports whether the target lies inside the interaction radius, measuring
/// the short way around the longitude seam.
#[must_use]
pub fn within_radius(
    mapper: &GridMapper,
    metric: DistanceMetric,
    player: CellId,
    target: CellId,
    radius: u32,
) -> bool {
    mapper.distance(metric, player, target) <= radius
}

/// Resolves a full request, applying the radius gate before inspecting content.
#[must_use]
pub fn interact(request: InteractionRequest) -> Transition {
    if !within_radius(
        &request.mapper,
        request.metric,
        request.player_cell,
        request.target,
        request.radius,
    ) {
        return Transition::rejected(RejectReason::OutOfRange, request.held);
    }

    let Some(content) = request.content else {
        return Transition::rejected(RejectReason::NotMaterialized, request.held);
    };

    resolve(request.rule, request.held, content)
}

/// Resolves the slot/cell state machine for an in-range target.
#[must_use]
pub fn resolve(rule: MergeRule, held: Option<Token>, content: CellContent) -> Transition {
    match rule {
        MergeRule::Double => resolve_double(held, content),
        MergeRule::Craft => resolve_gather(held, content),
    }
}

fn resolve_double(held: Option<Token>, content: CellContent) -> Transition {
    match (held, content.token()) {
        (None, Some(token)) => Transition {
            outcome: Outcome::PickedUp {
                token,
                slot: InventorySlot::Held,
            },
            held: Some(token),
            bag_push: None,
            write: Some(CellOverride::cleared()),
        },
        (Some(token), None) => drop_into(token),
        (Some(carried), Some(found)) if carried == found => {
            let produced = Token::new(found.value().saturating_mul(2));
            Transition {
                outcome: Outcome::Merged {
                    consumed: found,
                    produced,
                    score_delta: u64::from(produced.value()),
                },
                held: None,
                bag_push: None,
                write: Some(CellOverride::placing(produced)),
            }
        }
        (Some(_), Some(_)) => Transition::rejected(RejectReason::MismatchedValue, held),
        (None, None) => Transition::rejected(RejectReason::NothingToDo, held),
    }
}

fn resolve_gather(held: Option<Token>, content: CellContent) -> Transition {
    match (held, content.token()) {
        (None, Some(token)) => Transition {
            outcome: Outcome::PickedUp {
                token,
                slot: InventorySlot::Held,
            },
            held: Some(token),
            bag_push: None,
            write: Some(CellOverride::cleared()),
        },
        (Some(_), Some(token)) => Transition {
            outcome: Outcome::PickedUp {
                token,
                slot: InventorySlot::Bag,
            },
            held,
            bag_push: Some(token),
            write: Some(CellOverride::cleared()),
        },
        (Some(token), None) => drop_into(token),
        (None, None) => Transition::rejected(RejectReason::NothingToDo, held),
    }
}

fn drop_into(token: Token) -> Transition {
    Transition {
        outcome: Outcome::Dropped { token },
        held: None,
        bag_push: None,
        write: Some(CellOverride::placing(token)),
    }
}

/// Inventory after a successful craft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CraftOutcome {
    /// Value of each consumed token.
    pub consumed: Token,
    /// Token produced by crafting.
    pub produced: Token,
    /// Slot that received the produced token.
    pub slot: InventorySlot,
    /// Primary slot after crafting.
    pub held: Option<Token>,
    /// Bag after crafting, in insertion order.
    pub bag: Vec<Token>,
}

/// Crafts the highest-valued pair found across the held slot and bag into a
/// single token one value higher.
///
/// Bag copies are consumed before the held token. The produced token lands in
/// the held slot when it is empty and is appended to the bag otherwise.
pub fn craft(
    rule: MergeRule,
    held: Option<Token>,
    bag: &[Token],
) -> Result<CraftOutcome, CraftRejection> {
    if rule != MergeRule::Craft {
        return Err(CraftRejection::WrongMode);
    }

    let mut counts: BTreeMap<Token, usize> = BTreeMap::new();
    for token in held.iter().chain(bag) {
        *counts.entry(*token).or_default() += 1;
    }
    let consumed = counts
        .iter()
        .rev()
        .find(|(_, count)| **count >= 2)
        .map(|(token, _)| *token)
        .ok_or(CraftRejection::NoMatchingPair)?;

    let mut remaining = 2_usize;
    let mut next_bag = Vec::with_capacity(bag.len());
    for token in bag {
        if *token == consumed && remaining > 0 {
            remaining -= 1;
        } else {
            next_bag.push(*token);
        }
    }

    let mut next_held = held;
    if remaining > 0 && next_held == Some(consumed) {
        next_held = None;
    }

    let produced = Token::new(consumed.value().saturating_add(1));
    let slot = if next_held.is_none() {
        next_held = Some(produced);
        InventorySlot::Held
    } else {
        next_bag.push(produced);
        InventorySlot::Bag
    };

    Ok(CraftOutcome {
        consumed,
        produced,
        slot,
        held: next_held,
        bag: next_bag,
    })
}
