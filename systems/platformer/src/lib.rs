#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Minimal side-view platformer: gravity, a flat floor, and collectible coins.
//!
//! Screen coordinates grow downwards, so gravity and a landing both push `y`
//! towards [`FLOOR_Y`] and a jump carries a negative vertical velocity.

use std::time::Duration;

use glam::Vec2;
use tracing::debug;

/// Downward acceleration in pixels per second squared.
pub const GRAVITY: f32 = 900.0;
/// Horizontal speed applied by a move intent, in pixels per second.
pub const MOVE_SPEED: f32 = 220.0;
/// Vertical velocity applied by a jump, in pixels per second.
pub const JUMP_SPEED: f32 = -400.0;
/// Height of the floor line.
pub const FLOOR_Y: f32 = 260.0;

const PLAYER_START: Vec2 = Vec2::new(100.0, 200.0);
const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 32.0);
const COIN_RADIUS: f32 = 8.0;

/// Discrete input accepted by the platformer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformerIntent {
    /// Run to the left.
    MoveLeft,
    /// Run to the right.
    MoveRight,
    /// Jump, if standing on the floor.
    Jump,
}

/// Maps a keyboard key name to a platformer intent.
#[must_use]
pub fn intent_for_key(key: &str) -> Option<PlatformerIntent> {
    match key {
        "ArrowLeft" | "left" => Some(PlatformerIntent::MoveLeft),
        "ArrowRight" | "right" => Some(PlatformerIntent::MoveRight),
        "ArrowUp" | "up" | " " | "space" => Some(PlatformerIntent::Jump),
        _ => None,
    }
}

/// Axis-aligned player body. `position` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner.
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Whether the body rests on the floor.
    pub on_ground: bool,
}

impl Body {
    /// Center of the body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Collectible coin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coin {
    /// Center of the coin.
    pub position: Vec2,
    /// Radius of the coin.
    pub radius: f32,
    /// Whether the coin has been collected.
    pub collected: bool,
}

impl Coin {
    const fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            radius: COIN_RADIUS,
            collected: false,
        }
    }
}

/// Complete platformer state. Updates never mutate the previous state.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformerState {
    /// Player body.
    pub player: Body,
    /// Coins on the stage.
    pub coins: Vec<Coin>,
    /// Intents queued since the last update, applied in order.
    pub pending_intents: Vec<PlatformerIntent>,
}

impl Default for PlatformerState {
    fn default() -> Self {
        Self {
            player: Body {
                position: PLAYER_START,
                velocity: Vec2::ZERO,
                size: PLAYER_SIZE,
                on_ground: false,
            },
            coins: vec![Coin::at(200.0, 180.0), Coin::at(260.0, 140.0)],
            pending_intents: Vec::new(),
        }
    }
}

impl PlatformerState {
    /// Queues an intent for the next update.
    pub fn enqueue(&mut self, intent: PlatformerIntent) {
        self.pending_intents.push(intent);
    }

    /// Number of coins collected so far.
    #[must_use]
    pub fn collected_coins(&self) -> usize {
        self.coins.iter().filter(|coin| coin.collected).count()
    }
}

/// Advances the stage by `dt`.
///
/// Queued intents apply first, then gravity and integration, then the floor
/// clamp, then coin pickup. The returned state has an empty intent queue.
#[must_use]
pub fn update(prev: &PlatformerState, dt: Duration) -> PlatformerState {
    let mut next = PlatformerState {
        player: prev.player,
        coins: prev.coins.clone(),
        pending_intents: Vec::new(),
    };

    for intent in &prev.pending_intents {
        apply_intent(&mut next.player, *intent);
    }
    integrate(&mut next.player, dt.as_secs_f32());
    land(&mut next.player);
    collect_coins(&next.player, &mut next.coins);

    next
}

fn apply_intent(player: &mut Body, intent: PlatformerIntent) {
    match intent {
        PlatformerIntent::MoveLeft => player.velocity.x = -MOVE_SPEED,
        PlatformerIntent::MoveRight => player.velocity.x = MOVE_SPEED,
        PlatformerIntent::Jump => {
            if player.on_ground {
                player.velocity.y = JUMP_SPEED;
                player.on_ground = false;
            }
        }
    }
}

fn integrate(player: &mut Body, seconds: f32) {
    player.velocity.y += GRAVITY * seconds;
    player.position += player.velocity * seconds;
}

fn land(player: &mut Body) {
    if player.position.y + player.size.y > FLOOR_Y {
        player.position.y = FLOOR_Y - player.size.y;
        player.velocity.y = 0.0;
        player.on_ground = true;
    }
}

fn collect_coins(player: &Body, coins: &mut [Coin]) {
    let center = player.center();
    let reach = player.size.max_element() * 0.5;
    for (index, coin) in coins.iter_mut().enumerate() {
        if coin.collected {
            continue;
        }
        let limit = coin.radius + reach;
        if coin.position.distance_squared(center) <= limit * limit {
            coin.collected = true;
            debug!(index, "coin collected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_stage_matches_layout() {
        let state = PlatformerState::default();
        assert_eq!(state.player.center(), Vec2::new(112.0, 216.0));
        assert_eq!(state.coins.len(), 2);
        assert_eq!(state.collected_coins(), 0);
    }

    #[test]
    fn keys_map_to_intents() {
        assert_eq!(intent_for_key("ArrowUp"), Some(PlatformerIntent::Jump));
        assert_eq!(intent_for_key(" "), Some(PlatformerIntent::Jump));
        assert_eq!(intent_for_key("ArrowLeft"), Some(PlatformerIntent::MoveLeft));
        assert_eq!(intent_for_key("x"), None);
    }
}
