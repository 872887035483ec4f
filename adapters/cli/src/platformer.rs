//! Scripted runs of the platformer stage.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use token_grid_system_platformer::{intent_for_key, update, PlatformerState};
use tracing::{info, warn};

use crate::args::PlatformerArgs;

/// Final state of a platformer run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct PlatformerReport {
    /// Top-left corner of the player.
    pub(crate) position: [f32; 2],
    /// Player velocity.
    pub(crate) velocity: [f32; 2],
    /// Whether the player stands on the floor.
    pub(crate) on_ground: bool,
    /// Coins collected.
    pub(crate) coins_collected: usize,
    /// Coins on the stage.
    pub(crate) coins_total: usize,
}

impl From<&PlatformerState> for PlatformerReport {
    fn from(state: &PlatformerState) -> Self {
        Self {
            position: state.player.position.to_array(),
            velocity: state.player.velocity.to_array(),
            on_ground: state.player.on_ground,
            coins_collected: state.collected_coins(),
            coins_total: state.coins.len(),
        }
    }
}

/// Simulates the stage, feeding script key `i` into frame `i`.
pub(crate) fn simulate(script: &[String], frames: u32, dt: Duration) -> PlatformerState {
    let mut state = PlatformerState::default();
    for frame in 0..frames {
        let key = usize::try_from(frame)
            .ok()
            .and_then(|index| script.get(index));
        if let Some(key) = key {
            match intent_for_key(key) {
                Some(intent) => state.enqueue(intent),
                None => warn!(%key, "ignoring unknown platformer key"),
            }
        }
        state = update(&state, dt);
    }
    state
}

/// Runs the platformer subcommand.
pub(crate) fn run(args: &PlatformerArgs) -> Result<()> {
    info!(frames = args.frames, "running platformer stage");
    let state = simulate(&args.script, args.frames, Duration::from_millis(args.tick_ms));
    let report = PlatformerReport::from(&state);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize platformer state")?;
        println!("{json}");
    } else {
        println!(
            "player at ({:.1}, {:.1}) | on ground: {} | coins: {}/{}",
            report.position[0],
            report.position[1],
            report.on_ground,
            report.coins_collected,
            report.coins_total,
        );
    }
    Ok(())
}
