#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Token Grid sessions.

mod args;
mod config;
mod platformer;
mod session;
mod text;

use std::{io, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use token_grid_core::InputEvent;
use token_grid_rendering::{Color, FrameInput, Presentation, RenderingBackend};
use token_grid_system_controls::intent_for_key;
use tracing::{info, warn};

use crate::{
    args::{Cli, Mode, PlayArgs},
    session::Session,
    text::TextBackend,
};

/// Entry point for the Token Grid command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Mode::Play(args) => play(&args),
        Mode::Platformer(args) => platformer::run(&args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn play(args: &PlayArgs) -> Result<()> {
    let mut config = config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let mut session = match Session::new(config, args.view_radius) {
        Ok(session) => session,
        Err(error) => {
            warn!(%error, "rejected configuration");
            return Err(error).context("invalid game configuration");
        }
    };

    let frames = scripted_frames(args);
    let dt = Duration::from_millis(args.tick_ms);
    info!(frames = frames.len(), "running scripted session");

    if args.json {
        for frame in frames {
            let _ = session.tick(dt, &frame.inputs);
        }
        let json = serde_json::to_string_pretty(&session.snapshot())
            .context("failed to serialize snapshot")?;
        println!("{json}");
        return Ok(());
    }

    let presentation = Presentation::new(
        session.banner(),
        Color::from_rgb_u8(255, 255, 255),
        session.scene(),
    );
    let backend = TextBackend::new(frames, dt, args.view_radius, io::stdout().lock());
    backend.run(presentation, |dt, input, scene| {
        let _ = session.tick(dt, &input.inputs);
        *scene = session.scene();
    })
}

/// One frame per scripted key, followed by one frame per click.
fn scripted_frames(args: &PlayArgs) -> Vec<FrameInput> {
    let keys = args.script.iter().filter_map(|key| {
        let intent = intent_for_key(key);
        if intent.is_none() {
            warn!(%key, "ignoring unknown key");
        }
        intent.map(InputEvent::Intent)
    });
    let clicks = args.clicks.iter().copied().map(InputEvent::Click);

    keys.chain(clicks)
        .map(|input| FrameInput {
            inputs: vec![input],
        })
        .collect()
}
