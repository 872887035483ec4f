//! Per-tick orchestration of the world and its systems.

use std::time::Duration;

use token_grid_core::{Command, ConfigError, Event, GameConfig, GameSnapshot, InputEvent};
use token_grid_rendering::{status_text, Scene};
use token_grid_system_controls::Controls;
use token_grid_system_viewport::{region_around, Viewport};
use token_grid_world::{self as world, query, World};
use tracing::debug;

/// A running session: the world plus the systems that feed it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    controls: Controls,
    viewport: Viewport,
    view_radius: u32,
    status: Option<String>,
}

impl Session {
    /// Creates the world and materializes the initial view.
    pub(crate) fn new(config: GameConfig, view_radius: u32) -> Result<Self, ConfigError> {
        let mut session = Self {
            world: World::new(config)?,
            controls: Controls::new(),
            viewport: Viewport::new(),
            view_radius,
            status: None,
        };
        let mut events = Vec::new();
        session.sync_viewport(&mut events);
        debug!(cells = events.len(), "initial view materialized");
        Ok(session)
    }

    /// Advances one tick.
    ///
    /// Inputs are translated and applied in order, then the view follows the
    /// player. Returns every event the tick produced.
    pub(crate) fn tick(&mut self, dt: Duration, inputs: &[InputEvent]) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.controls.handle(inputs, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        self.sync_viewport(&mut events);
        if let Some(status) = status_text(&events) {
            self.status = Some(status);
        }
        events
    }

    fn sync_viewport(&mut self, events: &mut Vec<Event>) {
        let mapper = *query::mapper(&self.world);
        let region = region_around(
            &mapper,
            query::player_position(&self.world),
            self.view_radius,
        );
        let mut commands = Vec::new();
        self.viewport.handle(&mapper, region, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Read-only view of the world after the last tick.
    pub(crate) fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Scene for the renderer after the last tick.
    pub(crate) fn scene(&self) -> Scene {
        Scene::from_snapshot(
            &self.snapshot(),
            query::mapper(&self.world),
            self.status.clone(),
        )
    }

    /// Welcome banner for the session.
    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }
}
