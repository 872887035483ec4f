#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Token Grid.
//!
//! The [`World`] owns the override store, the player, the inventory, the score
//! and the set of materialized cells. All mutation flows through [`apply`];
//! everything else is read through the [`query`] module.

mod overrides;
mod player;
mod resolver;

use std::{collections::BTreeMap, time::Duration};

use token_grid_core::{
    CellContent, CellId, CellOverride, CellPersistence, Command, ConfigError, Direction, Event,
    GameConfig, GridMapper, Token, WELCOME_BANNER,
};
use token_grid_system_generator::{base_content, MemorylessSpawner};
use token_grid_system_interaction::{self as interaction, InteractionRequest, Outcome};
use tracing::{debug, info};

use crate::{overrides::OverrideStore, player::Player};

/// Represents the authoritative Token Grid session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    mapper: GridMapper,
    overrides: OverrideStore,
    player: Player,
    held: Option<Token>,
    bag: Vec<Token>,
    score: u64,
    has_won: bool,
    /// Visible cells. Under the memoryless policy each entry carries the
    /// content spawned for the cell; under the override policy it is `None`.
    materialized: BTreeMap<CellId, Option<CellContent>>,
    spawner: MemorylessSpawner,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a new session, rejecting configurations that cannot be played.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let mapper = config.validate()?;
        let player = Player::at(config.start, &mapper);
        info!(
            cell = %player.cell(),
            merge_rule = ?config.merge_rule,
            metric = ?config.distance_metric,
            persistence = ?config.persistence,
            "session created"
        );
        Ok(Self {
            banner: WELCOME_BANNER,
            spawner: MemorylessSpawner::from_seed(config.memoryless_seed),
            config,
            mapper,
            overrides: OverrideStore::new(),
            player,
            held: None,
            bag: Vec::new(),
            score: 0,
            has_won: false,
            materialized: BTreeMap::new(),
            tick_index: 0,
            elapsed: Duration::ZERO,
        })
    }

    fn effective_content(&self, cell: CellId) -> Option<CellContent> {
        match self.config.persistence {
            CellPersistence::Overrides => Some(resolver::resolve(
                base_content(cell),
                self.overrides.get(cell),
            )),
            CellPersistence::Memoryless => self.materialized.get(&cell).copied().flatten(),
        }
    }

    fn is_interactable(&self, cell: CellId) -> bool {
        interaction::within_radius(
            &self.mapper,
            self.config.distance_metric,
            self.player.cell(),
            cell,
            self.config.interact_radius,
        )
    }

    fn write_cell(&mut self, cell: CellId, overlay: CellOverride) {
        match self.config.persistence {
            CellPersistence::Overrides => self.overrides.set(cell, overlay),
            CellPersistence::Memoryless => {
                if let Some(Some(content)) = self.materialized.get_mut(&cell) {
                    *content = resolver::resolve(*content, Some(&overlay));
                }
            }
        }
    }

    fn record_production(&mut self, token: Token, out_events: &mut Vec<Event>) {
        if self.has_won || token.value() < self.config.target_value {
            return;
        }
        self.has_won = true;
        info!(value = token.value(), "win threshold reached");
        out_events.push(Event::VictoryAchieved {
            token,
            target: self.config.target_value,
            rule: self.config.merge_rule,
        });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let previously_interactable: Vec<bool> = self
            .materialized
            .keys()
            .map(|cell| self.is_interactable(*cell))
            .collect();

        let from = self.player.step(direction, &self.mapper);
        let to = self.player.cell();
        debug!(%from, %to, ?direction, "player moved");
        out_events.push(Event::PlayerMoved {
            from,
            to,
            position: self.player.position(),
        });

        let flipped: Vec<CellId> = self
            .materialized
            .keys()
            .zip(previously_interactable)
            .filter(|(cell, before)| self.is_interactable(**cell) != *before)
            .map(|(cell, _)| *cell)
            .collect();
        if !flipped.is_empty() {
            out_events.push(Event::InteractabilityChanged { cells: flipped });
        }
    }

    fn interact(&mut self, target: CellId, out_events: &mut Vec<Event>) {
        let target = self.mapper.canonical(target);
        let transition = interaction::interact(InteractionRequest {
            rule: self.config.merge_rule,
            mapper: self.mapper,
            metric: self.config.distance_metric,
            radius: self.config.interact_radius,
            player_cell: self.player.cell(),
            target,
            held: self.held,
            content: self.effective_content(target),
        });

        if let Outcome::Rejected(reason) = transition.outcome {
            debug!(cell = %target, ?reason, "interaction rejected");
            out_events.push(Event::InteractionRejected {
                cell: target,
                reason,
            });
            return;
        }

        self.held = transition.held;
        if let Some(token) = transition.bag_push {
            self.bag.push(token);
        }
        if let Some(overlay) = transition.write {
            self.write_cell(target, overlay);
        }

        match transition.outcome {
            Outcome::PickedUp { token, slot } => {
                debug!(cell = %target, value = token.value(), ?slot, "token picked up");
                out_events.push(Event::TokenPickedUp {
                    cell: target,
                    token,
                    slot,
                });
            }
            Outcome::Dropped { token } => {
                debug!(cell = %target, value = token.value(), "token dropped");
                out_events.push(Event::TokenDropped {
                    cell: target,
                    token,
                });
            }
            Outcome::Merged {
                consumed,
                produced,
                score_delta,
            } => {
                self.score = self.score.saturating_add(score_delta);
                debug!(cell = %target, value = produced.value(), score = self.score, "tokens merged");
                out_events.push(Event::TokensMerged {
                    cell: target,
                    consumed,
                    produced,
                    score_delta,
                });
                self.record_production(produced, out_events);
            }
            Outcome::Rejected(_) => {}
        }
    }

    fn craft(&mut self, out_events: &mut Vec<Event>) {
        match interaction::craft(self.config.merge_rule, self.held, &self.bag) {
            Ok(crafted) => {
                debug!(
                    consumed = crafted.consumed.value(),
                    produced = crafted.produced.value(),
                    slot = ?crafted.slot,
                    "tokens crafted"
                );
                self.held = crafted.held;
                self.bag = crafted.bag;
                out_events.push(Event::TokensCrafted {
                    consumed: crafted.consumed,
                    produced: crafted.produced,
                    slot: crafted.slot,
                });
                self.record_production(crafted.produced, out_events);
            }
            Err(reason) => {
                debug!(?reason, "craft rejected");
                out_events.push(Event::CraftRejected { reason });
            }
        }
    }

    fn materialize(&mut self, cell: CellId, out_events: &mut Vec<Event>) {
        let cell = self.mapper.canonical(cell);
        if self.materialized.contains_key(&cell) {
            return;
        }
        let spawned = match self.config.persistence {
            CellPersistence::Overrides => None,
            CellPersistence::Memoryless => Some(self.spawner.spawn()),
        };
        let _ = self.materialized.insert(cell, spawned);
        let content = self.effective_content(cell).unwrap_or(CellContent::EMPTY);
        out_events.push(Event::CellMaterialized { cell, content });
    }

    fn dematerialize(&mut self, cell: CellId, out_events: &mut Vec<Event>) {
        let cell = self.mapper.canonical(cell);
        if self.materialized.remove(&cell).is_some() {
            out_events.push(Event::CellDematerialized { cell });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::Interact { cell } => world.interact(cell, out_events),
        Command::InteractHere => {
            let cell = world.player.cell();
            world.interact(cell, out_events);
        }
        Command::Craft => world.craft(out_events),
        Command::Materialize { cell } => world.materialize(cell, out_events),
        Command::Dematerialize { cell } => world.dematerialize(cell, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use token_grid_core::{
        CellContent, CellId, CellOverride, CellView, GameConfig, GameSnapshot, GeoPoint,
        GridMapper, MergeRule, PlayerSnapshot, Token,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Grid mapper derived from the configuration.
    #[must_use]
    pub fn mapper(world: &World) -> &GridMapper {
        &world.mapper
    }

    /// Authoritative player position.
    #[must_use]
    pub fn player_position(world: &World) -> GeoPoint {
        world.player.position()
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellId {
        world.player.cell()
    }

    /// Token in the primary slot.
    #[must_use]
    pub fn held(world: &World) -> Option<Token> {
        world.held
    }

    /// Secondary inventory in insertion order.
    #[must_use]
    pub fn bag(world: &World) -> &[Token] {
        &world.bag
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Whether the win threshold has been reached.
    #[must_use]
    pub fn has_won(world: &World) -> bool {
        world.has_won
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total simulated time applied so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Effective content of a cell.
    ///
    /// Under the memoryless policy only materialized cells have content.
    #[must_use]
    pub fn effective_content(world: &World, cell: CellId) -> Option<CellContent> {
        world.effective_content(world.mapper.canonical(cell))
    }

    /// Override recorded for a cell, if any.
    #[must_use]
    pub fn override_for(world: &World, cell: CellId) -> Option<CellOverride> {
        world.overrides.get(world.mapper.canonical(cell)).copied()
    }

    /// All recorded overrides in cell order.
    #[must_use]
    pub fn overrides(world: &World) -> Vec<(CellId, CellOverride)> {
        world
            .overrides
            .iter()
            .map(|(cell, value)| (cell, *value))
            .collect()
    }

    /// Number of cells carrying an override.
    #[must_use]
    pub fn override_count(world: &World) -> usize {
        world.overrides.len()
    }

    /// Whether the cell lies inside the player's interaction radius.
    #[must_use]
    pub fn is_interactable(world: &World, cell: CellId) -> bool {
        world.is_interactable(world.mapper.canonical(cell))
    }

    /// Materialized cells in deterministic order.
    #[must_use]
    pub fn materialized_cells(world: &World) -> Vec<CellId> {
        world.materialized.keys().copied().collect()
    }

    /// Active merge rule.
    #[must_use]
    pub fn merge_rule(world: &World) -> MergeRule {
        world.config.merge_rule
    }

    /// Captures the read-only snapshot handed to renderers.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        let cells = world
            .materialized
            .keys()
            .map(|cell| CellView {
                cell: *cell,
                content: world
                    .effective_content(*cell)
                    .unwrap_or(CellContent::EMPTY),
                interactable: world.is_interactable(*cell),
            })
            .collect();

        GameSnapshot {
            player: PlayerSnapshot {
                position: world.player.position(),
                cell: world.player.cell(),
            },
            cells,
            held: world.held,
            bag: world.bag.clone(),
            score: world.score,
            has_won: world.has_won,
            merge_rule: world.config.merge_rule,
            target_value: world.config.target_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_grid_core::{CraftRejection, GeoPoint, MergeRule, RejectReason};

    fn unit_config() -> GameConfig {
        GameConfig {
            cell_size: 1.0,
            start: GeoPoint::new(0.5, 0.5),
            ..GameConfig::default()
        }
    }

    #[test]
    fn new_world_rejects_invalid_config() {
        let config = GameConfig {
            cell_size: -1.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            World::new(config),
            Err(ConfigError::InvalidCellSize { .. })
        ));
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = World::new(unit_config()).expect("valid config");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(query::elapsed(&world), Duration::from_millis(16));
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }

    #[test]
    fn moving_reports_cells_crossing_the_radius() {
        let config = GameConfig {
            interact_radius: 1,
            ..unit_config()
        };
        let mut world = World::new(config).expect("valid config");
        let mut events = Vec::new();
        for col in 0..4 {
            apply(
                &mut world,
                Command::Materialize {
                    cell: CellId::new(0, col),
                },
                &mut events,
            );
        }
        events.clear();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(
            events.last(),
            Some(&Event::InteractabilityChanged {
                cells: vec![CellId::new(0, 2)],
            })
        );
        assert_eq!(query::player_cell(&world), CellId::new(0, 1));
        assert_eq!(query::player_position(&world), GeoPoint::new(0.5, 1.5));
    }

    #[test]
    fn materializing_twice_is_idempotent() {
        let mut world = World::new(unit_config()).expect("valid config");
        let mut events = Vec::new();
        let cell = CellId::new(3, 3);
        apply(&mut world, Command::Materialize { cell }, &mut events);
        apply(&mut world, Command::Materialize { cell }, &mut events);
        assert_eq!(events.len(), 1);
        apply(&mut world, Command::Dematerialize { cell }, &mut events);
        apply(&mut world, Command::Dematerialize { cell }, &mut events);
        assert_eq!(events.len(), 2);
        assert!(query::materialized_cells(&world).is_empty());
    }

    #[test]
    fn memoryless_cells_outside_the_view_cannot_be_touched() {
        let config = GameConfig {
            persistence: CellPersistence::Memoryless,
            ..unit_config()
        };
        let mut world = World::new(config).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::InteractHere, &mut events);

        assert_eq!(
            events,
            vec![Event::InteractionRejected {
                cell: CellId::new(0, 0),
                reason: RejectReason::NotMaterialized,
            }]
        );
        assert_eq!(query::effective_content(&world, CellId::new(0, 0)), None);
    }

    #[test]
    fn crafting_is_rejected_under_the_double_rule() {
        let mut world = World::new(unit_config()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::Craft, &mut events);
        assert_eq!(
            events,
            vec![Event::CraftRejected {
                reason: CraftRejection::WrongMode,
            }]
        );
        assert_eq!(query::merge_rule(&world), MergeRule::Double);
    }
}
