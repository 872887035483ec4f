use token_grid_core::{
    CellContent, CellId, CellOverride, CellPersistence, Command, ConfigError, CraftRejection,
    Direction, Event, GameConfig, GeoPoint, InventorySlot, MergeRule, RejectReason, Token,
};
use token_grid_world::{self as world, query, World};

fn unit_config() -> GameConfig {
    GameConfig {
        cell_size: 1.0,
        start: GeoPoint::new(1.5, 0.5),
        ..GameConfig::default()
    }
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn materialize_around(world: &mut World, center: CellId, radius: i32) -> Vec<Event> {
    let mut events = Vec::new();
    for d_row in -radius..=radius {
        for d_col in -radius..=radius {
            world::apply(
                world,
                Command::Materialize {
                    cell: center.offset(d_row, d_col),
                },
                &mut events,
            );
        }
    }
    events
}

#[test]
fn pickup_drop_and_merge_walkthrough() {
    let mut world = World::new(unit_config()).expect("valid config");
    assert_eq!(query::player_cell(&world), CellId::new(1, 0));
    assert_eq!(
        query::effective_content(&world, CellId::new(1, 0)),
        Some(CellContent::with_token(Token::new(2)))
    );

    let events = run(&mut world, Command::InteractHere);
    assert_eq!(
        events,
        vec![Event::TokenPickedUp {
            cell: CellId::new(1, 0),
            token: Token::new(2),
            slot: InventorySlot::Held,
        }]
    );
    assert_eq!(query::held(&world), Some(Token::new(2)));
    assert_eq!(
        query::effective_content(&world, CellId::new(1, 0)),
        Some(CellContent::EMPTY)
    );
    assert_eq!(query::score(&world), 0);

    let _ = run(
        &mut world,
        Command::MovePlayer {
            direction: Direction::East,
        },
    );
    assert_eq!(query::player_cell(&world), CellId::new(1, 1));

    let events = run(&mut world, Command::InteractHere);
    assert_eq!(
        events,
        vec![Event::TokenDropped {
            cell: CellId::new(1, 1),
            token: Token::new(2),
        }]
    );
    assert_eq!(query::held(&world), None);

    let _ = run(&mut world, Command::InteractHere);
    assert_eq!(query::held(&world), Some(Token::new(2)));

    let events = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 3),
        },
    );
    assert_eq!(
        events,
        vec![Event::TokensMerged {
            cell: CellId::new(0, 3),
            consumed: Token::new(2),
            produced: Token::new(4),
            score_delta: 4,
        }]
    );
    assert_eq!(query::held(&world), None);
    assert_eq!(query::score(&world), 4);
    assert_eq!(
        query::override_for(&world, CellId::new(0, 3)),
        Some(CellOverride::placing(Token::new(4)))
    );
    assert!(!query::has_won(&world), "16 has not been reached yet");
}

#[test]
fn out_of_range_requests_never_mutate() {
    let mut world = World::new(unit_config()).expect("valid config");
    let _ = run(&mut world, Command::InteractHere);
    let before = query::snapshot(&world);
    let overrides_before = query::override_count(&world);

    let far = CellId::new(1, 4);
    let events = run(&mut world, Command::Interact { cell: far });

    assert_eq!(
        events,
        vec![Event::InteractionRejected {
            cell: far,
            reason: RejectReason::OutOfRange,
        }]
    );
    assert_eq!(query::snapshot(&world), before);
    assert_eq!(query::override_count(&world), overrides_before);
    assert_eq!(query::override_for(&world, far), None);
}

#[test]
fn mismatched_values_are_rejected() {
    let mut world = World::new(unit_config()).expect("valid config");
    let _ = run(&mut world, Command::InteractHere);

    let events = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 2),
        },
    );
    assert_eq!(
        events,
        vec![Event::InteractionRejected {
            cell: CellId::new(0, 2),
            reason: RejectReason::MismatchedValue,
        }]
    );
    assert_eq!(query::held(&world), Some(Token::new(2)));
    assert_eq!(
        query::effective_content(&world, CellId::new(0, 2)),
        Some(CellContent::with_token(Token::new(4)))
    );
}

#[test]
fn overrides_survive_leaving_and_reentering_view() {
    let mut world = World::new(unit_config()).expect("valid config");
    let start = query::player_cell(&world);
    let _ = materialize_around(&mut world, start, 3);
    let _ = run(&mut world, Command::InteractHere);

    let _ = run(&mut world, Command::Dematerialize { cell: start });
    let events = run(&mut world, Command::Materialize { cell: start });

    assert_eq!(
        events,
        vec![Event::CellMaterialized {
            cell: start,
            content: CellContent::EMPTY,
        }]
    );
    let snapshot = query::snapshot(&world);
    let view = snapshot.cell(start).expect("cell is visible");
    assert!(!view.content.has_token());
    assert!(view.interactable);
}

#[test]
fn snapshot_lists_visible_cells_in_order() {
    let mut world = World::new(unit_config()).expect("valid config");
    let start = query::player_cell(&world);
    let _ = materialize_around(&mut world, start, 4);

    let snapshot = query::snapshot(&world);
    assert_eq!(snapshot.cells.len(), 81);
    assert!(snapshot
        .cells
        .windows(2)
        .all(|pair| pair[0].cell < pair[1].cell));

    let interactable = snapshot
        .cells
        .iter()
        .filter(|view| view.interactable)
        .count();
    assert_eq!(interactable, 49, "radius 3 covers a 7x7 block");
    assert_eq!(
        snapshot.cell(CellId::new(0, 3)).map(|view| view.content),
        Some(CellContent::with_token(Token::new(2)))
    );
}

#[test]
fn memoryless_cells_forget_changes_once_hidden() {
    let config = GameConfig {
        persistence: CellPersistence::Memoryless,
        interact_radius: 10,
        ..unit_config()
    };
    let mut world = World::new(config).expect("valid config");
    let start = query::player_cell(&world);
    let events = materialize_around(&mut world, start, 10);

    for event in &events {
        if let Event::CellMaterialized { content, .. } = event {
            assert!(
                !content.has_token() || (1..=3).contains(&content.value()),
                "unexpected spawned value {}",
                content.value()
            );
        }
    }

    let target = query::materialized_cells(&world)
        .into_iter()
        .find(|cell| {
            query::effective_content(&world, *cell).is_some_and(|content| content.has_token())
        })
        .expect("some visible cell holds a token");

    let events = run(&mut world, Command::Interact { cell: target });
    assert!(matches!(
        events.as_slice(),
        [Event::TokenPickedUp { .. }]
    ));
    assert_eq!(
        query::effective_content(&world, target),
        Some(CellContent::EMPTY)
    );
    assert_eq!(query::override_count(&world), 0, "nothing is persisted");

    let _ = run(&mut world, Command::Dematerialize { cell: target });
    assert_eq!(query::effective_content(&world, target), None);

    let events = run(&mut world, Command::Materialize { cell: target });
    let [Event::CellMaterialized { content, .. }] = events.as_slice() else {
        panic!("expected a single materialization, got {events:?}");
    };
    assert_eq!(query::effective_content(&world, target), Some(*content));
}

#[test]
fn crafting_reaches_the_target_once() {
    let config = GameConfig {
        merge_rule: MergeRule::Craft,
        target_value: 3,
        ..unit_config()
    };
    let mut world = World::new(config).expect("valid config");

    let _ = run(&mut world, Command::InteractHere);
    let events = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 3),
        },
    );
    assert_eq!(
        events,
        vec![Event::TokenPickedUp {
            cell: CellId::new(0, 3),
            token: Token::new(2),
            slot: InventorySlot::Bag,
        }]
    );
    assert_eq!(query::bag(&world), &[Token::new(2)]);

    let events = run(&mut world, Command::Craft);
    assert_eq!(
        events,
        vec![
            Event::TokensCrafted {
                consumed: Token::new(2),
                produced: Token::new(3),
                slot: InventorySlot::Held,
            },
            Event::VictoryAchieved {
                token: Token::new(3),
                target: 3,
                rule: MergeRule::Craft,
            },
        ]
    );
    assert_eq!(query::held(&world), Some(Token::new(3)));
    assert!(query::bag(&world).is_empty());
    assert!(query::has_won(&world));

    let events = run(&mut world, Command::Craft);
    assert_eq!(
        events,
        vec![Event::CraftRejected {
            reason: CraftRejection::NoMatchingPair,
        }]
    );
    assert!(query::has_won(&world), "victory is never revoked");

    let _ = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 2),
        },
    );
    assert_eq!(query::bag(&world), &[Token::new(4)]);
    assert!(query::has_won(&world));
}

#[test]
fn merge_victory_is_announced_once() {
    let config = GameConfig {
        target_value: 4,
        ..unit_config()
    };
    let mut world = World::new(config).expect("valid config");
    let _ = run(&mut world, Command::InteractHere);
    let events = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 3),
        },
    );
    assert!(events.contains(&Event::VictoryAchieved {
        token: Token::new(4),
        target: 4,
        rule: MergeRule::Double,
    }));

    let _ = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 3),
        },
    );
    let events = run(
        &mut world,
        Command::Interact {
            cell: CellId::new(0, 2),
        },
    );
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::VictoryAchieved { .. })));
    assert!(query::has_won(&world));
    assert_eq!(query::score(&world), 12);
}

#[test]
fn replaying_commands_reproduces_the_session() {
    let config = GameConfig {
        persistence: CellPersistence::Memoryless,
        ..unit_config()
    };
    let script = || {
        let mut commands = Vec::new();
        for d_row in -3..=3 {
            for d_col in -3..=3 {
                commands.push(Command::Materialize {
                    cell: CellId::new(1, 0).offset(d_row, d_col),
                });
            }
        }
        commands.extend([
            Command::InteractHere,
            Command::MovePlayer {
                direction: Direction::North,
            },
            Command::InteractHere,
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::Interact {
                cell: CellId::new(0, 0),
            },
        ]);
        commands
    };

    let replay = || {
        let mut world = World::new(config.clone()).expect("valid config");
        let mut log = Vec::new();
        for command in script() {
            world::apply(&mut world, command, &mut log);
        }
        (log, query::snapshot(&world))
    };

    let first = replay();
    let second = replay();
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn tokens_can_be_picked_up_across_the_seam() {
    let preview = World::new(unit_config()).expect("valid config");
    let row = (0..64)
        .find(|row| {
            query::effective_content(&preview, CellId::new(*row, -180))
                .is_some_and(|content| content.has_token())
        })
        .expect("some seam cell carries a token");
    let across = CellId::new(row, -180);
    let token = query::effective_content(&preview, across)
        .and_then(|content| content.token())
        .expect("token present");

    let config = GameConfig {
        start: GeoPoint::new(f64::from(row) + 0.5, 179.5),
        ..unit_config()
    };
    let mut world = World::new(config).expect("valid config");
    assert_eq!(query::player_cell(&world), CellId::new(row, 179));
    assert!(query::is_interactable(&world, across));

    let events = run(&mut world, Command::Interact { cell: across });
    assert_eq!(
        events,
        vec![Event::TokenPickedUp {
            cell: across,
            token,
            slot: InventorySlot::Held,
        }]
    );

    let alias = CellId::new(row, 180);
    let events = run(&mut world, Command::Interact { cell: alias });
    assert_eq!(
        events,
        vec![Event::TokenDropped {
            cell: across,
            token,
        }],
        "the eastern alias resolves to the same cell"
    );
    assert_eq!(
        query::override_for(&world, alias),
        Some(CellOverride::placing(token))
    );
    assert_eq!(
        query::override_for(&world, alias),
        query::override_for(&world, across)
    );
}

#[test]
fn seam_cell_is_reachable_for_fractional_cell_sizes() {
    let config = GameConfig {
        cell_size: 0.75,
        start: GeoPoint::new(0.35, 179.95),
        ..GameConfig::default()
    };
    let mut world = World::new(config).expect("0.75 tiles the seam");
    let here = query::player_cell(&world);
    assert_eq!(here, CellId::new(0, 239));
    assert!(query::is_interactable(&world, here));

    let events = run(&mut world, Command::InteractHere);
    assert!(
        !events.iter().any(|event| matches!(
            event,
            Event::InteractionRejected {
                reason: RejectReason::OutOfRange,
                ..
            }
        )),
        "own cell must be in range: {events:?}"
    );
    assert!(events.iter().all(|event| match event {
        Event::InteractionRejected { cell, .. } | Event::TokenPickedUp { cell, .. } => *cell == here,
        _ => true,
    }));
}

#[test]
fn cell_sizes_that_split_the_seam_are_rejected() {
    let config = GameConfig {
        cell_size: 0.7,
        start: GeoPoint::new(0.35, 179.95),
        ..GameConfig::default()
    };
    assert_eq!(
        World::new(config).map(|_| ()),
        Err(ConfigError::SeamMisaligned { cell_size: 0.7 })
    );
}
