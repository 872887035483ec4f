#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating queued player input into world commands.

use token_grid_core::{Command, Direction, InputEvent, Intent};

/// Input system that drains the per-tick input queue in arrival order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Controls;

impl Controls {
    /// Creates a new controls system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one command per queued input, preserving the queue order.
    ///
    /// Keyboard interaction targets the player's cell as it stands when the
    /// command is applied, so a move followed by an interact in the same tick
    /// acts on the destination cell.
    pub fn handle(&mut self, inputs: &[InputEvent], out: &mut Vec<Command>) {
        out.extend(inputs.iter().map(|input| command_for(*input)));
    }
}

fn command_for(input: InputEvent) -> Command {
    match input {
        InputEvent::Intent(Intent::Move(direction)) => Command::MovePlayer { direction },
        InputEvent::Intent(Intent::Interact) => Command::InteractHere,
        InputEvent::Intent(Intent::Craft) => Command::Craft,
        InputEvent::Click(cell) => Command::Interact { cell },
    }
}

/// Maps a keyboard key name to an intent.
///
/// Accepts browser-style names (`ArrowUp`, `Enter`, `" "`) as well as the
/// lowercase aliases used by scripted sessions (`up`, `space`). Letters are
/// case-insensitive.
#[must_use]
pub fn intent_for_key(key: &str) -> Option<Intent> {
    let intent = match key {
        "ArrowUp" | "up" => Intent::Move(Direction::North),
        "ArrowDown" | "down" => Intent::Move(Direction::South),
        "ArrowLeft" | "left" => Intent::Move(Direction::West),
        "ArrowRight" | "right" => Intent::Move(Direction::East),
        " " | "space" | "Enter" | "enter" => Intent::Interact,
        letter if letter.chars().count() == 1 => {
            match letter.to_ascii_lowercase().as_str() {
                "w" | "n" => Intent::Move(Direction::North),
                "s" => Intent::Move(Direction::South),
                "a" => Intent::Move(Direction::West),
                "d" | "e" => Intent::Move(Direction::East),
                "c" => Intent::Craft,
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(intent_for_key("W"), intent_for_key("w"));
        assert_eq!(intent_for_key("E"), Some(Intent::Move(Direction::East)));
        assert_eq!(intent_for_key("C"), Some(Intent::Craft));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(intent_for_key("q"), None);
        assert_eq!(intent_for_key("Escape"), None);
        assert_eq!(intent_for_key(""), None);
    }
}
