//! Plain-text rendering backend.

use std::{collections::VecDeque, fmt::Write as _, io::Write, time::Duration};

use anyhow::{Context, Result as AnyResult};
use glam::IVec2;
use token_grid_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

const CELL_WIDTH: usize = 4;

/// Draws each frame as a character grid centered on the player, north up.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    frames: VecDeque<FrameInput>,
    dt: Duration,
    radius: i32,
    out: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend that replays `frames` and draws `radius` cells around the player.
    pub(crate) fn new(frames: Vec<FrameInput>, dt: Duration, radius: u32, out: W) -> Self {
        Self {
            frames: frames.into(),
            dt,
            radius: i32::try_from(radius).unwrap_or(i32::MAX),
            out,
        }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene),
    {
        writeln!(self.out, "{}", presentation.title).context("failed to write title")?;
        let mut scene = presentation.scene;
        self.out
            .write_all(draw(&scene, self.radius).as_bytes())
            .context("failed to write frame")?;

        while let Some(frame) = self.frames.pop_front() {
            update_scene(self.dt, frame, &mut scene);
            self.out
                .write_all(draw(&scene, self.radius).as_bytes())
                .context("failed to write frame")?;
        }
        self.out.flush().context("failed to flush output")
    }
}

/// Renders one frame: the grid, then the HUD and status lines.
pub(crate) fn draw(scene: &Scene, radius: i32) -> String {
    let mut frame = String::new();
    for row in (-radius..=radius).rev() {
        for col in -radius..=radius {
            let text = glyph(scene, IVec2::new(col, row));
            let _ = write!(frame, "{text:>width$}", width = CELL_WIDTH);
        }
        frame.push('\n');
    }

    let bag: Vec<String> = scene.hud.bag.iter().map(ToString::to_string).collect();
    let _ = writeln!(
        frame,
        "player {} | holding: {} | bag: [{}] | score: {} | goal: {}",
        scene.player.cell,
        scene.hud.holding,
        bag.join(", "),
        scene.hud.score,
        scene.hud.target_value,
    );
    if let Some(status) = &scene.status {
        let _ = writeln!(frame, "status: {status}");
    }
    frame.push('\n');
    frame
}

fn glyph(scene: &Scene, offset: IVec2) -> String {
    let Some(cell) = scene.cell_at_offset(offset) else {
        return String::new();
    };
    let label = match (&cell.label, cell.interactable) {
        (Some(label), _) => label.clone(),
        (None, true) => ".".to_owned(),
        (None, false) => String::new(),
    };
    if offset == IVec2::ZERO {
        format!("@{}", label.trim_start_matches('.'))
    } else {
        label
    }
}
