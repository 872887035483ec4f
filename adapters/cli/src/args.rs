//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use token_grid_core::{CellId, CellPersistence, DistanceMetric, GameConfig, MergeRule};

/// Drives Token Grid sessions from the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "token-grid",
    version,
    about = "Deterministic token grid sessions driven from the terminal"
)]
pub(crate) struct Cli {
    /// Variant to run.
    #[command(subcommand)]
    pub(crate) command: Mode,
}

/// Game variants exposed by the binary.
#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Play a scripted session on the map grid.
    Play(PlayArgs),
    /// Run the side-view platformer stage.
    Platformer(PlatformerArgs),
}

/// Options for a grid session.
#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    /// TOML file providing the base configuration.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Comma separated keys replayed one per frame (e.g. `space,d,space`).
    #[arg(long, value_delimiter = ',')]
    pub(crate) script: Vec<String>,
    /// Cell clicked after the script, as `row,col`. May be repeated.
    #[arg(long = "click", value_parser = parse_cell, allow_hyphen_values = true)]
    pub(crate) clicks: Vec<CellId>,
    /// Rule used to combine tokens.
    #[arg(long, value_enum)]
    pub(crate) merge_rule: Option<MergeRuleArg>,
    /// Metric used for the interaction radius.
    #[arg(long, value_enum)]
    pub(crate) metric: Option<MetricArg>,
    /// Whether edits persist once cells leave the view.
    #[arg(long, value_enum)]
    pub(crate) persistence: Option<PersistenceArg>,
    /// Token value that wins the session.
    #[arg(long)]
    pub(crate) target: Option<u32>,
    /// Cell edge length in degrees.
    #[arg(long)]
    pub(crate) cell_size: Option<f64>,
    /// Interaction radius in cells.
    #[arg(long)]
    pub(crate) interact_radius: Option<u32>,
    /// Seed for the memoryless spawner.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Cells shown around the player in each direction.
    #[arg(long, default_value_t = 6)]
    pub(crate) view_radius: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    pub(crate) tick_ms: u64,
    /// Print the final snapshot as JSON instead of drawing frames.
    #[arg(long)]
    pub(crate) json: bool,
}

impl PlayArgs {
    /// Overrides file or default values with the flags that were given.
    pub(crate) fn apply_to(&self, config: &mut GameConfig) {
        if let Some(rule) = self.merge_rule {
            config.merge_rule = rule.into();
        }
        if let Some(metric) = self.metric {
            config.distance_metric = metric.into();
        }
        if let Some(persistence) = self.persistence {
            config.persistence = persistence.into();
        }
        if let Some(target) = self.target {
            config.target_value = target;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        if let Some(radius) = self.interact_radius {
            config.interact_radius = radius;
        }
        if let Some(seed) = self.seed {
            config.memoryless_seed = seed;
        }
    }
}

/// Options for the platformer stage.
#[derive(Debug, Args)]
pub(crate) struct PlatformerArgs {
    /// Comma separated keys, one per frame (`left`, `right`, `up`, `space`).
    #[arg(long, value_delimiter = ',')]
    pub(crate) script: Vec<String>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    pub(crate) frames: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    pub(crate) tick_ms: u64,
    /// Print the final state as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Token combination rules selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum MergeRuleArg {
    /// Equal tokens double in place.
    Double,
    /// Tokens are gathered and crafted one value higher.
    Craft,
}

impl From<MergeRuleArg> for MergeRule {
    fn from(value: MergeRuleArg) -> Self {
        match value {
            MergeRuleArg::Double => Self::Double,
            MergeRuleArg::Craft => Self::Craft,
        }
    }
}

/// Distance metrics selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum MetricArg {
    /// Maximum of the row and column differences.
    Chebyshev,
    /// Sum of the row and column differences.
    Manhattan,
}

impl From<MetricArg> for DistanceMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Chebyshev => Self::Chebyshev,
            MetricArg::Manhattan => Self::Manhattan,
        }
    }
}

/// Persistence policies selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PersistenceArg {
    /// Edits persist as overrides.
    Overrides,
    /// Cells respawn whenever they re-enter the view.
    Memoryless,
}

impl From<PersistenceArg> for CellPersistence {
    fn from(value: PersistenceArg) -> Self {
        match value {
            PersistenceArg::Overrides => Self::Overrides,
            PersistenceArg::Memoryless => Self::Memoryless,
        }
    }
}

fn parse_cell(value: &str) -> Result<CellId, String> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col`, got `{value}`"))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    let col = col
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column `{col}`: {error}"))?;
    Ok(CellId::new(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_from_row_and_column() {
        assert_eq!(parse_cell("0,3"), Ok(CellId::new(0, 3)));
        assert_eq!(parse_cell(" -2 , 7 "), Ok(CellId::new(-2, 7)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("a,1").is_err());
    }

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::parse_from([
            "token-grid",
            "play",
            "--merge-rule",
            "craft",
            "--metric",
            "manhattan",
            "--target",
            "5",
            "--click",
            "-1,2",
            "--script",
            "space,d",
        ]);
        let Mode::Play(args) = cli.command else {
            panic!("expected the play subcommand");
        };

        let mut config = GameConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.merge_rule, MergeRule::Craft);
        assert_eq!(config.distance_metric, DistanceMetric::Manhattan);
        assert_eq!(config.target_value, 5);
        assert_eq!(config.persistence, CellPersistence::Overrides);
        assert_eq!(args.clicks, vec![CellId::new(-1, 2)]);
        assert_eq!(args.script, vec!["space".to_owned(), "d".to_owned()]);
    }
}
