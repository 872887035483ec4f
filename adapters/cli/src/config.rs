//! Configuration file loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use token_grid_core::GameConfig;

/// Loads the configuration file, falling back to defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Parses a TOML configuration. Missing keys keep their defaults.
pub(crate) fn parse(text: &str) -> Result<GameConfig> {
    toml::from_str(text).context("configuration is not valid TOML for a game session")
}
