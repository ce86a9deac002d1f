// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Load and validate taish configuration from TOML and the environment.
// Author: Lukas Bower

//! Load and validate taish configuration from TOML and the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TAISH_CONFIG";
/// Environment variable naming the mock daemon fixture.
pub const FIXTURE_ENV: &str = "TAISH_FIXTURE";
/// Environment variable naming the line editor history file.
pub const HISTORY_ENV: &str = "TAISH_HISTORY";
/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taish.toml";

/// Effective shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaishConfig {
    /// Render attribute values as JSON.
    #[serde(default)]
    pub json: bool,
    /// TOML fixture seeding the mock daemon.
    pub fixture: Option<PathBuf>,
    /// Line editor history file.
    pub history: Option<PathBuf>,
}

/// Values supplied on the command line, layered over the file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Force JSON output on.
    pub json: bool,
    /// Override the fixture path.
    pub fixture: Option<PathBuf>,
    /// Override the history path.
    pub history: Option<PathBuf>,
}

impl TaishConfig {
    /// Parse configuration text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid taish configuration TOML")
    }

    /// Apply command-line then environment overrides and validate the result.
    pub fn with_overrides(self, overrides: ConfigOverrides) -> Result<Self> {
        let mut updated = self;
        updated.json |= overrides.json;
        if let Some(path) = env_override(overrides.fixture, FIXTURE_ENV) {
            updated.fixture = Some(path);
        }
        if let Some(path) = env_override(overrides.history, HISTORY_ENV) {
            updated.history = Some(path);
        }
        validate_config(&updated)?;
        Ok(updated)
    }
}

/// Pick the configuration file: CLI, then `TAISH_CONFIG`, then `taish.toml` if present.
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    if cli_path.is_some() {
        return cli_path;
    }
    if let Some(path) = env_path(CONFIG_ENV) {
        return Some(path);
    }
    let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Load configuration from `path`, or defaults when no file is configured.
pub fn load_config(path: Option<&Path>) -> Result<TaishConfig> {
    let Some(path) = path else {
        return Ok(TaishConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read taish config {}", path.display()))?;
    TaishConfig::from_toml(&text).with_context(|| format!("invalid taish config {}", path.display()))
}

fn env_path(key: &str) -> Option<PathBuf> {
    let value = env::var_os(key)?;
    let trimmed = value.to_string_lossy().trim().to_owned();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn env_override(cli_value: Option<PathBuf>, key: &str) -> Option<PathBuf> {
    if cli_value.is_some() {
        return cli_value;
    }
    env_path(key)
}

fn validate_config(config: &TaishConfig) -> Result<()> {
    if let Some(fixture) = &config.fixture {
        if !fixture.is_file() {
            return Err(anyhow!("fixture {} is not a readable file", fixture.display()));
        }
    }
    if let Some(history) = &config.history {
        if history.is_dir() {
            return Err(anyhow!("history path {} is a directory", history.display()));
        }
    }
    Ok(())
}
