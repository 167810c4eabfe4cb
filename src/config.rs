/*
 * This file is part of Fanpanel.
 *
 * Copyright (C) 2025 Fanpanel contributors
 *
 * Fanpanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanpanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanpanel. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::{Elevation, ToolPaths};
use crate::panels::PanelOptions;

pub const DEFAULT_CONFIG_CLI: &str = "/opt/fancontrol/fancontrol-cli.py";
pub const DEFAULT_LOGGER_CLI: &str = "/opt/fancontrol/fancontrol-logger.py";

const MAX_PATH_LEN: usize = 4096;
const REFRESH_MS_RANGE: std::ops::RangeInclusive<u64> = 100..=60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_config_cli() -> String { DEFAULT_CONFIG_CLI.to_string() }
fn default_logger_cli() -> String { DEFAULT_LOGGER_CLI.to_string() }
fn default_refresh_ms() -> u64 { 1000 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    /// fancontrol configuration CLI.
    #[serde(default = "default_config_cli")]
    pub config_cli: String,
    /// fancontrol logger CLI.
    #[serde(default = "default_logger_cli")]
    pub logger_cli: String,
    #[serde(default)]
    pub elevate: Elevation,
    /// Monitor poll interval.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default)]
    pub logging: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            config_cli: default_config_cli(),
            logger_cli: default_logger_cli(),
            elevate: Elevation::default(),
            refresh_ms: default_refresh_ms(),
            logging: false,
        }
    }
}

impl PanelConfig {
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths { config_cli: self.config_cli.clone(), logger_cli: self.logger_cli.clone() }
    }

    pub fn panel_options(&self) -> PanelOptions {
        PanelOptions { refresh: Duration::from_millis(self.refresh_ms) }
    }
}

/// `explicit` wins, then XDG, then `~/.config`, then `/etc`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("fanpanel").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("fanpanel")
            .join("config.json");
    }
    PathBuf::from("/etc/fanpanel/config.json")
}

/// Loads and validates the file at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PanelConfig, ConfigError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PanelConfig::default()),
        Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
    };
    let cfg: PanelConfig = serde_json::from_str(&data)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn is_safe_tool_path(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_PATH_LEN { return false; }
    s.starts_with('/') && !s.chars().any(char::is_control)
}

pub fn validate_config(cfg: &PanelConfig) -> Result<(), ConfigError> {
    if !is_safe_tool_path(&cfg.config_cli) {
        return Err(ConfigError::Invalid("config_cli must be an absolute path".to_string()));
    }
    if !is_safe_tool_path(&cfg.logger_cli) {
        return Err(ConfigError::Invalid("logger_cli must be an absolute path".to_string()));
    }
    if !REFRESH_MS_RANGE.contains(&cfg.refresh_ms) {
        return Err(ConfigError::Invalid(format!(
            "refresh_ms out of range ({}..{})",
            REFRESH_MS_RANGE.start(),
            REFRESH_MS_RANGE.end()
        )));
    }
    Ok(())
}
