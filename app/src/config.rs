//! FILENAME: app/src/config.rs
//! PURPOSE: Runtime configuration for the command shell.
//! CONTEXT: Loaded from a JSON file when `--config` is given. Command-line
//! flags override the logging fields afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use engine::SheetConfig;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// One of off, error, warn, info, debug, trace.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub sheet: SheetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: "warn".to_string(),
            log_file: None,
            sheet: SheetConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("unknown log level: {}", self.log_level))
    }
}
