//! FILENAME: app/src/cli.rs
//! PURPOSE: Command-line surface of the `sheet-cli` binary.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::commands::Shell;
use crate::config::AppConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-cli",
    about = "Run spreadsheet commands (set, clear, get, values, texts, size, stats) against one sheet."
)]
pub struct Args {
    /// Command script, one command per line. Reads standard input when omitted.
    pub script: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace). Overrides the config file.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write log lines to this file. Overrides the config file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Resolves the effective configuration: file first, then flags.
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        Ok(config)
    }
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.app_config()?;

    logging::init(config.level_filter()?, config.log_file.as_deref())
        .context("failed to initialize logging")?;
    info!(target: "cmd", "starting with edge policy {:?}", config.sheet.edge_policy);

    let mut shell = Shell::new(config.sheet.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let failures = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            shell.run(BufReader::new(file), &mut out)?
        }
        None => shell.run(io::stdin().lock(), &mut out)?,
    };

    info!(target: "cmd", "finished, {} command(s) failed", failures);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::EdgePolicy;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        std::fs::write(
            &path,
            r#"{"log_level":"info","sheet":{"edge_policy":"legacy"}}"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "sheet-cli",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "trace",
        ]);
        let config = args.app_config().unwrap();

        assert_eq!(config.log_level, "trace");
        assert_eq!(config.sheet.edge_policy, EdgePolicy::Legacy);
        assert!(args.script.is_none());
    }

    #[test]
    fn script_is_positional() {
        let args = Args::parse_from(["sheet-cli", "commands.txt", "--log-file", "run.log"]);
        assert_eq!(args.script, Some(PathBuf::from("commands.txt")));
        assert_eq!(args.app_config().unwrap().log_file, Some(PathBuf::from("run.log")));
    }
}
