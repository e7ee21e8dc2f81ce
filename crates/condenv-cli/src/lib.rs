//! condenv - conda CI environment generator
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Reads pip requirement files, asks `conda search` which of the requested
//! packages exist for every required platform and Python version, and writes
//! an `environment.yml` with the ones that do.

pub mod logging;
pub mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use condenv_core::Config;
use condenv_core::config::CONFIG_FILE_NAME;
use std::path::PathBuf;

/// Name of the log file written next to the environment file.
pub const LOG_FILE_NAME: &str = "condenv.log";

#[derive(Debug, Parser)]
#[command(name = "condenv")]
#[command(author, version, about = "Generate a conda CI environment from pip requirement files")]
pub struct Cli {
    /// Requirement files (pip syntax; `-r` includes are followed)
    #[arg(required = true)]
    pub requirements: Vec<PathBuf>,

    /// Where to write the generated environment file
    #[arg(short, long, default_value = "conda-env.yml")]
    pub output: PathBuf,

    /// Log file (truncated on every run) [default: condenv.log next to the output]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file [default: ./condenv.toml if it exists]
    #[arg(short, long, env = "CONDENV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Conda channel to search (overrides the config)
    #[arg(long)]
    pub channel: Option<String>,

    /// Path to the conda executable [default: found on PATH]
    #[arg(long, env = "CONDA_EXE")]
    pub conda: Option<PathBuf>,

    /// Write debug details to the log file
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not print the result table
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the effective configuration: explicit file, then
    /// `./condenv.toml`, then defaults; command-line flags win.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let cwd = std::env::current_dir().context("Failed to read working directory")?;
                Config::discover(&cwd)
                    .with_context(|| format!("Failed to load {CONFIG_FILE_NAME}"))?
            }
        };

        if let Some(channel) = &self.channel {
            config.channel.clone_from(channel);
        }
        Ok(config)
    }

    /// The log file path, defaulting to a file beside the output.
    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            self.output
                .parent()
                .map_or_else(|| PathBuf::from(LOG_FILE_NAME), |dir| dir.join(LOG_FILE_NAME))
        })
    }
}
