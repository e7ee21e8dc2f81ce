//! Log-file setup and the tracing-backed [`Reporter`].

use anyhow::{Context, Result};
use condenv_core::Reporter;
use condenv_core::coverage::Target;
use condenv_schema::{Specifier, Subdir};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing plain-text lines to `log_file`.
///
/// The file is truncated. `RUST_LOG` takes precedence over `verbose`.
pub fn init(log_file: &Path, verbose: bool) -> Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let file = File::create(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

/// Forwards resolution events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn marker_dropped(&self, line: &str, kept: &Specifier) {
        tracing::debug!("Dropping environment marker, using '{kept}' instead of '{line}'");
    }

    fn option_ignored(&self, file: &Path, line: &str) {
        tracing::warn!("{}: ignoring pip option '{line}'", file.display());
    }

    fn duplicate_dropped(&self, kept: &Specifier, dropped: &Specifier) {
        tracing::warn!("'{dropped}' requested again, keeping '{kept}'");
    }

    fn querying(&self, spec: &Specifier, subdir: &Subdir) {
        tracing::debug!("Searching {spec} on {subdir}");
    }

    fn noarch_fallback(&self, spec: &Specifier, subdir: &Subdir) {
        tracing::debug!("Falling back to noarch for {spec} - {subdir}");
    }

    fn unavailable(&self, name: &str, missing: &[Target]) {
        let targets: Vec<String> = missing.iter().map(ToString::to_string).collect();
        tracing::error!("{name} not available on [{}]", targets.join(", "));
    }

    fn classified(&self, spec: &Specifier, available: bool) {
        if available {
            tracing::info!("{spec}: available");
        } else {
            tracing::info!("{spec}: wanted");
        }
    }
}
