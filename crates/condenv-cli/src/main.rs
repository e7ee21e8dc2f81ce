//! condenv - conda CI environment generator

use anyhow::{Context, Result};
use clap::Parser;
use condenv_core::{CondaSearch, Resolver};

use condenv_cli::logging::{self, LogReporter};
use condenv_cli::{Cli, ui};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let log_file = cli.log_file();
    logging::init(&log_file, cli.verbose)?;

    let backend = match &cli.conda {
        Some(program) => CondaSearch::new(program, config.channel.clone()),
        None => CondaSearch::from_path(config.channel.clone())?,
    };
    tracing::debug!(
        "Using {} with channel {}",
        backend.program().display(),
        backend.channel()
    );

    let matrix = config.matrix()?;
    let reporter = LogReporter;
    let resolver = Resolver::new(&backend, matrix, config.rules(), &reporter);

    let resolution = resolver
        .resolve(&cli.requirements)
        .context("Failed to resolve requirements")?;
    resolution
        .write_environment(&config.environment_file(), &cli.output)
        .context("Failed to write environment file")?;

    if !cli.quiet {
        ui::print_summary(&resolution, &log_file);
    }

    Ok(())
}
