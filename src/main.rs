//! Sveltin Migrate - Main Entry Point
//!
//! This is the command line entry point for the migration engine.
//! The actual implementation is in the `sveltin_migrate` library.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use sveltin_migrate::version::parse_version;
use sveltin_migrate::{Outcome, RunOptions, run};
use tracing_subscriber::EnvFilter;

/// Sveltin Migrate - upgrade the files of a previously generated Sveltin project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root folder of the project to migrate
    project: PathBuf,

    /// Version the project was generated with (default: read from sveltin.json)
    #[arg(long)]
    project_version: Option<String>,

    /// Version to migrate to (default: this tool's version)
    #[arg(long)]
    target_version: Option<String>,

    /// Report outdated files without rewriting them
    #[arg(long)]
    dry_run: bool,

    /// Settings file (default: <PROJECT>/sveltin-migrate.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    // Check if no arguments were provided (except the program name)
    if std::env::args().len() == 1 {
        let mut cmd = Args::command();
        cmd.print_help().ok();
        println!();
        std::process::exit(2);
    }

    let args = Args::parse();
    init_tracing(args.verbose);

    let options = RunOptions {
        project_version: args
            .project_version
            .as_deref()
            .map(parse_version)
            .transpose()
            .context("Invalid --project-version")?,
        target_version: args
            .target_version
            .as_deref()
            .map(parse_version)
            .transpose()
            .context("Invalid --target-version")?,
        dry_run: args.dry_run,
        config: args.config,
    };

    let report = run(&args.project, &options)?;

    if report.is_noop() {
        println!("Project is up to date");
    } else if report
        .outcomes()
        .iter()
        .any(|(_, outcome)| *outcome == Outcome::WouldMigrate)
    {
        println!("Dry run: no files were changed");
    } else {
        println!("Done");
    }
    Ok(())
}
