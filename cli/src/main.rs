// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # wlbouncer CLI
//!
//! Administrator tooling for wlbouncer policy files. Nothing here touches a
//! running compositor; every command compiles the policy the same way the
//! engine does and reports on it.
//!
//! ## Commands
//!
//! - `wlbouncer validate [FILE]` - Compile a policy and report errors
//! - `wlbouncer show [--paths]` - Print the discovered policy, rule by rule
//! - `wlbouncer check INTERFACE...` - Explain decisions for an identity
//! - `wlbouncer defaults` - List the built-in default interface set

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wlbouncer::commands::{self, CheckArgs};

/// wlbouncer - per-client Wayland global policy
#[derive(Parser)]
#[command(name = "wlbouncer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the policy file (overrides discovery; unlike BOUNCER_CONFIG
    /// it must exist)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BOUNCER_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a policy file and report the first error
    #[command(name = "validate")]
    Validate {
        /// Policy file (default: --config, then discovery)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show the policy in effect
    #[command(name = "show")]
    Show {
        /// Also list every path discovery looks at
        #[arg(long)]
        paths: bool,
    },

    /// Explain how the policy treats a client
    #[command(name = "check")]
    Check(CheckArgs),

    /// List the interfaces advertised when no rule decides
    #[command(name = "defaults")]
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Validate { file } => commands::policy::validate(file.or(cli.config)),
        Commands::Show { paths } => commands::policy::show(cli.config, paths),
        Commands::Check(args) => commands::check::execute(args, cli.config),
        Commands::Defaults => commands::defaults::execute(),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
