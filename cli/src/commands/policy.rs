// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy file commands
//!
//! Commands: validate, show

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use wlbouncer_core::infrastructure::system::current_process;
use wlbouncer_core::infrastructure::SystemNameResolver;

use super::{load_policy, standard_locator, LoadedPolicy};

/// Compile a policy. The error, if any, comes back as the command's error.
pub fn validate(file: Option<PathBuf>) -> Result<()> {
    println!("Validating policy...");

    let process = current_process();
    let LoadedPolicy { path, store } = load_policy(
        &standard_locator(),
        file.as_deref(),
        process,
        process.pid,
        &SystemNameResolver::new(),
    )?;

    println!(
        "{}",
        format!("✓ {} is valid ({} directives)", path.display(), store.len()).green()
    );
    Ok(())
}

pub fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let locator = standard_locator();

    if show_paths {
        println!("{}", "Policy discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  0. --config flag: {}", path.display());
        }
        for (i, path) in locator.candidates().iter().enumerate() {
            let marker = if path.is_file() {
                "(found)".green()
            } else {
                "(missing)".dimmed()
            };
            println!("  {}. {} {}", i + 1, path.display(), marker);
        }
        println!();
    }

    let process = current_process();
    let LoadedPolicy { path, store } = load_policy(
        &locator,
        config_override.as_deref(),
        process,
        process.pid,
        &SystemNameResolver::new(),
    )?;

    println!("{} {}", "Policy:".bold(), path.display());
    println!();

    let directives = store.directives();
    if directives.is_empty() {
        println!(
            "  {}",
            "(no directives; only the default interface set is advertised)".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Directives (last matching rule wins):".bold());
    for directive in directives.iter() {
        println!("  {}", directive);
    }
    Ok(())
}
