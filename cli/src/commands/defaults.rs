// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `wlbouncer defaults`

use anyhow::Result;
use colored::Colorize;

use wlbouncer_core::domain::policy::DEFAULT_INTERFACES;

pub fn execute() -> Result<()> {
    println!(
        "{}",
        "Interfaces advertised when no directive decides:".bold()
    );
    for interface in DEFAULT_INTERFACES {
        println!("  {}", interface);
    }
    Ok(())
}
