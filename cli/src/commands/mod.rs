// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the wlbouncer CLI

pub mod check;
pub mod defaults;
pub mod policy;

pub use self::check::CheckArgs;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use wlbouncer_core::domain::config::CompileContext;
use wlbouncer_core::domain::identity::{NameResolver, Pid};
use wlbouncer_core::domain::policy::PolicyStore;
use wlbouncer_core::domain::variables::ProcessContext;
use wlbouncer_core::infrastructure::{ConfigLocator, Settings};

/// A compiled policy and the file it came from.
pub struct LoadedPolicy {
    pub path: PathBuf,
    pub store: PolicyStore,
}

/// Read and compile the policy the engine would pick up.
///
/// `explicit` bypasses discovery. `own_pid` is the pid treated as the
/// compositor for self-exemption; `$variables` resolve against `process`.
pub fn load_policy(
    locator: &ConfigLocator,
    explicit: Option<&Path>,
    process: ProcessContext,
    own_pid: Pid,
    resolver: &dyn NameResolver,
) -> Result<LoadedPolicy> {
    let (path, tree) = locator
        .load(explicit)
        .context("Failed to load policy file")?;

    let ctx = CompileContext { process, resolver };
    let store = PolicyStore::new(own_pid);
    let count = store
        .load(&tree, &ctx)
        .with_context(|| format!("Invalid policy in {}", path.display()))?;
    debug!("Compiled {} directives from {}", count, path.display());

    Ok(LoadedPolicy { path, store })
}

/// Discovery locations as the engine sees them from this environment.
///
/// A `BOUNCER_CONFIG` pointing at a missing file is skipped here, exactly as
/// the engine skips it; only `--config` is taken as a hard requirement.
pub fn standard_locator() -> ConfigLocator {
    ConfigLocator::standard(&Settings::from_env())
}
