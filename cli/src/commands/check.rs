// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `wlbouncer check`
//!
//! Evaluates the policy for a hypothetical client and prints each decision
//! together with what produced it. Unset identity fields default to the
//! invoking process; names are looked up through the system databases unless
//! given explicitly.
//!
//! The exit status is 0 whenever the policy could be evaluated, whether the
//! interfaces are allowed or not.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use wlbouncer_core::domain::identity::{
    Credentials, Gid, Identity, IdentityResolutionError, NameResolver, Pid, Uid,
};
use wlbouncer_core::domain::policy::{Decision, PolicyStore};
use wlbouncer_core::domain::variables::ProcessContext;
use wlbouncer_core::infrastructure::system::current_process;
use wlbouncer_core::infrastructure::SystemNameResolver;

use super::{load_policy, standard_locator};

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Interfaces to evaluate
    #[arg(value_name = "INTERFACE", required = true)]
    pub interfaces: Vec<String>,

    /// Client pid (default: this process)
    #[arg(long)]
    pub pid: Option<Pid>,

    /// Client uid (default: this process)
    #[arg(long)]
    pub uid: Option<Uid>,

    /// Client gid (default: this process)
    #[arg(long)]
    pub gid: Option<Gid>,

    /// Client user name (default: looked up from the uid)
    #[arg(long)]
    pub user: Option<String>,

    /// Client group name (default: looked up from the gid)
    #[arg(long)]
    pub group: Option<String>,

    /// Pid treated as the compositor itself
    #[arg(long, value_name = "PID", default_value_t = 0)]
    pub compositor_pid: Pid,

    /// Print decisions as YAML
    #[arg(long)]
    pub yaml: bool,
}

/// `--yaml` output: the evaluated client (absent when unresolved) and one
/// row per interface.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub client: Option<Identity>,
    pub decisions: Vec<CheckRow>,
}

/// One evaluated interface. `decision` is absent when the identity could not
/// be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRow {
    pub interface: String,
    pub allowed: bool,
    pub decision: Option<Decision>,
}

pub fn execute(args: CheckArgs, config_override: Option<PathBuf>) -> Result<()> {
    let process = current_process();
    let resolver = SystemNameResolver::new();
    let loaded = load_policy(
        &standard_locator(),
        config_override.as_deref(),
        process,
        args.compositor_pid,
        &resolver,
    )?;

    let identity = build_identity(&args, process, &resolver);
    let rows = evaluate(&loaded.store, identity.as_ref().ok(), &args.interfaces);

    if args.yaml {
        let report = CheckReport {
            client: identity.ok(),
            decisions: rows,
        };
        print!("{}", serde_yaml::to_string(&report)?);
        return Ok(());
    }

    println!("{} {}", "Policy:".bold(), loaded.path.display());
    match &identity {
        Ok(identity) => println!("{} {}", "Client:".bold(), identity),
        Err(e) => println!(
            "{} {}",
            "Client:".bold(),
            format!("{}; every interface is hidden from it", e).yellow()
        ),
    }
    println!();

    let width = args.interfaces.iter().map(|i| i.len()).max().unwrap_or(0);
    for row in &rows {
        let mark = if row.allowed { "✓".green() } else { "✗".red() };
        let reason = match &row.decision {
            Some(decision) => decision.to_string(),
            None => "denied (unresolved identity)".to_string(),
        };
        println!("  {} {:width$}  {}", mark, row.interface, reason, width = width);
    }
    Ok(())
}

/// Fill the client identity from `args`, falling back to `process`.
pub fn build_identity(
    args: &CheckArgs,
    process: ProcessContext,
    resolver: &dyn NameResolver,
) -> Result<Identity, IdentityResolutionError> {
    let credentials = Credentials {
        pid: args.pid.unwrap_or(process.pid),
        uid: args.uid.unwrap_or(process.uid),
        gid: args.gid.unwrap_or(process.gid),
    };

    let user = match &args.user {
        Some(user) => user.clone(),
        None => resolver
            .user_name(credentials.uid)
            .ok_or(IdentityResolutionError::UnknownUser(credentials.uid))?,
    };
    let group = match &args.group {
        Some(group) => group.clone(),
        None => resolver
            .group_name(credentials.gid)
            .ok_or(IdentityResolutionError::UnknownGroup(credentials.gid))?,
    };

    Ok(Identity {
        pid: credentials.pid,
        uid: credentials.uid,
        gid: credentials.gid,
        user,
        group,
    })
}

/// Explain every interface. An unresolved identity is denied everything,
/// as the engine does for a live client.
pub fn evaluate(store: &PolicyStore, identity: Option<&Identity>, interfaces: &[String]) -> Vec<CheckRow> {
    interfaces
        .iter()
        .map(|interface| {
            let decision = identity.map(|identity| store.explain(identity, interface));
            CheckRow {
                interface: interface.clone(),
                allowed: decision.map(|d| d.allowed()).unwrap_or(false),
                decision,
            }
        })
        .collect()
}
