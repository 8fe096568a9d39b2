// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Symbolic condition variables.
//!
//! A literal such as `uid: $euid` is resolved exactly once, when the policy is
//! compiled, against a [`ProcessContext`] snapshot of the hosting process.
//! Compiled predicates only ever hold plain values.

use super::identity::{Gid, NameResolver, Pid, Uid};

/// Credentials of the process hosting the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessContext {
    pub pid: Pid,
    pub ppid: Pid,
    pub uid: Uid,
    pub euid: Uid,
    pub gid: Gid,
    pub egid: Gid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Pid,
    ParentPid,
    Uid,
    EffectiveUid,
    Gid,
    EffectiveGid,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Pid,
        Variable::ParentPid,
        Variable::Uid,
        Variable::EffectiveUid,
        Variable::Gid,
        Variable::EffectiveGid,
    ];

    /// Parse a `$name` literal. Returns `None` for unknown names.
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "$pid" => Some(Variable::Pid),
            "$ppid" => Some(Variable::ParentPid),
            "$uid" => Some(Variable::Uid),
            "$euid" => Some(Variable::EffectiveUid),
            "$gid" => Some(Variable::Gid),
            "$egid" => Some(Variable::EffectiveGid),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Pid => "$pid",
            Variable::ParentPid => "$ppid",
            Variable::Uid => "$uid",
            Variable::EffectiveUid => "$euid",
            Variable::Gid => "$gid",
            Variable::EffectiveGid => "$egid",
        }
    }

    pub fn numeric(&self, ctx: &ProcessContext) -> u32 {
        match self {
            Variable::Pid => ctx.pid,
            Variable::ParentPid => ctx.ppid,
            Variable::Uid => ctx.uid,
            Variable::EffectiveUid => ctx.euid,
            Variable::Gid => ctx.gid,
            Variable::EffectiveGid => ctx.egid,
        }
    }

    /// Resolve as a user name. `Err(())` means the variable does not denote a
    /// user; `Ok(None)` means the lookup failed.
    pub(crate) fn user_name(
        &self,
        ctx: &ProcessContext,
        resolver: &dyn NameResolver,
    ) -> Result<Option<String>, ()> {
        match self {
            Variable::Uid | Variable::EffectiveUid => Ok(resolver.user_name(self.numeric(ctx))),
            _ => Err(()),
        }
    }

    /// Resolve as a group name, see [`Variable::user_name`].
    pub(crate) fn group_name(
        &self,
        ctx: &ProcessContext,
        resolver: &dyn NameResolver,
    ) -> Result<Option<String>, ()> {
        match self {
            Variable::Gid | Variable::EffectiveGid => Ok(resolver.group_name(self.numeric(ctx))),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl NameResolver for Fixed {
        fn user_name(&self, uid: Uid) -> Option<String> {
            (uid == 0).then(|| "root".to_string())
        }

        fn group_name(&self, gid: Gid) -> Option<String> {
            (gid == 0).then(|| "wheel".to_string())
        }
    }

    fn ctx() -> ProcessContext {
        ProcessContext { pid: 50, ppid: 1, uid: 1000, euid: 0, gid: 100, egid: 0 }
    }

    #[test]
    fn test_parse_round_trips_names() {
        for var in Variable::ALL {
            assert_eq!(Variable::parse(var.name()), Some(var));
        }
        assert_eq!(Variable::parse("$home"), None);
        assert_eq!(Variable::parse("pid"), None);
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(Variable::Pid.numeric(&ctx()), 50);
        assert_eq!(Variable::ParentPid.numeric(&ctx()), 1);
        assert_eq!(Variable::EffectiveUid.numeric(&ctx()), 0);
    }

    #[test]
    fn test_name_resolution_is_field_specific() {
        assert_eq!(Variable::EffectiveUid.user_name(&ctx(), &Fixed), Ok(Some("root".to_string())));
        assert_eq!(Variable::Uid.user_name(&ctx(), &Fixed), Ok(None));
        assert_eq!(Variable::Pid.user_name(&ctx(), &Fixed), Err(()));
        assert_eq!(Variable::EffectiveGid.group_name(&ctx(), &Fixed), Ok(Some("wheel".to_string())));
        assert_eq!(Variable::Uid.group_name(&ctx(), &Fixed), Err(()));
    }
}
