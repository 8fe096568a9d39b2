// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Client Identity
//!
//! Value objects describing *who* is on the other end of a client connection.
//!
//! ```text
//! DisplayHost::client_credentials(client)  → Credentials { pid, uid, gid }
//!   └─ NameResolver::user_name(uid)         → user name
//!   └─ NameResolver::group_name(gid)        → group name
//!         └─ Identity (immutable for the life of the connection)
//! ```
//!
//! Credentials are whatever the transport reports (`SO_PEERCRED` on a Unix
//! socket). Nothing here authenticates them further.

use serde::Serialize;
use thiserror::Error;

pub type Pid = u32;
pub type Uid = u32;
pub type Gid = u32;

/// Raw peer credentials as reported by the host transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credentials {
    pub pid: Pid,
    pub uid: Uid,
    pub gid: Gid,
}

/// Fully resolved client identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub pid: Pid,
    pub uid: Uid,
    pub gid: Gid,
    pub user: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityResolutionError {
    #[error("failed to get user name of user with uid = {0}")]
    UnknownUser(Uid),

    #[error("failed to get group name of group with gid = {0}")]
    UnknownGroup(Gid),
}

/// Maps numeric ids to account names.
///
/// The system implementation lives in [`crate::infrastructure::system`];
/// tests use an in-memory table.
pub trait NameResolver: Send + Sync {
    fn user_name(&self, uid: Uid) -> Option<String>;
    fn group_name(&self, gid: Gid) -> Option<String>;
}

impl Identity {
    /// Resolve both account names for `credentials`.
    ///
    /// # Errors
    ///
    /// Returns the first lookup that failed. The user name is looked up first.
    pub fn resolve(
        credentials: Credentials,
        resolver: &dyn NameResolver,
    ) -> Result<Self, IdentityResolutionError> {
        let user = resolver
            .user_name(credentials.uid)
            .ok_or(IdentityResolutionError::UnknownUser(credentials.uid))?;
        let group = resolver
            .group_name(credentials.gid)
            .ok_or(IdentityResolutionError::UnknownGroup(credentials.gid))?;

        Ok(Self {
            pid: credentials.pid,
            uid: credentials.uid,
            gid: credentials.gid,
            user,
            group,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            pid: self.pid,
            uid: self.uid,
            gid: self.gid,
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pid {} ({}:{}, uid {} gid {})",
            self.pid, self.user, self.group, self.uid, self.gid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableResolver {
        users: HashMap<Uid, String>,
        groups: HashMap<Gid, String>,
    }

    impl NameResolver for TableResolver {
        fn user_name(&self, uid: Uid) -> Option<String> {
            self.users.get(&uid).cloned()
        }

        fn group_name(&self, gid: Gid) -> Option<String> {
            self.groups.get(&gid).cloned()
        }
    }

    fn resolver() -> TableResolver {
        TableResolver {
            users: HashMap::from([(1000, "alice".to_string())]),
            groups: HashMap::from([(100, "users".to_string())]),
        }
    }

    #[test]
    fn test_resolve_identity() {
        let creds = Credentials { pid: 42, uid: 1000, gid: 100 };
        let identity = Identity::resolve(creds, &resolver()).unwrap();

        assert_eq!(identity.user, "alice");
        assert_eq!(identity.group, "users");
        assert_eq!(identity.credentials(), creds);
    }

    #[test]
    fn test_resolve_unknown_user_fails_first() {
        let creds = Credentials { pid: 42, uid: 7, gid: 7 };
        assert_eq!(
            Identity::resolve(creds, &resolver()),
            Err(IdentityResolutionError::UnknownUser(7))
        );
    }

    #[test]
    fn test_resolve_unknown_group() {
        let creds = Credentials { pid: 42, uid: 1000, gid: 7 };
        assert_eq!(
            Identity::resolve(creds, &resolver()),
            Err(IdentityResolutionError::UnknownGroup(7))
        );
    }
}
