// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Client Session
//!
//! Per-connection state: the identity resolved when the client connected and
//! a memo of every decision made for it.
//!
//! ## Invariants
//!
//! - The identity never changes after construction.
//! - Cache entries are append-only. A later policy reload does **not**
//!   invalidate them; a connected client keeps the answers it already got.
//! - An unresolved identity denies everything and caches nothing.

use std::collections::HashMap;

use super::identity::Identity;
use super::policy::DecisionSource;

/// Result of [`ClientSession::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub allowed: bool,
    pub cached: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    identity: Option<Identity>,
    cache: HashMap<String, bool>,
}

impl ClientSession {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity,
            cache: HashMap::new(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.identity.is_some()
    }

    pub fn cached(&self, interface: &str) -> Option<bool> {
        self.cache.get(interface).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn check(&mut self, source: &impl DecisionSource, interface: &str) -> Check {
        if let Some(&allowed) = self.cache.get(interface) {
            return Check { allowed, cached: true };
        }

        let Some(identity) = &self.identity else {
            return Check {
                allowed: false,
                cached: false,
            };
        };

        let allowed = source.evaluate(identity, interface);
        self.cache.insert(interface.to_string(), allowed);
        Check {
            allowed,
            cached: false,
        }
    }
}
