// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Display Session
//!
//! One [`DisplaySession`] exists per Wayland display the engine is attached
//! to. It owns the display's [`PolicyStore`], the table of connected clients
//! and the optional external filter chained in front of the policy.
//!
//! ## Filtering
//!
//! ```text
//! filter(client, interface)
//!   ├─ chained filter says no   → hidden
//!   ├─ client not in the table  → hidden (UnknownClientError, logged)
//!   └─ ClientSession::check     → cached or freshly evaluated answer
//! ```
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Per-display state and the filter entry point

use serde_yaml::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::client_session::{Check, ClientSession};
use crate::domain::config::{CompileContext, ConfigError};
use crate::domain::host::{ClientHandle, DisplayHandle, GlobalFilter};
use crate::domain::identity::{Identity, IdentityResolutionError};
use crate::domain::policy::PolicyStore;
use crate::infrastructure::decision_log::DecisionLogger;

/// A filter call arrived for a client this display never saw connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client {client} is not tracked on display {display}")]
pub struct UnknownClientError {
    pub display: DisplayHandle,
    pub client: ClientHandle,
}

pub struct DisplaySession {
    display: DisplayHandle,
    policy: PolicyStore,
    clients: HashMap<ClientHandle, ClientSession>,
    chained_filter: Option<Arc<dyn GlobalFilter>>,
    log: DecisionLogger,
}

impl DisplaySession {
    pub fn new(display: DisplayHandle, policy: PolicyStore, log: DecisionLogger) -> Self {
        Self {
            display,
            policy,
            clients: HashMap::new(),
            chained_filter: None,
            log,
        }
    }

    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    pub fn client(&self, client: ClientHandle) -> Option<&ClientSession> {
        self.clients.get(&client)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn chained_filter(&self) -> Option<Arc<dyn GlobalFilter>> {
        self.chained_filter.clone()
    }

    /// Install (or with `None`, remove) the filter consulted before the policy.
    pub fn set_chained_filter(&mut self, filter: Option<Arc<dyn GlobalFilter>>) {
        self.chained_filter = filter;
    }

    /// Start tracking `client`.
    ///
    /// A failed identity lookup still creates a session; that session hides
    /// every global. A second notification for a live handle replaces the old
    /// session and its cache.
    pub fn on_client_created(
        &mut self,
        client: ClientHandle,
        identity: Result<Identity, IdentityResolutionError>,
    ) {
        let identity = match identity {
            Ok(identity) => {
                self.log.client_connected(self.display, client, &identity);
                Some(identity)
            }
            Err(e) => {
                self.log.client_unresolved(self.display, client, &e);
                None
            }
        };

        if self.clients.insert(client, ClientSession::new(identity)).is_some() {
            tracing::warn!(
                display = %self.display,
                %client,
                "client {} created twice; previous session discarded",
                client
            );
        }
    }

    /// Stop tracking `client`. Returns `false` if it was never tracked.
    pub fn on_client_destroyed(&mut self, client: ClientHandle) -> bool {
        if self.clients.remove(&client).is_some() {
            self.log.client_destroyed(self.display, client);
            true
        } else {
            self.log.unknown_client(self.display, client);
            false
        }
    }

    /// Full filter decision: chained filter first, then the client's session.
    pub fn filter(&mut self, client: ClientHandle, interface: &str) -> bool {
        if let Some(chained) = &self.chained_filter {
            if !chained.allows(client, interface) {
                self.log.chained_filter_denied(self.display, client, interface);
                return false;
            }
        }
        self.decide(client, interface)
    }

    /// Policy half of [`filter`](Self::filter), without the chained filter.
    /// Unknown clients are denied.
    pub fn decide(&mut self, client: ClientHandle, interface: &str) -> bool {
        match self.try_check(client, interface) {
            Ok(check) => {
                self.log.decision(self.display, client, interface, check);
                check.allowed
            }
            Err(e) => {
                tracing::warn!(interface, "{}; {} hidden", e, interface);
                false
            }
        }
    }

    pub fn try_check(
        &mut self,
        client: ClientHandle,
        interface: &str,
    ) -> Result<Check, UnknownClientError> {
        let session = self.clients.get_mut(&client).ok_or(UnknownClientError {
            display: self.display,
            client,
        })?;
        Ok(session.check(&self.policy, interface))
    }

    /// Compile `tree` and swap it in as this display's policy.
    ///
    /// Live client caches are kept: a client that already received an answer
    /// for an interface keeps it until it reconnects.
    pub fn reload(
        &self,
        source: &str,
        tree: &Value,
        ctx: &CompileContext<'_>,
    ) -> Result<usize, ConfigError> {
        match self.policy.load(tree, ctx) {
            Ok(count) => {
                self.log.policy_loaded(self.display, source, count);
                Ok(count)
            }
            Err(e) => {
                self.log.policy_failed(self.display, &e);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for DisplaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySession")
            .field("display", &self.display)
            .field("directives", &self.policy.len())
            .field("clients", &self.clients.len())
            .field("chained_filter", &self.chained_filter.is_some())
            .finish()
    }
}
