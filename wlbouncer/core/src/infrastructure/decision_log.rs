// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision Audit Log
//!
//! Structured `tracing` records for every decision and lifecycle event.
//!
//! With `BOUNCER_DEBUG` set, decisions and lifecycle events are emitted at
//! `INFO`; otherwise at `TRACE`, so a production subscriber pays nothing for
//! the hot path. Anomalies (unknown handles, unresolvable identities, failed
//! loads) are always `WARN`.

use tracing::{info, trace, warn};

use crate::domain::client_session::Check;
use crate::domain::config::ConfigError;
use crate::domain::host::{ClientHandle, DisplayHandle};
use crate::domain::identity::{Identity, IdentityResolutionError};

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionLogger {
    verbose: bool,
}

impl DecisionLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn decision(&self, handle: DisplayHandle, client: ClientHandle, interface: &str, check: Check) {
        let verdict = if check.allowed { "enabled" } else { "disabled" };
        if self.verbose {
            info!(display = %handle, %client, interface, allowed = check.allowed, cached = check.cached, "{} {}", interface, verdict);
        } else {
            trace!(display = %handle, %client, interface, allowed = check.allowed, cached = check.cached, "{} {}", interface, verdict);
        }
    }

    pub fn chained_filter_denied(&self, handle: DisplayHandle, client: ClientHandle, interface: &str) {
        if self.verbose {
            info!(display = %handle, %client, interface, "{} disabled by chained filter", interface);
        } else {
            trace!(display = %handle, %client, interface, "{} disabled by chained filter", interface);
        }
    }

    pub fn client_connected(&self, handle: DisplayHandle, client: ClientHandle, identity: &Identity) {
        if self.verbose {
            info!(display = %handle, %client, pid = identity.pid, user = %identity.user, "{} from {} connected", identity.pid, identity.user);
        } else {
            trace!(display = %handle, %client, pid = identity.pid, user = %identity.user, "client connected");
        }
    }

    pub fn client_unresolved(&self, handle: DisplayHandle, client: ClientHandle, error: &IdentityResolutionError) {
        warn!(display = %handle, %client, "{}; every global will be hidden from this client", error);
    }

    pub fn client_destroyed(&self, handle: DisplayHandle, client: ClientHandle) {
        if self.verbose {
            info!(display = %handle, %client, "client {} destroyed", client);
        } else {
            trace!(display = %handle, %client, "client destroyed");
        }
    }

    pub fn display_event(&self, handle: DisplayHandle, event: &str) {
        if self.verbose {
            info!(display = %handle, "display {} {}", handle, event);
        } else {
            trace!(display = %handle, "display {}", event);
        }
    }

    pub fn unknown_client(&self, handle: DisplayHandle, client: ClientHandle) {
        warn!(display = %handle, %client, "unknown client {}", client);
    }

    pub fn policy_loaded(&self, handle: DisplayHandle, source: &str, directives: usize) {
        info!(display = %handle, directives, "Loaded {} policy directives from {}", directives, source);
    }

    pub fn policy_failed(&self, handle: DisplayHandle, error: &ConfigError) {
        warn!(display = %handle, "Policy not loaded: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(f: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_records_carry_the_display_field() {
        let log = DecisionLogger::new(false);
        let output = captured(|| {
            log.decision(
                DisplayHandle(0xd1),
                ClientHandle(0x2a),
                "wl_shm",
                Check { allowed: false, cached: false },
            );
            log.unknown_client(DisplayHandle(0xd1), ClientHandle(0x2b));
        });

        assert!(output.contains("display=0xd1"));
        assert!(output.contains("client=0x2a"));
        assert!(output.contains("wl_shm disabled"));
        assert!(output.contains("unknown client 0x2b"));
    }

    #[test]
    fn test_verbose_lifecycle_is_info() {
        let output = captured(|| {
            DecisionLogger::new(true).display_event(DisplayHandle(0xd1), "destroyed");
            DecisionLogger::new(false).display_event(DisplayHandle(0xd2), "created");
        });

        assert!(output.contains("INFO"));
        assert!(output.contains("display 0xd1 destroyed"));
        assert!(output.contains("TRACE"));
        assert!(output.contains("display=0xd2"));
    }
}
