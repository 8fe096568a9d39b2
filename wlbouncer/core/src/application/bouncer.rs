// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Bouncer
//!
//! Entry point a compositor binding calls once per display. It loads the
//! policy, registers the [`DisplaySession`] and connects it to the host:
//!
//! - a client listener that resolves each new client's identity,
//! - a display listener that tears the session down with its display,
//! - a [`GlobalFilter`] that the host consults for every global.
//!
//! The callbacks handed to the host only hold [`Weak`] references. A display
//! that was destroyed is released even if the host keeps calling into a
//! stale callback; such calls deny.
//!
//! A missing or broken policy file is never fatal: the display starts with
//! zero directives, so only the default interface set is advertised.

use parking_lot::Mutex;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use super::display::DisplaySession;
use super::registry::{SessionRegistry, SharedDisplay};
use crate::domain::config::CompileContext;
use crate::domain::host::{ClientHandle, DisplayHandle, DisplayHost, GlobalFilter, LifecycleListener};
use crate::domain::identity::{Identity, NameResolver};
use crate::domain::policy::PolicyStore;
use crate::domain::variables::ProcessContext;
use crate::infrastructure::config_loader::ConfigLocator;
use crate::infrastructure::decision_log::DecisionLogger;
use crate::infrastructure::settings::Settings;
use crate::infrastructure::system::current_process;

pub struct Bouncer {
    host: Arc<dyn DisplayHost>,
    resolver: Arc<dyn NameResolver>,
    registry: Arc<SessionRegistry>,
    locator: ConfigLocator,
    process: ProcessContext,
    log: DecisionLogger,
}

impl Bouncer {
    pub fn new(host: Arc<dyn DisplayHost>, resolver: Arc<dyn NameResolver>, settings: Settings) -> Self {
        Self {
            host,
            resolver,
            registry: Arc::new(SessionRegistry::new()),
            locator: ConfigLocator::standard(&settings),
            process: current_process(),
            log: DecisionLogger::new(settings.debug),
        }
    }

    /// Use `process` for self-exemption and `$variable` resolution instead of
    /// the running process.
    pub fn with_process(mut self, process: ProcessContext) -> Self {
        self.process = process;
        self
    }

    /// Replace the policy file search path.
    pub fn with_locator(mut self, locator: ConfigLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn process(&self) -> ProcessContext {
        self.process
    }

    /// Attach the engine to `display`.
    ///
    /// `config_file` bypasses discovery. `external_filter`, when given, is
    /// consulted before the policy and can only narrow what is advertised.
    pub fn init_for_display(
        &self,
        display: DisplayHandle,
        config_file: Option<PathBuf>,
        external_filter: Option<Arc<dyn GlobalFilter>>,
    ) -> SharedDisplay {
        let mut session = DisplaySession::new(display, PolicyStore::new(self.process.pid), self.log);
        self.load_into(&session, config_file.as_deref());
        session.set_chained_filter(external_filter);

        let shared = self.registry.create(session);

        self.host.add_client_listener(
            display,
            Arc::new(ClientTracker {
                display,
                session: Arc::downgrade(&shared),
                host: Arc::downgrade(&self.host),
                resolver: Arc::clone(&self.resolver),
            }),
        );
        self.host.add_display_listener(
            display,
            Arc::new(DisplayTracker {
                registry: Arc::downgrade(&self.registry),
                log: self.log,
            }),
        );
        self.host.set_global_filter(
            display,
            Arc::new(DisplayFilter {
                display,
                session: Arc::downgrade(&shared),
                log: self.log,
            }),
        );

        self.log.display_event(display, "initialized");
        shared
    }

    /// Chain `filter` in front of the policy of an already initialized display.
    /// Returns `false` if `handle` is unknown.
    pub fn set_chained_filter(&self, handle: DisplayHandle, filter: Option<Arc<dyn GlobalFilter>>) -> bool {
        match self.registry.lookup(handle) {
            Some(shared) => {
                shared.lock().set_chained_filter(filter);
                true
            }
            None => {
                warn!(display = %handle, "Cannot chain a filter to unknown display {}", handle);
                false
            }
        }
    }

    /// Re-read the policy of display `handle`. On failure the current directives stay.
    pub fn reload(&self, handle: DisplayHandle, config_file: Option<PathBuf>) -> bool {
        match self.registry.lookup(handle) {
            Some(shared) => {
                let Some((path, tree)) = self.read_policy(handle, config_file.as_deref()) else {
                    return false;
                };
                let ctx = self.compile_context();
                let session = shared.lock();
                session.reload(&path.display().to_string(), &tree, &ctx).is_ok()
            }
            None => {
                warn!(display = %handle, "Cannot reload policy of unknown display {}", handle);
                false
            }
        }
    }

    /// Listener for hosts that announce displays as they appear: creation
    /// runs [`init_for_display`](Self::init_for_display) with discovery and
    /// no chained filter, destruction drops the session.
    pub fn display_tracker(self: &Arc<Self>) -> Arc<dyn LifecycleListener<DisplayHandle>> {
        Arc::new(DisplayAnnouncer {
            bouncer: Arc::downgrade(self),
        })
    }

    fn load_into(&self, session: &DisplaySession, config_file: Option<&Path>) -> bool {
        let Some((path, tree)) = self.read_policy(session.display(), config_file) else {
            return false;
        };
        session
            .reload(&path.display().to_string(), &tree, &self.compile_context())
            .is_ok()
    }

    fn read_policy(&self, display: DisplayHandle, config_file: Option<&Path>) -> Option<(PathBuf, Value)> {
        match self.locator.load(config_file) {
            Ok(found) => Some(found),
            Err(e) => {
                self.log.policy_failed(display, &e);
                None
            }
        }
    }

    fn compile_context(&self) -> CompileContext<'_> {
        CompileContext {
            process: self.process,
            resolver: self.resolver.as_ref(),
        }
    }
}

/// Resolves and tracks the clients of one display.
struct ClientTracker {
    display: DisplayHandle,
    session: Weak<Mutex<DisplaySession>>,
    host: Weak<dyn DisplayHost>,
    resolver: Arc<dyn NameResolver>,
}

impl LifecycleListener<ClientHandle> for ClientTracker {
    fn on_create(&self, client: ClientHandle) {
        let (Some(session), Some(host)) = (self.session.upgrade(), self.host.upgrade()) else {
            debug!(display = %self.display, %client, "Client created on a released display");
            return;
        };
        // Host and resolver calls happen before the display lock is taken.
        let identity = Identity::resolve(host.client_credentials(client), self.resolver.as_ref());
        session.lock().on_client_created(client, identity);
    }

    fn on_destroy(&self, client: ClientHandle) {
        match self.session.upgrade() {
            Some(session) => {
                session.lock().on_client_destroyed(client);
            }
            None => debug!(display = %self.display, %client, "Client destroyed on a released display"),
        }
    }
}

/// Drops the session when its display goes away.
struct DisplayTracker {
    registry: Weak<SessionRegistry>,
    log: DecisionLogger,
}

impl LifecycleListener<DisplayHandle> for DisplayTracker {
    fn on_create(&self, _display: DisplayHandle) {}

    fn on_destroy(&self, handle: DisplayHandle) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if registry.destroy(handle) {
            self.log.display_event(handle, "destroyed");
        } else {
            debug!(display = %handle, "Display already released");
        }
    }
}

/// Listener returned by [`Bouncer::display_tracker`].
struct DisplayAnnouncer {
    bouncer: Weak<Bouncer>,
}

impl LifecycleListener<DisplayHandle> for DisplayAnnouncer {
    fn on_create(&self, display: DisplayHandle) {
        if let Some(bouncer) = self.bouncer.upgrade() {
            bouncer.init_for_display(display, None, None);
        }
    }

    fn on_destroy(&self, display: DisplayHandle) {
        if let Some(bouncer) = self.bouncer.upgrade() {
            if bouncer.registry.destroy(display) {
                bouncer.log.display_event(display, "destroyed");
            }
        }
    }
}

/// The global filter installed on the host for one display.
struct DisplayFilter {
    display: DisplayHandle,
    session: Weak<Mutex<DisplaySession>>,
    log: DecisionLogger,
}

impl GlobalFilter for DisplayFilter {
    fn allows(&self, client: ClientHandle, interface: &str) -> bool {
        let Some(session) = self.session.upgrade() else {
            warn!(display = %self.display, %client, interface, "Filter called on a released display; {} hidden", interface);
            return false;
        };

        // The chained filter is external code: call it without the display lock.
        let chained = session.lock().chained_filter();
        if let Some(chained) = chained {
            if !chained.allows(client, interface) {
                self.log.chained_filter_denied(self.display, client, interface);
                return false;
            }
        }
        // Bound first so the guard drops before `session`.
        let allowed = session.lock().decide(client, interface);
        allowed
    }
}
