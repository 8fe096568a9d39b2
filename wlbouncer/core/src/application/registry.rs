// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Display Registry
//!
//! Process-wide map from display handle to its [`DisplaySession`].
//!
//! The registry lock only guards the map itself; callers clone the
//! [`SharedDisplay`] out and lock that, so evaluating one display never
//! blocks lookups for another.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** In-memory display session repository

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::display::DisplaySession;
use crate::domain::host::DisplayHandle;

pub type SharedDisplay = Arc<Mutex<DisplaySession>>;

#[derive(Default)]
pub struct SessionRegistry {
    displays: Mutex<HashMap<DisplayHandle, SharedDisplay>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` under its display handle.
    ///
    /// A stale entry for the same handle (the host reused the address of a
    /// display that was never reported destroyed) is replaced.
    pub fn create(&self, session: DisplaySession) -> SharedDisplay {
        let handle = session.display();
        let shared = Arc::new(Mutex::new(session));
        if self
            .displays
            .lock()
            .insert(handle, Arc::clone(&shared))
            .is_some()
        {
            warn!(display = %handle, "display {} registered twice; stale session replaced", handle);
        } else {
            debug!(display = %handle, "Registered display session");
        }
        shared
    }

    /// Drop the session of `handle`. Returns `false` if none was registered.
    pub fn destroy(&self, handle: DisplayHandle) -> bool {
        let removed = self.displays.lock().remove(&handle).is_some();
        if removed {
            debug!(display = %handle, "Removed display session");
        }
        removed
    }

    pub fn lookup(&self, display: DisplayHandle) -> Option<SharedDisplay> {
        self.displays.lock().get(&display).cloned()
    }

    pub fn displays(&self) -> Vec<DisplayHandle> {
        self.displays.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.displays.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::PolicyStore;
    use crate::infrastructure::decision_log::DecisionLogger;

    fn session(display: usize) -> DisplaySession {
        DisplaySession::new(
            DisplayHandle(display),
            PolicyStore::new(1),
            DecisionLogger::default(),
        )
    }

    #[test]
    fn test_create_lookup_destroy() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        let shared = registry.create(session(0x10));
        let found = registry.lookup(DisplayHandle(0x10)).unwrap();
        assert!(Arc::ptr_eq(&shared, &found));
        assert_eq!(registry.len(), 1);

        assert!(registry.destroy(DisplayHandle(0x10)));
        assert!(!registry.destroy(DisplayHandle(0x10)));
        assert!(registry.lookup(DisplayHandle(0x10)).is_none());
    }

    #[test]
    fn test_create_replaces_stale_entry() {
        let registry = SessionRegistry::new();
        let first = registry.create(session(0x10));
        let second = registry.create(session(0x10));

        assert_eq!(registry.len(), 1);
        let found = registry.lookup(DisplayHandle(0x10)).unwrap();
        assert!(Arc::ptr_eq(&second, &found));
        assert!(!Arc::ptr_eq(&first, &found));
    }

    #[test]
    fn test_displays_are_independent() {
        let registry = SessionRegistry::new();
        registry.create(session(1));
        registry.create(session(2));

        let one = registry.lookup(DisplayHandle(1)).unwrap();
        let _held = one.lock();
        // Holding one display's lock leaves the map and other displays usable.
        assert!(registry.lookup(DisplayHandle(2)).unwrap().try_lock().is_some());

        let mut handles = registry.displays();
        handles.sort_by_key(|d| d.0);
        assert_eq!(handles, vec![DisplayHandle(1), DisplayHandle(2)]);
    }
}
