// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Host Compositor Seam
//!
//! Everything the engine needs from, and offers to, the display server it is
//! embedded in. Concrete bindings (libwayland-server, a test fake) implement
//! [`DisplayHost`]; the engine hands back [`LifecycleListener`]s and a
//! [`GlobalFilter`].
//!
//! ```text
//! host                          engine
//! ────                          ──────
//! display created      ──────▶  LifecycleListener<DisplayHandle>::on_create
//! client connected     ──────▶  LifecycleListener<ClientHandle>::on_create
//! global advertised?   ──────▶  GlobalFilter::allows(client, interface)
//! client disconnected  ──────▶  LifecycleListener<ClientHandle>::on_destroy
//! display destroyed    ──────▶  LifecycleListener<DisplayHandle>::on_destroy
//! ```

use std::sync::Arc;

use super::identity::Credentials;

/// Opaque host handle of a display instance (a `wl_display *`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub usize);

/// Opaque host handle of a connected client (a `wl_client *`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(pub usize);

impl std::fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl std::fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Decides whether a global is advertised to a client.
///
/// Implemented by the engine's own filter and by any external filter chained
/// in front of it. Closures work too:
///
/// ```
/// use std::sync::Arc;
/// use wlbouncer_core::domain::host::{ClientHandle, GlobalFilter};
///
/// let no_screencopy: Arc<dyn GlobalFilter> =
///     Arc::new(|_client: ClientHandle, interface: &str| interface != "zwlr_screencopy_manager_v1");
/// assert!(!no_screencopy.allows(ClientHandle(1), "zwlr_screencopy_manager_v1"));
/// ```
pub trait GlobalFilter: Send + Sync {
    fn allows(&self, client: ClientHandle, interface: &str) -> bool;
}

impl<F> GlobalFilter for F
where
    F: Fn(ClientHandle, &str) -> bool + Send + Sync,
{
    fn allows(&self, client: ClientHandle, interface: &str) -> bool {
        self(client, interface)
    }
}

/// Creation/destruction notifications for objects identified by `H`.
pub trait LifecycleListener<H>: Send + Sync {
    fn on_create(&self, handle: H);
    fn on_destroy(&self, handle: H);
}

/// The display server the engine is attached to.
pub trait DisplayHost: Send + Sync {
    /// Peer credentials of a connected client.
    fn client_credentials(&self, client: ClientHandle) -> Credentials;

    /// Deliver client connect/disconnect events for `display` to `listener`.
    fn add_client_listener(
        &self,
        display: DisplayHandle,
        listener: Arc<dyn LifecycleListener<ClientHandle>>,
    );

    /// Deliver the destruction of `display` to `listener`.
    fn add_display_listener(
        &self,
        display: DisplayHandle,
        listener: Arc<dyn LifecycleListener<DisplayHandle>>,
    );

    /// Install `filter` as the only global filter of `display`.
    fn set_global_filter(&self, display: DisplayHandle, filter: Arc<dyn GlobalFilter>);
}
