// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # wlbouncer
//!
//! Decides, for every (client, global) pair of a Wayland display, whether the
//! global is advertised to the client. Decisions come from an administrator
//! policy keyed on the client's pid, uid, gid, user and group names.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Policy engine plus client/display session lifecycle
//!
//! | Layer | Contents |
//! |-------|----------|
//! | [`domain`] | directives, policy store, client sessions, host traits |
//! | [`application`] | display sessions, the process-wide registry, [`Bouncer`] |
//! | [`infrastructure`] | config discovery, env settings, libc lookups, decision log |

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bouncer::Bouncer;
pub use domain::*;
