// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Policy model and per-client state. Nothing in here performs I/O or talks to
//! the host directly.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Directives, policy evaluation, client sessions, host seam

pub mod client_session;
pub mod config;
pub mod directive;
pub mod host;
pub mod identity;
pub mod policy;
pub mod variables;
