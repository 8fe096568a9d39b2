// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Display sessions, the display registry and host wiring

pub mod bouncer;
pub mod display;
pub mod registry;

pub use bouncer::Bouncer;
pub use display::{DisplaySession, UnknownClientError};
pub use registry::{SessionRegistry, SharedDisplay};
