// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** File system, environment, libc and logging adapters

pub mod config_loader;
pub mod decision_log;
pub mod settings;
pub mod system;

pub use config_loader::ConfigLocator;
pub use decision_log::DecisionLogger;
pub use settings::Settings;
pub use system::SystemNameResolver;
