// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Store
//!
//! Holds the compiled directives of one display and answers
//! "may this identity see this interface?".
//!
//! ## Evaluation Order
//!
//! [`PolicyStore::explain`] applies, in this order:
//! 1. Self-exemption: the compositor's own pid sees everything.
//! 2. Directives from the **last declared to the first**. The first one that
//!    does not abstain (see [`Directive::decide`]) is the answer.
//! 3. The built-in [`DEFAULT_INTERFACES`] set.
//!
//! Declaration order is therefore significant: a later rule overrides an
//! earlier one, and `enable`/`disable` rules only speak for the interfaces they
//! name.
//!
//! ## Reload
//!
//! The directive list sits behind an `Arc` that is swapped as a whole.
//! An evaluation clones the `Arc` up front and keeps working on that snapshot
//! even if [`PolicyStore::replace`] runs meanwhile.

use parking_lot::RwLock;
use serde::Serialize;
use serde_yaml::Value;
use std::sync::Arc;

use super::config::{compile, CompileContext, ConfigError};
use super::directive::Directive;
use super::identity::{Identity, Pid};

/// Interfaces every client may bind unless a directive says otherwise.
///
/// Core protocol objects plus the stable extensions a regular toolkit client
/// needs to put a window on screen.
pub const DEFAULT_INTERFACES: &[&str] = &[
    "wl_compositor",
    "wl_subcompositor",
    "wl_shm",
    "wl_seat",
    "wl_output",
    "wl_data_device_manager",
    "xdg_wm_base",
    "wp_viewporter",
    "wp_presentation",
    "zwp_linux_dmabuf_v1",
    "wp_fractional_scale_manager_v1",
    "xdg_activation_v1",
    "zxdg_decoration_manager_v1",
    "zxdg_output_manager_v1",
    "wp_single_pixel_buffer_manager_v1",
    "zwp_text_input_manager_v3",
    "zwp_pointer_constraints_v1",
    "zwp_relative_pointer_manager_v1",
    "wp_cursor_shape_manager_v1",
];

pub fn is_default_interface(interface: &str) -> bool {
    DEFAULT_INTERFACES.contains(&interface)
}

/// Outcome of a policy evaluation together with what produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum Decision {
    /// The client is the compositor process itself.
    SelfExempt,
    /// Directive `index` (1-based) did not abstain.
    Directive { index: usize, allowed: bool },
    /// Every directive abstained.
    Default { allowed: bool },
}

impl Decision {
    pub fn allowed(&self) -> bool {
        match self {
            Decision::SelfExempt => true,
            Decision::Directive { allowed, .. } | Decision::Default { allowed } => *allowed,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.allowed() { "allowed" } else { "denied" };
        match self {
            Decision::SelfExempt => write!(f, "{} (compositor process)", verdict),
            Decision::Directive { index, .. } => write!(f, "{} by rule #{}", verdict, index),
            Decision::Default { .. } => write!(f, "{} by default", verdict),
        }
    }
}

/// Anything able to produce a fresh (uncached) decision.
pub trait DecisionSource {
    fn evaluate(&self, identity: &Identity, interface: &str) -> bool;
}

pub struct PolicyStore {
    directives: RwLock<Arc<[Directive]>>,
    own_pid: Pid,
}

impl PolicyStore {
    /// An empty store: only the defaults and self-exemption apply.
    pub fn new(own_pid: Pid) -> Self {
        Self {
            directives: RwLock::new(Arc::from(Vec::new())),
            own_pid,
        }
    }

    pub fn with_directives(own_pid: Pid, directives: Vec<Directive>) -> Self {
        let store = Self::new(own_pid);
        store.replace(directives);
        store
    }

    pub fn own_pid(&self) -> Pid {
        self.own_pid
    }

    /// Current directive list, in declaration order.
    pub fn directives(&self) -> Arc<[Directive]> {
        Arc::clone(&self.directives.read())
    }

    pub fn len(&self) -> usize {
        self.directives.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap in a new directive list as a whole.
    pub fn replace(&self, directives: Vec<Directive>) {
        *self.directives.write() = Arc::from(directives);
    }

    /// Compile `tree` and, only if that succeeds, replace the directive list.
    ///
    /// Returns the number of directives now in effect.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from compilation. The previous list is kept.
    pub fn load(&self, tree: &Value, ctx: &CompileContext<'_>) -> Result<usize, ConfigError> {
        let directives = compile(tree, ctx)?;
        let count = directives.len();
        self.replace(directives);
        Ok(count)
    }

    pub fn explain(&self, identity: &Identity, interface: &str) -> Decision {
        if identity.pid == self.own_pid {
            return Decision::SelfExempt;
        }

        let directives = self.directives();
        for directive in directives.iter().rev() {
            if let Some(allowed) = directive.decide(identity, interface) {
                return Decision::Directive {
                    index: directive.index,
                    allowed,
                };
            }
        }

        Decision::Default {
            allowed: is_default_interface(interface),
        }
    }
}

impl DecisionSource for PolicyStore {
    fn evaluate(&self, identity: &Identity, interface: &str) -> bool {
        self.explain(identity, interface).allowed()
    }
}
