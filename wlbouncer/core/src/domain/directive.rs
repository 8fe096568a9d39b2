// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Directive Value Object
//!
//! A `Directive` is one compiled policy rule: a set of interface names, an
//! enable/disable verb, a fallthrough/override modifier and a conjunction of
//! identity [`Predicate`]s.
//!
//! ## Verb Semantics
//!
//! | Config verb            | `enable` | `fallthrough` | `interfaces` |
//! |------------------------|----------|---------------|--------------|
//! | `enable: [a, b]`       | `true`   | `true`        | `{a, b}`     |
//! | `disable: [a, b]`      | `false`  | `true`        | `{a, b}`     |
//! | `enable-only: [a, b]`  | `true`   | `false`       | `{a, b}`     |
//! | `disable-only: [a, b]` | `false`  | `false`       | `{a, b}`     |
//! | `enable: all`          | `false`  | `false`       | `{}`         |
//! | `disable: all`         | `true`   | `false`       | `{}`         |
//!
//! The `all` rows rely on [`Directive::decide`] returning `enable == mentioned`:
//! nothing is ever mentioned by an empty set, so the inverted verb yields the
//! intended answer for every interface.

use std::collections::HashSet;
use std::fmt;

use super::identity::{Gid, Identity, Pid, Uid};

/// Single literal or set of literals a field is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<T: Eq + std::hash::Hash> {
    Equals(T),
    OneOf(HashSet<T>),
}

impl<T: Eq + std::hash::Hash> Match<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Match::Equals(expected) => expected == value,
            Match::OneOf(expected) => expected.contains(value),
        }
    }
}

impl<T: Eq + std::hash::Hash + fmt::Display> fmt::Display for Match<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Match::Equals(value) => write!(f, "{}", value),
            Match::OneOf(values) => {
                let mut values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                values.sort();
                write!(f, "[{}]", values.join(", "))
            }
        }
    }
}

/// Identity condition. All symbolic variables are already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Pid(Match<Pid>),
    Uid(Match<Uid>),
    Gid(Match<Gid>),
    User(Match<String>),
    Group(Match<String>),
}

impl Predicate {
    pub fn matches(&self, identity: &Identity) -> bool {
        match self {
            Predicate::Pid(m) => m.matches(&identity.pid),
            Predicate::Uid(m) => m.matches(&identity.uid),
            Predicate::Gid(m) => m.matches(&identity.gid),
            Predicate::User(m) => m.matches(&identity.user),
            Predicate::Group(m) => m.matches(&identity.group),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Pid(m) => write!(f, "pid {}", m),
            Predicate::Uid(m) => write!(f, "uid {}", m),
            Predicate::Gid(m) => write!(f, "gid {}", m),
            Predicate::User(m) => write!(f, "user {}", m),
            Predicate::Group(m) => write!(f, "group {}", m),
        }
    }
}

/// One compiled policy rule.
///
/// Built once by [`crate::domain::config::compile`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// 1-based position in the `policy` sequence.
    pub index: usize,
    pub interfaces: HashSet<String>,
    pub enable: bool,
    /// `true` for `enable`/`disable`: only has an opinion on interfaces it names.
    pub fallthrough: bool,
    pub conditions: Vec<Predicate>,
}

impl Directive {
    /// Returns `None` when this directive abstains for `(identity, interface)`.
    pub fn decide(&self, identity: &Identity, interface: &str) -> Option<bool> {
        let mentioned = self.interfaces.contains(interface);
        if self.fallthrough && !mentioned {
            return None;
        }
        if !self.conditions.iter().all(|c| c.matches(identity)) {
            return None;
        }
        Some(self.enable == mentioned)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match (self.enable, self.fallthrough) {
            (true, true) => "enable",
            (false, true) => "disable",
            (true, false) => "enable-only",
            (false, false) => "disable-only",
        };

        if self.interfaces.is_empty() && !self.fallthrough {
            // `all` directives are stored with the verb inverted.
            let verb = if self.enable { "disable" } else { "enable" };
            write!(f, "#{} {} all", self.index, verb)?;
        } else {
            let mut names: Vec<&str> = self.interfaces.iter().map(String::as_str).collect();
            names.sort_unstable();
            write!(f, "#{} {} [{}]", self.index, verb, names.join(", "))?;
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            let joiner = if i == 0 { " if" } else { " and" };
            write!(f, "{} {}", joiner, condition)?;
        }
        Ok(())
    }
}
