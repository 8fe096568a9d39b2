// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Configuration Compiler
//!
//! Translates the generic YAML tree of a policy file into an ordered list of
//! [`Directive`]s. Compilation is all-or-nothing: the first error aborts and no
//! directive is produced.
//!
//! # Policy Format
//!
//! ```yaml
//! version: 0
//! policy:
//!   # Hide screencopy from everyone...
//!   - disable: zwlr_screencopy_manager_v1
//!   # ...except the user running the compositor.
//!   - enable: [zwlr_screencopy_manager_v1, zwlr_layer_shell_v1]
//!     user: $euid
//!   # Sandboxed helpers only see what they strictly need.
//!   - enable-only: [wl_compositor, wl_shm]
//!     groups: [sandbox, flatpak]
//! ```
//!
//! Each rule carries exactly one verb (`enable`, `disable`, `enable-only`,
//! `disable-only`) and any number of identity conditions, each written either
//! in singular (`uid: 0`) or plural (`uids: [0, 1000]`) form.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use super::directive::{Directive, Match, Predicate};
use super::identity::NameResolver;
use super::variables::{ProcessContext, Variable};

/// The only policy schema version understood.
pub const SUPPORTED_VERSION: u64 = 0;

/// Sentinel verb value meaning "every interface".
pub const ALL_SENTINEL: &str = "all";

const VERBS: [&str; 4] = ["enable", "disable", "enable-only", "disable-only"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule #{rule}: none of enable, disable, enable-only or disable-only is set")]
    MissingVerb { rule: usize },

    #[error("rule #{rule}: only one verb is allowed, found {}", .verbs.join(", "))]
    ConflictingVerbs { rule: usize, verbs: Vec<String> },

    #[error("rule #{rule}: 'all' can not be used inside a list")]
    InvalidAllUsage { rule: usize },

    #[error("rule #{rule}: '{singular}' and '{plural}' can not both be set")]
    ConflictingKeys {
        rule: usize,
        singular: &'static str,
        plural: &'static str,
    },

    #[error("rule #{rule}: unknown key '{key}'")]
    UnknownKey { rule: usize, key: String },

    #[error("rule #{rule}: invalid value for '{key}': {reason}")]
    InvalidLiteral {
        rule: usize,
        key: String,
        reason: String,
    },

    #[error("rule #{rule}: unknown variable '{name}'")]
    UnknownVariable { rule: usize, name: String },

    #[error("rule #{rule}: variable '{variable}' can not be used for '{key}'")]
    InvalidVariable {
        rule: usize,
        key: String,
        variable: Variable,
    },

    #[error("rule #{rule}: variable '{variable}' has no resolvable name")]
    UnresolvableVariable { rule: usize, variable: Variable },

    #[error("unsupported policy version {found}, expected 0")]
    UnsupportedVersion { found: String },

    #[error("no policy file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed policy: {0}")]
    Malformed(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top level of the policy document.
#[derive(Debug, Deserialize)]
struct PolicyDocument {
    version: Option<Value>,
    #[serde(default)]
    policy: Option<Value>,
}

/// Everything symbolic variables may be resolved against.
pub struct CompileContext<'a> {
    pub process: ProcessContext,
    pub resolver: &'a dyn NameResolver,
}

/// Compile a parsed policy tree into directives, in declaration order.
///
/// # Errors
///
/// Any structural or semantic problem in the tree. See [`ConfigError`].
pub fn compile(tree: &Value, ctx: &CompileContext<'_>) -> Result<Vec<Directive>, ConfigError> {
    if !tree.is_mapping() {
        return Err(ConfigError::Malformed(format!(
            "policy file must be a mapping, got {}",
            kind_of(tree)
        )));
    }
    let document: PolicyDocument =
        serde_yaml::from_value(tree.clone()).map_err(|e| ConfigError::Malformed(e.to_string()))?;

    check_version(document.version.as_ref())?;

    let rules = match document.policy {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(rules)) => rules,
        Some(other) => {
            return Err(ConfigError::Malformed(format!(
                "'policy' must be a sequence, got {}",
                kind_of(&other)
            )))
        }
    };

    rules
        .iter()
        .enumerate()
        .map(|(i, node)| compile_rule(i + 1, node, ctx))
        .collect()
}

fn check_version(version: Option<&Value>) -> Result<(), ConfigError> {
    match version {
        Some(Value::Number(n)) if n.as_u64() == Some(SUPPORTED_VERSION) => Ok(()),
        Some(other) => Err(ConfigError::UnsupportedVersion {
            found: scalar_text(other).unwrap_or_else(|| kind_of(other).to_string()),
        }),
        None => Err(ConfigError::UnsupportedVersion {
            found: "(missing)".to_string(),
        }),
    }
}

fn compile_rule(rule: usize, node: &Value, ctx: &CompileContext<'_>) -> Result<Directive, ConfigError> {
    let map = node.as_mapping().ok_or_else(|| {
        ConfigError::Malformed(format!("rule #{} must be a mapping, got {}", rule, kind_of(node)))
    })?;

    for key in map.keys() {
        let key = key_str(rule, key)?;
        if !VERBS.contains(&key) && !CONDITION_KEYS.iter().any(|c| c.singular == key || c.plural == key) {
            return Err(ConfigError::UnknownKey {
                rule,
                key: key.to_string(),
            });
        }
    }

    let present: Vec<&str> = VERBS.iter().copied().filter(|v| map.contains_key(*v)).collect();
    let verb = match present.as_slice() {
        [] => return Err(ConfigError::MissingVerb { rule }),
        [verb] => *verb,
        _ => {
            return Err(ConfigError::ConflictingVerbs {
                rule,
                verbs: present.iter().map(|v| v.to_string()).collect(),
            })
        }
    };

    let (mut enable, mut fallthrough) = match verb {
        "enable" => (true, true),
        "disable" => (false, true),
        "enable-only" => (true, false),
        _ => (false, false),
    };

    let interfaces = match parse_targets(rule, verb, &map[verb])? {
        Targets::All => {
            enable = !enable;
            fallthrough = false;
            HashSet::new()
        }
        Targets::Named(names) => names,
    };

    let mut conditions = Vec::new();
    for key in CONDITION_KEYS {
        if let Some(predicate) = key.compile(rule, map, ctx)? {
            conditions.push(predicate);
        }
    }

    Ok(Directive {
        index: rule,
        interfaces,
        enable,
        fallthrough,
        conditions,
    })
}

enum Targets {
    All,
    Named(HashSet<String>),
}

fn parse_targets(rule: usize, verb: &str, value: &Value) -> Result<Targets, ConfigError> {
    match value {
        Value::String(s) if s == ALL_SENTINEL => Ok(Targets::All),
        Value::String(s) => Ok(Targets::Named(HashSet::from([s.clone()]))),
        Value::Sequence(items) => {
            let mut names = HashSet::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) if s == ALL_SENTINEL => {
                        return Err(ConfigError::InvalidAllUsage { rule })
                    }
                    Value::String(s) => {
                        names.insert(s.clone());
                    }
                    other => {
                        return Err(ConfigError::InvalidLiteral {
                            rule,
                            key: verb.to_string(),
                            reason: format!("expected an interface name, got {}", kind_of(other)),
                        })
                    }
                }
            }
            Ok(Targets::Named(names))
        }
        other => Err(ConfigError::InvalidLiteral {
            rule,
            key: verb.to_string(),
            reason: format!(
                "expected '{}', an interface name or a list of names, got {}",
                ALL_SENTINEL,
                kind_of(other)
            ),
        }),
    }
}

#[derive(Clone, Copy)]
enum Field {
    Pid,
    Uid,
    Gid,
    User,
    Group,
}

struct ConditionKey {
    field: Field,
    singular: &'static str,
    plural: &'static str,
}

const CONDITION_KEYS: [ConditionKey; 5] = [
    ConditionKey { field: Field::Pid, singular: "pid", plural: "pids" },
    ConditionKey { field: Field::Uid, singular: "uid", plural: "uids" },
    ConditionKey { field: Field::Gid, singular: "gid", plural: "gids" },
    ConditionKey { field: Field::User, singular: "user", plural: "users" },
    ConditionKey { field: Field::Group, singular: "group", plural: "groups" },
];

impl ConditionKey {
    fn compile(
        &self,
        rule: usize,
        map: &Mapping,
        ctx: &CompileContext<'_>,
    ) -> Result<Option<Predicate>, ConfigError> {
        let singular = map.get(self.singular);
        let plural = map.get(self.plural);

        match (singular, plural) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingKeys {
                rule,
                singular: self.singular,
                plural: self.plural,
            }),
            (None, None) => Ok(None),
            (Some(value), None) => {
                let predicate = match self.field {
                    Field::Pid => Predicate::Pid(Match::Equals(self.number(rule, self.singular, value, ctx)?)),
                    Field::Uid => Predicate::Uid(Match::Equals(self.number(rule, self.singular, value, ctx)?)),
                    Field::Gid => Predicate::Gid(Match::Equals(self.number(rule, self.singular, value, ctx)?)),
                    Field::User => Predicate::User(Match::Equals(self.name(rule, self.singular, value, ctx)?)),
                    Field::Group => Predicate::Group(Match::Equals(self.name(rule, self.singular, value, ctx)?)),
                };
                Ok(Some(predicate))
            }
            (None, Some(value)) => {
                let items = value.as_sequence().ok_or_else(|| ConfigError::InvalidLiteral {
                    rule,
                    key: self.plural.to_string(),
                    reason: format!("expected a list, got {}", kind_of(value)),
                })?;
                let predicate = match self.field {
                    Field::Pid => Predicate::Pid(Match::OneOf(self.numbers(rule, items, ctx)?)),
                    Field::Uid => Predicate::Uid(Match::OneOf(self.numbers(rule, items, ctx)?)),
                    Field::Gid => Predicate::Gid(Match::OneOf(self.numbers(rule, items, ctx)?)),
                    Field::User => Predicate::User(Match::OneOf(self.names(rule, items, ctx)?)),
                    Field::Group => Predicate::Group(Match::OneOf(self.names(rule, items, ctx)?)),
                };
                Ok(Some(predicate))
            }
        }
    }

    fn numbers(&self, rule: usize, items: &[Value], ctx: &CompileContext<'_>) -> Result<HashSet<u32>, ConfigError> {
        items.iter().map(|v| self.number(rule, self.plural, v, ctx)).collect()
    }

    fn names(&self, rule: usize, items: &[Value], ctx: &CompileContext<'_>) -> Result<HashSet<String>, ConfigError> {
        items.iter().map(|v| self.name(rule, self.plural, v, ctx)).collect()
    }

    fn number(&self, rule: usize, key: &str, value: &Value, ctx: &CompileContext<'_>) -> Result<u32, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidLiteral {
            rule,
            key: key.to_string(),
            reason,
        };

        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| invalid(format!("{} is not a valid id", n))),
            Value::String(s) if s.starts_with('$') => Ok(variable(rule, s)?.numeric(&ctx.process)),
            Value::String(s) => s
                .parse::<u32>()
                .map_err(|_| invalid(format!("'{}' is not a valid id", s))),
            other => Err(invalid(format!("expected a number, got {}", kind_of(other)))),
        }
    }

    fn name(&self, rule: usize, key: &str, value: &Value, ctx: &CompileContext<'_>) -> Result<String, ConfigError> {
        match value {
            Value::String(s) if s.starts_with('$') => {
                let var = variable(rule, s)?;
                let resolved = match self.field {
                    Field::User => var.user_name(&ctx.process, ctx.resolver),
                    _ => var.group_name(&ctx.process, ctx.resolver),
                };
                match resolved {
                    Ok(Some(name)) => Ok(name),
                    Ok(None) => Err(ConfigError::UnresolvableVariable { rule, variable: var }),
                    Err(()) => Err(ConfigError::InvalidVariable {
                        rule,
                        key: key.to_string(),
                        variable: var,
                    }),
                }
            }
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(ConfigError::InvalidLiteral {
                rule,
                key: key.to_string(),
                reason: format!("expected a name, got {}", kind_of(other)),
            }),
        }
    }
}

fn variable(rule: usize, literal: &str) -> Result<Variable, ConfigError> {
    Variable::parse(literal).ok_or_else(|| ConfigError::UnknownVariable {
        rule,
        name: literal.to_string(),
    })
}

fn key_str(rule: usize, key: &Value) -> Result<&str, ConfigError> {
    key.as_str().ok_or_else(|| {
        ConfigError::Malformed(format!("rule #{} has a non-string key: {}", rule, kind_of(key)))
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(format!("'{}'", s)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
