// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Runtime settings read from the environment.
//!
//! | Variable         | Effect |
//! |------------------|--------|
//! | `BOUNCER_CONFIG` | policy file used instead of discovery |
//! | `BOUNCER_DEBUG`  | log every decision and lifecycle event at `info` |

use std::path::PathBuf;

pub const CONFIG_ENV: &str = "BOUNCER_CONFIG";
pub const DEBUG_ENV: &str = "BOUNCER_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub config_override: Option<PathBuf>,
    pub debug: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(path) = lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
            settings.config_override = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup(DEBUG_ENV) {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "" => settings.debug = true,
                "false" | "0" | "no" | "off" => settings.debug = false,
                _ => {
                    tracing::warn!(
                        "Invalid value for {}: '{}'. Expected true/false. Ignoring.",
                        DEBUG_ENV,
                        val
                    );
                }
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn test_debug_values() {
        assert!(settings(&[(DEBUG_ENV, "1")]).debug);
        assert!(settings(&[(DEBUG_ENV, "Yes")]).debug);
        assert!(settings(&[(DEBUG_ENV, "")]).debug);
        assert!(!settings(&[(DEBUG_ENV, "off")]).debug);
        assert!(!settings(&[(DEBUG_ENV, "maybe")]).debug);
    }

    #[test]
    fn test_config_override() {
        let s = settings(&[(CONFIG_ENV, "/tmp/policy.yaml")]);
        assert_eq!(s.config_override, Some(PathBuf::from("/tmp/policy.yaml")));
        assert_eq!(settings(&[(CONFIG_ENV, "")]).config_override, None);
    }
}
