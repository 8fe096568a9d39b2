// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Policy File Loader
//!
//! Locates, reads and parses policy files into a generic YAML tree that
//! [`crate::domain::config::compile`] turns into directives.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** File system → `serde_yaml::Value`
//!
//! # Discovery Order
//!
//! 1. `BOUNCER_CONFIG` environment variable (if the file exists)
//! 2. `/etc/wlbouncer/config.yaml` (system-wide)
//! 3. `$XDG_CONFIG_HOME/wlbouncer/config.yaml` (per user)
//!
//! An explicit path handed to [`ConfigLocator::load`] bypasses discovery and
//! must be readable.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::domain::config::ConfigError;
use crate::infrastructure::settings::Settings;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/wlbouncer/config.yaml";
const USER_CONFIG_DIR: &str = "wlbouncer";
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocator {
    env_override: Option<PathBuf>,
    system: PathBuf,
    user: Option<PathBuf>,
}

impl ConfigLocator {
    pub fn new(env_override: Option<PathBuf>, system: PathBuf, user: Option<PathBuf>) -> Self {
        Self {
            env_override,
            system,
            user,
        }
    }

    /// Standard locations, with the override taken from `settings`.
    pub fn standard(settings: &Settings) -> Self {
        Self::new(
            settings.config_override.clone(),
            PathBuf::from(SYSTEM_CONFIG_PATH),
            dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(CONFIG_FILE_NAME)),
        )
    }

    /// Every path discovery looks at, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.env_override
            .iter()
            .chain(std::iter::once(&self.system))
            .chain(self.user.iter())
            .cloned()
            .collect()
    }

    /// First candidate that exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] listing every searched path.
    pub fn locate(&self) -> Result<PathBuf, ConfigError> {
        let candidates = self.candidates();
        for path in &candidates {
            if path.is_file() {
                return Ok(path.clone());
            }
            tracing::debug!("No policy file at {}", path.display());
        }
        Err(ConfigError::NotFound {
            searched: candidates,
        })
    }

    /// Read the policy tree from `explicit`, or from the discovered file.
    ///
    /// Returns the path actually read along with its contents.
    pub fn load(&self, explicit: Option<&Path>) -> Result<(PathBuf, Value), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => self.locate()?,
        };
        let tree = read_tree(&path)?;
        Ok((path, tree))
    }
}

/// Read and parse one policy file.
pub fn read_tree(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tree(&content)
}

/// Parse policy text. Only YAML syntax is checked here.
pub fn parse_tree(content: &str) -> Result<Value, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_candidates_order() {
        let locator = ConfigLocator::new(
            Some(PathBuf::from("/env.yaml")),
            PathBuf::from("/etc/x.yaml"),
            Some(PathBuf::from("/home/u/x.yaml")),
        );
        assert_eq!(
            locator.candidates(),
            vec![
                PathBuf::from("/env.yaml"),
                PathBuf::from("/etc/x.yaml"),
                PathBuf::from("/home/u/x.yaml"),
            ]
        );
    }

    #[test]
    fn test_locate_prefers_system_over_user() {
        let dir = TempDir::new().unwrap();
        let system = write(&dir, "system.yaml", "version: 0\n");
        let user = write(&dir, "user.yaml", "version: 0\n");

        let locator = ConfigLocator::new(None, system.clone(), Some(user.clone()));
        assert_eq!(locator.locate().unwrap(), system);

        let locator = ConfigLocator::new(None, dir.path().join("missing.yaml"), Some(user.clone()));
        assert_eq!(locator.locate().unwrap(), user);
    }

    #[test]
    fn test_missing_env_override_falls_back() {
        let dir = TempDir::new().unwrap();
        let system = write(&dir, "system.yaml", "version: 0\n");
        let locator = ConfigLocator::new(Some(dir.path().join("nope.yaml")), system.clone(), None);
        assert_eq!(locator.locate().unwrap(), system);
    }

    #[test]
    fn test_nothing_found() {
        let dir = TempDir::new().unwrap();
        let locator = ConfigLocator::new(None, dir.path().join("a.yaml"), Some(dir.path().join("b.yaml")));
        match locator.locate() {
            Err(ConfigError::NotFound { searched }) => assert_eq!(searched.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_path_must_be_readable() {
        let dir = TempDir::new().unwrap();
        let locator = ConfigLocator::new(None, dir.path().join("a.yaml"), None);
        let err = locator.load(Some(&dir.path().join("gone.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_load_parses_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.yaml", "version: 0\npolicy:\n  - enable: all\n");
        let locator = ConfigLocator::new(None, path.clone(), None);

        let (found, tree) = locator.load(None).unwrap();
        assert_eq!(found, path);
        assert!(tree.get("policy").unwrap().is_sequence());
    }

    #[test]
    fn test_yaml_syntax_error_is_malformed() {
        assert!(matches!(parse_tree("policy: [\n"), Err(ConfigError::Malformed(_))));
    }
}
