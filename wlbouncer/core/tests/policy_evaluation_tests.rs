// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end policy tests: YAML text in, decisions out.
//!
//! Every test goes through `parse_tree` → `compile` → `PolicyStore`, so the
//! verb/target/condition handling of the compiler and the reverse walk of the
//! store are exercised together.

use std::collections::HashMap;

use wlbouncer_core::domain::config::{CompileContext, ConfigError};
use wlbouncer_core::domain::identity::{Gid, Identity, NameResolver, Uid};
use wlbouncer_core::domain::policy::{Decision, DecisionSource, PolicyStore};
use wlbouncer_core::domain::variables::ProcessContext;
use wlbouncer_core::infrastructure::config_loader::parse_tree;

const COMPOSITOR_PID: u32 = 4000;

struct Accounts {
    users: HashMap<Uid, &'static str>,
    groups: HashMap<Gid, &'static str>,
}

impl Accounts {
    fn new() -> Self {
        Self {
            users: HashMap::from([(0, "root"), (1000, "alice"), (1001, "bob")]),
            groups: HashMap::from([(0, "root"), (100, "users"), (1000, "alice"), (1001, "bob")]),
        }
    }
}

impl NameResolver for Accounts {
    fn user_name(&self, uid: Uid) -> Option<String> {
        self.users.get(&uid).map(|s| s.to_string())
    }

    fn group_name(&self, gid: Gid) -> Option<String> {
        self.groups.get(&gid).map(|s| s.to_string())
    }
}

fn process() -> ProcessContext {
    ProcessContext {
        pid: COMPOSITOR_PID,
        ppid: 1,
        uid: 1000,
        euid: 1000,
        gid: 100,
        egid: 100,
    }
}

fn store(yaml: &str) -> PolicyStore {
    let accounts = Accounts::new();
    let ctx = CompileContext {
        process: process(),
        resolver: &accounts,
    };
    let store = PolicyStore::new(COMPOSITOR_PID);
    store.load(&parse_tree(yaml).unwrap(), &ctx).unwrap();
    store
}

fn alice() -> Identity {
    Identity {
        pid: 5001,
        uid: 1000,
        gid: 100,
        user: "alice".to_string(),
        group: "users".to_string(),
    }
}

fn bob() -> Identity {
    Identity {
        pid: 5002,
        uid: 1001,
        gid: 1001,
        user: "bob".to_string(),
        group: "bob".to_string(),
    }
}

#[test]
fn test_default_interface_allowed_without_directives() {
    let store = store("version: 0\n");
    assert!(store.evaluate(&alice(), "wl_compositor"));
    assert!(store.evaluate(&alice(), "xdg_wm_base"));
    assert!(!store.evaluate(&alice(), "zwlr_screencopy_manager_v1"));
}

#[test]
fn test_default_interface_allowed_when_unmentioned() {
    let store = store(
        r#"
version: 0
policy:
  - disable: zwlr_screencopy_manager_v1
"#,
    );
    assert_eq!(
        store.explain(&alice(), "wl_seat"),
        Decision::Default { allowed: true }
    );
}

#[test]
fn test_compositor_process_is_exempt() {
    let store = store(
        r#"
version: 0
policy:
  - disable-only: all
"#,
    );
    let mut compositor = alice();
    compositor.pid = COMPOSITOR_PID;

    assert!(!store.evaluate(&alice(), "wl_compositor"));
    assert!(store.evaluate(&compositor, "wl_compositor"));
    assert!(store.evaluate(&compositor, "zwlr_screencopy_manager_v1"));
}

#[test]
fn test_last_declared_rule_wins() {
    let store = store(
        r#"
version: 0
policy:
  - enable: zwlr_screencopy_manager_v1
  - disable: zwlr_screencopy_manager_v1
    user: alice
"#,
    );
    assert_eq!(
        store.explain(&alice(), "zwlr_screencopy_manager_v1"),
        Decision::Directive { index: 2, allowed: false }
    );
    // Rule #2 abstains for bob, rule #1 decides.
    assert_eq!(
        store.explain(&bob(), "zwlr_screencopy_manager_v1"),
        Decision::Directive { index: 1, allowed: true }
    );
}

#[test]
fn test_disable_only_denies_named_and_decides_the_rest() {
    let store = store(
        r#"
version: 0
policy:
  - disable-only: [wl_shm, wl_seat]
"#,
    );
    assert!(!store.evaluate(&alice(), "wl_shm"));
    assert!(!store.evaluate(&alice(), "wl_seat"));
    // The rule never abstains, so the default set is not consulted.
    assert_eq!(
        store.explain(&alice(), "zwlr_screencopy_manager_v1"),
        Decision::Directive { index: 1, allowed: true }
    );
}

#[test]
fn test_enable_allows_named_and_falls_through() {
    let store = store(
        r#"
version: 0
policy:
  - enable: [zwlr_screencopy_manager_v1]
"#,
    );
    assert!(store.evaluate(&alice(), "zwlr_screencopy_manager_v1"));
    assert_eq!(
        store.explain(&alice(), "zwlr_layer_shell_v1"),
        Decision::Default { allowed: false }
    );
}

#[test]
fn test_enable_only_hides_everything_else() {
    let store = store(
        r#"
version: 0
policy:
  - enable-only: [wl_compositor, wl_shm]
    users: [bob]
"#,
    );
    assert!(store.evaluate(&bob(), "wl_shm"));
    assert!(!store.evaluate(&bob(), "wl_seat"));
    assert!(store.evaluate(&alice(), "wl_seat"));
}

#[test]
fn test_enable_all_for_one_user() {
    let store = store(
        r#"
version: 0
policy:
  - enable: all
    user: alice
"#,
    );
    assert!(store.evaluate(&alice(), "zwlr_screencopy_manager_v1"));
    assert!(store.evaluate(&alice(), "zwlr_layer_shell_v1"));

    assert_eq!(
        store.explain(&bob(), "zwlr_screencopy_manager_v1"),
        Decision::Default { allowed: false }
    );
    assert!(store.evaluate(&bob(), "wl_compositor"));
}

#[test]
fn test_variables_resolve_against_compositor_process() {
    let store = store(
        r#"
version: 0
policy:
  - enable: zwlr_screencopy_manager_v1
    user: $euid
  - disable: wl_data_device_manager
    pid: $ppid
"#,
    );
    // $euid = 1000 = alice
    assert!(store.evaluate(&alice(), "zwlr_screencopy_manager_v1"));
    assert!(!store.evaluate(&bob(), "zwlr_screencopy_manager_v1"));

    let mut parent = bob();
    parent.pid = 1;
    assert!(!store.evaluate(&parent, "wl_data_device_manager"));
    assert!(store.evaluate(&bob(), "wl_data_device_manager"));
}

#[test]
fn test_multiple_conditions_must_all_hold() {
    let store = store(
        r#"
version: 0
policy:
  - enable: zwlr_screencopy_manager_v1
    uids: [1000, 1001]
    group: users
"#,
    );
    assert!(store.evaluate(&alice(), "zwlr_screencopy_manager_v1"));
    assert!(!store.evaluate(&bob(), "zwlr_screencopy_manager_v1"));
}

#[test]
fn test_malformed_policy_keeps_previous_directives() {
    let accounts = Accounts::new();
    let ctx = CompileContext {
        process: process(),
        resolver: &accounts,
    };
    let store = store(
        r#"
version: 0
policy:
  - disable: wl_shm
"#,
    );

    let broken = parse_tree(
        r#"
version: 0
policy:
  - enable: wl_shm
  - enable: wl_seat
    disable: wl_seat
"#,
    )
    .unwrap();
    let err = store.load(&broken, &ctx).unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingVerbs { rule: 2, .. }));

    assert_eq!(store.len(), 1);
    assert!(!store.evaluate(&alice(), "wl_shm"));
}

#[test]
fn test_unsupported_version_is_rejected() {
    let accounts = Accounts::new();
    let ctx = CompileContext {
        process: process(),
        resolver: &accounts,
    };
    let store = PolicyStore::new(COMPOSITOR_PID);
    let err = store.load(&parse_tree("version: 1\npolicy: []\n").unwrap(), &ctx).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
    assert!(store.is_empty());
}
