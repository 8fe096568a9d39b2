// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # System Account Lookups
//!
//! libc-backed [`NameResolver`] (`getpwuid_r`/`getgrgid_r`, so NSS modules such
//! as LDAP or systemd-userdb are honored) and the [`ProcessContext`] of the
//! running compositor.
//!
//! ## Safety
//!
//! The reentrant lookups write into a caller-owned buffer; the buffer is grown
//! on `ERANGE` and the returned name is copied out before the buffer is
//! dropped.

use std::ffi::CStr;

use crate::domain::identity::{Gid, NameResolver, Uid};
use crate::domain::variables::ProcessContext;

const INITIAL_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 1 << 20;

/// Resolves names through the C library's user and group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNameResolver;

impl SystemNameResolver {
    pub fn new() -> Self {
        Self
    }
}

impl NameResolver for SystemNameResolver {
    fn user_name(&self, uid: Uid) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER];
        loop {
            // SAFETY: `passwd` and `result` are plain out-parameters and `buf`
            // outlives every pointer stored into `passwd`.
            let mut passwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();
            let rc = unsafe {
                libc::getpwuid_r(uid, &mut passwd, buf.as_mut_ptr(), buf.len(), &mut result)
            };

            if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 || result.is_null() || passwd.pw_name.is_null() {
                return None;
            }
            // SAFETY: on success `pw_name` points to a NUL terminated string in `buf`.
            let name = unsafe { CStr::from_ptr(passwd.pw_name) };
            return Some(name.to_string_lossy().into_owned());
        }
    }

    fn group_name(&self, gid: Gid) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER];
        loop {
            // SAFETY: see `user_name`.
            let mut group: libc::group = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::group = std::ptr::null_mut();
            let rc = unsafe {
                libc::getgrgid_r(gid, &mut group, buf.as_mut_ptr(), buf.len(), &mut result)
            };

            if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 || result.is_null() || group.gr_name.is_null() {
                return None;
            }
            // SAFETY: on success `gr_name` points to a NUL terminated string in `buf`.
            let name = unsafe { CStr::from_ptr(group.gr_name) };
            return Some(name.to_string_lossy().into_owned());
        }
    }
}

/// Snapshot the credentials of the current process.
pub fn current_process() -> ProcessContext {
    // SAFETY: these calls cannot fail and have no preconditions.
    let (uid, euid, gid, egid) = unsafe { (libc::getuid(), libc::geteuid(), libc::getgid(), libc::getegid()) };
    ProcessContext {
        pid: std::process::id(),
        ppid: std::os::unix::process::parent_id(),
        uid,
        euid,
        gid,
        egid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_matches_std() {
        let ctx = current_process();
        assert_eq!(ctx.pid, std::process::id());
        assert_ne!(ctx.pid, ctx.ppid);
    }

    #[test]
    fn test_root_names_resolve() {
        let resolver = SystemNameResolver::new();
        assert_eq!(resolver.user_name(0).as_deref(), Some("root"));
        assert!(resolver.group_name(0).is_some());
    }

    #[test]
    fn test_unassigned_uid_does_not_resolve() {
        let resolver = SystemNameResolver::new();
        assert_eq!(resolver.user_name(u32::MAX - 7), None);
    }
}
