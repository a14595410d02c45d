// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_original_system_constants() {
    let t = Tunables::default();
    assert_eq!(t.slave_activate_time, Duration::from_secs(10));
    assert_eq!(t.slave_relaunch_count, 3);
    assert_eq!(t.default_abi, "c");
    assert!(!t.debug_mode);
}

#[test]
fn tunables_are_independently_overridable() {
    let mut t = Tunables::default();
    t.slave_max_load = 1;
    t.debug_mode = true;
    assert_eq!(t.slave_max_load, 1);
    assert!(t.debug_mode);
    assert_eq!(t.slave_ttl, Duration::from_secs(3600));
}
