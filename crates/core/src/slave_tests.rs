// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn slave() -> Slave {
    Slave::new(SlaveId::new("s1"), "liblive-a", "c", true, false)
}

#[test]
fn new_slave_starts_terminated_with_refcount_one() {
    let s = slave();
    assert_eq!(s.state, SlaveState::Terminated);
    assert_eq!(s.refcount, 1);
    assert_eq!(s.pid, None);
    assert!(!s.is_active());
}

#[test]
fn all_states_but_terminate_family_are_active() {
    for state in [
        SlaveState::RequestedLaunch,
        SlaveState::Resumed,
        SlaveState::Paused,
        SlaveState::RequestedPause,
        SlaveState::RequestedResume,
        SlaveState::Error,
    ] {
        assert!(state.is_active(), "{state} should be active");
    }
    assert!(!SlaveState::RequestedTerminate.is_active());
    assert!(!SlaveState::Terminated.is_active());
}

#[test]
fn assign_and_release_package_tracks_loaded_package_count() {
    let mut s = slave();
    assert_eq!(s.loaded_package(), 0);
    s.assign_package("liblive-a");
    assert_eq!(s.loaded_package(), 1);
    s.assign_package("liblive-b");
    assert_eq!(s.loaded_package(), 2);
    s.release_package("liblive-a");
    assert_eq!(s.loaded_package(), 1);
    s.release_package("liblive-b");
    assert_eq!(s.loaded_package(), 0);
}

#[test]
fn releasing_an_unknown_package_is_a_no_op() {
    let mut s = slave();
    s.release_package("never-assigned");
    assert_eq!(s.loaded_package(), 0);
}

#[test]
fn hosts_single_package_reports_none_unless_exactly_one() {
    let mut s = slave();
    assert_eq!(s.hosts_single_package(), None);
    s.assign_package("liblive-a");
    assert_eq!(s.hosts_single_package(), Some("liblive-a"));
    s.assign_package("liblive-b");
    assert_eq!(s.hosts_single_package(), None);
}

#[test]
fn snapshot_mirrors_live_fields() {
    let mut s = slave();
    s.state = SlaveState::Resumed;
    s.pid = Some(42);
    s.assign_package("liblive-a");
    s.loaded_instance = 3;
    s.fault_count = 2;

    let snap = s.snapshot();
    assert_eq!(snap.id, s.id);
    assert_eq!(snap.state, SlaveState::Resumed);
    assert_eq!(snap.pid, Some(42));
    assert_eq!(snap.loaded_package, 1);
    assert_eq!(snap.loaded_instance, 3);
    assert_eq!(snap.fault_count, 2);
}

#[test]
fn slave_id_compares_equal_to_its_str_form() {
    let id = SlaveId::new("s1");
    assert_eq!(id.as_str(), "s1");
    assert_eq!(id.to_string(), "s1");
}
