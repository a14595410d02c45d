// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dpm_core::SlaveState;

#[test]
fn find_or_create_is_idempotent_on_name() {
    let mut reg = Registry::new();
    let id1 = reg.find_or_create("s1", true, "c", "liblive-a", false).unwrap();
    let id2 = reg.find_or_create("s1", true, "c", "liblive-a", false).unwrap();
    assert_eq!(id1, id2);
    assert_eq!(reg.len(), 1);
}

#[test]
fn find_or_create_rejects_secured_mismatch() {
    let mut reg = Registry::new();
    reg.find_or_create("s1", true, "c", "liblive-a", false).unwrap();
    let err = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap_err();
    assert!(matches!(err, CoreError::Invalid(_)));
}

#[test]
fn find_by_pid_locates_running_slave() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    reg.find_by_name_mut(&id).unwrap().pid = Some(100);

    assert_eq!(reg.find_by_pid(100).unwrap().id, id);
    assert!(reg.find_by_pid(999).is_none());
}

#[test]
fn find_by_package_matches_primary_and_loaded_packages() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    reg.find_by_name_mut(&id).unwrap().assign_package("liblive-b");

    assert_eq!(reg.find_by_package("liblive-a").len(), 1);
    assert_eq!(reg.find_by_package("liblive-b").len(), 1);
    assert_eq!(reg.find_by_package("liblive-c").len(), 0);
}

#[test]
fn find_available_excludes_dying_slaves() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    let slave = reg.find_by_name_mut(&id).unwrap();
    slave.state = SlaveState::RequestedTerminate;
    slave.loaded_instance = 0;

    assert_eq!(reg.find_available("c", false, false, "c", 30), None);
}

#[test]
fn find_available_includes_dying_slave_with_live_instances() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    let slave = reg.find_by_name_mut(&id).unwrap();
    slave.state = SlaveState::RequestedTerminate;
    slave.loaded_instance = 3;

    assert_eq!(reg.find_available("c", false, false, "c", 30), Some(id));
}

#[test]
fn find_available_secured_requires_zero_loaded_packages() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", true, "c", "liblive-a", false).unwrap();
    reg.find_by_name_mut(&id).unwrap().assign_package("liblive-a");

    assert_eq!(reg.find_available("c", true, false, "c", 30), None);
}

#[test]
fn find_available_unsecured_default_abi_is_capped_at_max_load() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", true).unwrap();
    for i in 0..30 {
        reg.find_by_name_mut(&id).unwrap().assign_package(format!("liblive-{i}"));
    }

    assert_eq!(reg.find_available("c", false, true, "c", 30), None);
    assert_eq!(id, reg.find_by_name("s1").unwrap().id);
}

#[test]
fn find_available_unsecured_non_default_abi_is_never_capped() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "lua", "liblive-a", true).unwrap();
    for i in 0..30 {
        reg.find_by_name_mut(&id).unwrap().assign_package(format!("liblive-{i}"));
    }

    // abi "lua" != default_abi "c", so rule 5's MAX_LOAD clause never applies.
    assert_eq!(reg.find_available("lua", false, true, "c", 30), Some(id));
}

#[test]
fn find_available_rejects_network_mismatch() {
    let mut reg = Registry::new();
    reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    assert_eq!(reg.find_available("c", false, true, "c", 30), None);
}

#[test]
fn find_available_abi_match_is_case_insensitive() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "C", "liblive-a", false).unwrap();
    assert_eq!(reg.find_available("c", false, false, "c", 30), Some(id));
}

#[test]
fn find_available_honors_insertion_order() {
    let mut reg = Registry::new();
    let first = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    reg.find_or_create("s2", false, "c", "liblive-a", false).unwrap();

    assert_eq!(reg.find_available("c", false, false, "c", 30), Some(first));
}

#[test]
fn ref_and_unref_round_trip() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    assert_eq!(reg.ref_slave(&id).unwrap(), 2);
    assert_eq!(reg.unref(&id).unwrap(), SlaveOutcome::Alive(id.clone()));
    assert_eq!(reg.unref(&id).unwrap(), SlaveOutcome::Destroyed);
    assert!(reg.find_by_name(&id).is_none());
}

#[test]
fn unref_refuses_to_destroy_while_pid_is_set() {
    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    reg.find_by_name_mut(&id).unwrap().pid = Some(42);

    let err = reg.unref(&id).unwrap_err();
    assert!(matches!(err, CoreError::Invalid(_)));
    assert!(reg.find_by_name(&id).is_some(), "record must survive a refused destroy");
}

#[test]
fn unref_unknown_slave_is_not_exist() {
    let mut reg = Registry::new();
    let bogus = dpm_core::SlaveId::new("ghost");
    assert!(matches!(reg.unref(&bogus), Err(CoreError::NotExist)));
}

#[test]
fn destroy_fires_delete_callbacks() {
    use dpm_core::event::{CallbackResult, EventKind};
    use parking_lot::Mutex;
    use std::sync::Arc;

    let mut reg = Registry::new();
    let id = reg.find_or_create("s1", false, "c", "liblive-a", false).unwrap();
    let fired = Arc::new(Mutex::new(false));
    let fired_clone = fired.clone();
    reg.find_by_name_mut(&id).unwrap().observers.list_mut(EventKind::Delete).push(Box::new(move |_snap, _ctx| {
        *fired_clone.lock() = true;
        CallbackResult::keep()
    }));

    reg.unref(&id).unwrap();
    assert!(*fired.lock());
}
