// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn handle_gen_produces_unique_increasing_handles() {
    let gen = TimerHandleGen::new();
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
    assert!(b.raw() > a.raw());
}

#[test]
fn handle_display_is_stable() {
    let h = TimerHandle::from_raw(7);
    assert_eq!(h.to_string(), "timer#7");
}

#[test]
fn timer_kind_display() {
    assert_eq!(TimerKind::Activate.to_string(), "activate");
    assert_eq!(TimerKind::Relaunch.to_string(), "relaunch");
    assert_eq!(TimerKind::Ttl.to_string(), "ttl");
}
