// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn static_display_monitor_reflects_last_set_value() {
    let monitor = StaticDisplayMonitor::new(false);
    assert!(!monitor.is_paused());

    monitor.set_paused(true);
    assert!(monitor.is_paused());

    monitor.set_paused(false);
    assert!(!monitor.is_paused());
}
