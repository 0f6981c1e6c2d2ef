// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod delay;
pub mod interval;
pub mod stopwatch;

use std::time::Duration;

/// Formats a duration as seconds with millisecond precision (e.g. `1.250s`).
pub(crate) fn format_secs(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}
