// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Clock trait - Passive monotonic time reference for timers
//!
//! Clocks only answer "what time is it". They never wake anything up; the
//! tick driver decides how long to sleep from the deadline and `now()`.

use tokio::time::Instant;

/// Passive clock interface for timer accounting.
///
/// ## Design
///
/// - **Passive**: the clock provides `now()`, the timer decides when to wait
/// - **Monotonic**: successive calls never go backwards
/// - **Thread-safe**: all methods can be called from any thread
///
/// ## Implementations
///
/// - `TokioClock`: tokio's monotonic clock (default, honours paused test time)
/// - `ManualClock`: virtual time advanced explicitly by the caller
pub trait Clock: Send + Sync {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Human-readable clock description, used in log lines.
    fn description(&self) -> &str;
}
