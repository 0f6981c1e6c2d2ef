// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Drift-corrected timing engine.
//!
//! A [`Timer`] accounts elapsed running time across start, pause, resume and
//! stop, and can fire a callback on an absolute-deadline schedule so that
//! callback latency never accumulates into drift.
//!
//! ```rust,no_run
//! use precision_timer::prelude::*;
//! use std::time::Duration;
//!
//! # async fn demo() -> precision_timer::Result<()> {
//! let ticker = interval_timer(Duration::from_millis(100), |elapsed, tick| {
//!     tracing::info!("tick {} at {:?}", tick, elapsed);
//! })?;
//! ticker.start();
//!
//! let watch = stopwatch();
//! watch.start();
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use core::prelude;

pub use core::{
    delay, interval_timer, interval_timer_with, stopwatch, stopwatch_with_clock, Clock, DueTick,
    IntervalScheduler, ManualClock, Result, Tick, TickCallback, Timer, TimerConfig, TimerCore,
    TimerError, TimerSettings, TimerState, TokioClock,
};
