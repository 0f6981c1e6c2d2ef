// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod driver;
pub mod facade;
pub mod interval_scheduler;
pub mod state;
pub mod timer_core;

pub use facade::Timer;
pub use interval_scheduler::{DueTick, IntervalScheduler};
pub use state::TimerState;
pub use timer_core::{Tick, TimerCore};
