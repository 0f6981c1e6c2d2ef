// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Common imports for timer users.
//!
//! ```rust,ignore
//! use precision_timer::prelude::*;
//! ```

pub use crate::core::clocks::{Clock, ManualClock, TokioClock};
pub use crate::core::config::{TickCallback, TimerConfig, TimerSettings};
pub use crate::core::error::{Result, TimerError};
pub use crate::core::presets::{delay, interval_timer, interval_timer_with, stopwatch};
pub use crate::core::timer::{Timer, TimerState};
