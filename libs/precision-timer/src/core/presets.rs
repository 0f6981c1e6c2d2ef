// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Preset timer policies built on [`Timer`].
//!
//! - [`stopwatch`]: counts elapsed time until paused or stopped, never ticks.
//! - [`interval_timer`]: fires a callback every `delay` until stopped.
//! - [`delay`]: fires a callback once, `delay` after construction.

use crate::core::clocks::{Clock, TokioClock};
use crate::core::config::TimerConfig;
use crate::core::error::{Result, TimerError};
use crate::core::timer::Timer;
use std::sync::Arc;
use std::time::Duration;

/// A stopwatch on tokio's monotonic clock. Call `start()` to begin counting.
pub fn stopwatch() -> Timer {
    stopwatch_with_clock(Arc::new(TokioClock::new()))
}

pub fn stopwatch_with_clock(clock: Arc<dyn Clock>) -> Timer {
    Timer::unscheduled(clock)
}

/// A periodic timer firing `callback` every `delay`. Call `start()` to arm it.
pub fn interval_timer<F>(delay: Duration, callback: F) -> Result<Timer>
where
    F: FnMut(Duration, u64) + Send + 'static,
{
    interval_timer_with(TimerConfig::new().with_delay(delay).with_callback(callback))
}

/// A periodic timer from a full configuration, which must carry both a delay
/// and a callback.
pub fn interval_timer_with(config: TimerConfig) -> Result<Timer> {
    if config.delay.is_none() {
        return Err(TimerError::MissingDelay(
            "an interval timer needs a delay".to_string(),
        ));
    }
    if config.callback.is_none() {
        return Err(TimerError::MissingCallback(
            "an interval timer needs a callback".to_string(),
        ));
    }
    Timer::new(config)
}

/// Fires `callback` once, `delay` from now, then stops. Already started on return.
pub fn delay<F>(delay: Duration, callback: F) -> Result<Timer>
where
    F: FnMut(Duration, u64) + Send + 'static,
{
    interval_timer_with(
        TimerConfig::new()
            .with_delay(delay)
            .with_callback(callback)
            .run_once(true)
            .start_immediately(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::TimerState;

    #[test]
    fn test_stopwatch_preset_is_idle_without_delay() {
        let timer = stopwatch();
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.delay().is_none());
    }

    #[test]
    fn test_interval_preset_requires_callback() {
        let config = TimerConfig::new().with_delay(Duration::from_millis(10));
        assert!(matches!(
            interval_timer_with(config),
            Err(TimerError::MissingCallback(_))
        ));
    }

    #[test]
    fn test_interval_preset_requires_delay() {
        let config = TimerConfig::new().with_callback(|_, _| {});
        assert!(matches!(
            interval_timer_with(config),
            Err(TimerError::MissingDelay(_))
        ));
    }

    #[tokio::test]
    async fn test_delay_preset_starts_immediately() {
        let timer = delay(Duration::from_secs(60), |_, _| {}).unwrap();
        assert!(timer.is_running());
        assert_eq!(timer.delay(), Some(Duration::from_secs(60)));
        timer.stop();
    }
}
