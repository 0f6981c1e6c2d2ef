// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Public timer handle.
//!
//! [`Timer`] is a cheap `Clone` handle over one timer. Every operation takes
//! the timer's reentrant lock, reads `now` from the clock and delegates to
//! [`TimerCore`]. Arming spawns a driver task; pausing, stopping or resetting
//! aborts it before returning.
//!
//! The callback runs inside the driver with the lock held and the core borrow
//! released, so a callback may call back into its own timer (for example
//! `stop()`), while calls from other threads wait for the callback to finish.
//! A callback that panics stops its timer; the panic is logged and the
//! timer reports `Stopped` from then on.

use super::driver;
use super::state::TimerState;
use super::timer_core::TimerCore;
use crate::core::clocks::{Clock, TokioClock};
use crate::core::config::{TickCallback, TimerConfig};
use crate::core::error::{Result, TimerError};
use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct TimerCell {
    core: RefCell<TimerCore>,
    callback: RefCell<Option<TickCallback>>,
    driver: RefCell<Option<JoinHandle<()>>>,
}

impl TimerCell {
    fn cancel_driver(&self) {
        if let Some(handle) = self.driver.borrow_mut().take() {
            handle.abort();
        }
    }
}

pub(crate) enum FireOutcome {
    Fired,
    NotDue,
    Disarmed,
}

pub(crate) struct TimerInner {
    clock: Arc<dyn Clock>,
    runtime: Option<Handle>,
    cell: ReentrantMutex<TimerCell>,
}

impl TimerInner {
    pub(crate) fn delay_until_due(&self, epoch: u64) -> Option<Duration> {
        let cell = self.cell.lock();
        let now = self.clock.now();
        let deadline = cell.core.borrow().armed_deadline(epoch)?;
        Some(deadline.saturating_duration_since(now))
    }

    pub(crate) fn fire_due(&self, epoch: u64) -> FireOutcome {
        let cell = self.cell.lock();
        let now = self.clock.now();

        let tick = {
            let mut core = cell.core.borrow_mut();
            match core.fire_due(now, epoch) {
                Some(tick) => tick,
                None if core.armed_deadline(epoch).is_some() => return FireOutcome::NotDue,
                None => return FireOutcome::Disarmed,
            }
        };

        if tick.stopped {
            // This task is the registered driver; it exits on the next
            // deadline check, so detach rather than abort.
            drop(cell.driver.borrow_mut().take());
        }

        let outcome = match cell.callback.borrow_mut().as_mut() {
            Some(callback) => panic::catch_unwind(AssertUnwindSafe(|| {
                callback(tick.elapsed, tick.tick_count)
            })),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => FireOutcome::Fired,
            Err(payload) => {
                tracing::error!(
                    "[Timer] Callback panicked on tick {}: {}; stopping timer",
                    tick.tick_count,
                    panic_message(payload.as_ref())
                );
                cell.core.borrow_mut().stop(self.clock.now());
                cell.cancel_driver();
                FireOutcome::Disarmed
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Drop for TimerInner {
    fn drop(&mut self) {
        if let Some(handle) = self.cell.get_mut().driver.get_mut().take() {
            handle.abort();
        }
    }
}

/// Handle to a stopwatch or interval timer.
#[derive(Clone)]
pub struct Timer {
    inner: Arc<TimerInner>,
}

impl Timer {
    /// Builds a timer on tokio's monotonic clock.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, or if it sets a delay and no
    /// tokio runtime is available to drive ticks.
    pub fn new(config: TimerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(TokioClock::new()))
    }

    /// Builds a timer reading time from `clock`.
    ///
    /// Ticks are still paced by tokio's timer; the clock decides when a tick
    /// is due and what elapsed time is reported.
    pub fn with_clock(config: TimerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let runtime = match config.delay {
            Some(_) => Some(
                Handle::try_current().map_err(|e| TimerError::NoRuntime(e.to_string()))?,
            ),
            None => None,
        };

        let TimerConfig {
            delay,
            callback,
            fire_immediately,
            run_once,
            start_immediately,
        } = config;

        tracing::debug!(
            "[Timer] Created (delay={:?}, run_once={}, clock={})",
            delay,
            run_once,
            clock.description()
        );

        let timer = Self::from_parts(
            TimerCore::new(delay, fire_immediately, run_once)?,
            callback,
            clock,
            runtime,
        );
        if start_immediately {
            timer.start();
        }
        Ok(timer)
    }

    /// A timer without interval or callback. Never needs a runtime.
    pub(crate) fn unscheduled(clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(TimerCore::stopwatch(), None, clock, None)
    }

    fn from_parts(
        core: TimerCore,
        callback: Option<TickCallback>,
        clock: Arc<dyn Clock>,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                clock,
                runtime,
                cell: ReentrantMutex::new(TimerCell {
                    core: RefCell::new(core),
                    callback: RefCell::new(callback),
                    driver: RefCell::new(None),
                }),
            }),
        }
    }

    /// Starts a new session, or resumes a paused one.
    ///
    /// Returns `false` (and does nothing) if the timer is already running.
    pub fn start(&self) -> bool {
        let cell = self.inner.cell.lock();
        let now = self.inner.clock.now();

        let (changed, armed_epoch) = {
            let mut core = cell.core.borrow_mut();
            (core.start(now), core.armed_epoch())
        };

        if changed {
            if let Some(epoch) = armed_epoch {
                self.arm_driver(&cell, epoch);
            }
        }
        changed
    }

    /// Alias of [`Timer::start`].
    pub fn resume(&self) -> bool {
        self.start()
    }

    /// Pauses a running timer. Returns `false` if it was not running.
    pub fn pause(&self) -> bool {
        let cell = self.inner.cell.lock();
        let now = self.inner.clock.now();

        let changed = cell.core.borrow_mut().pause(now);
        if changed {
            cell.cancel_driver();
        }
        changed
    }

    /// Stops a running or paused timer. Returns `false` if idle or already stopped.
    pub fn stop(&self) -> bool {
        let cell = self.inner.cell.lock();
        let now = self.inner.clock.now();

        let changed = cell.core.borrow_mut().stop(now);
        if changed {
            cell.cancel_driver();
        }
        changed
    }

    /// Returns to idle with zero elapsed time and tick count.
    pub fn reset(&self) -> bool {
        let cell = self.inner.cell.lock();

        let changed = cell.core.borrow_mut().reset();
        cell.cancel_driver();
        changed
    }

    pub fn elapsed_running_time(&self) -> Duration {
        self.read(|core, now| core.elapsed_running_time(now))
    }

    pub fn elapsed_started_time(&self) -> Duration {
        self.read(|core, now| core.elapsed_started_time(now))
    }

    pub fn elapsed_resumed_time(&self) -> Duration {
        self.read(|core, now| core.elapsed_resumed_time(now))
    }

    pub fn total_paused_time(&self) -> Duration {
        self.read(|core, now| core.total_paused_time(now))
    }

    /// Time until the next tick; frozen while paused.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.read(|core, now| core.remaining_time(now))
    }

    /// Instant the current session started.
    pub fn start_time(&self) -> Option<Instant> {
        self.read(|core, _| core.start_time())
    }

    /// Instant of the most recent start or resume while running.
    pub fn resume_time(&self) -> Option<Instant> {
        self.read(|core, _| core.resume_time())
    }

    pub fn pause_time(&self) -> Option<Instant> {
        self.read(|core, _| core.pause_time())
    }

    pub fn next_fire_time(&self) -> Option<Instant> {
        self.read(|core, _| core.next_fire_time())
    }

    pub fn last_fire_time(&self) -> Option<Instant> {
        self.read(|core, _| core.last_fire_time())
    }

    /// Ticks fired since the session started.
    pub fn tick_count(&self) -> u64 {
        self.read(|core, _| core.tick_count())
    }

    pub fn delay(&self) -> Option<Duration> {
        self.read(|core, _| core.interval())
    }

    pub fn state(&self) -> TimerState {
        self.read(|core, _| core.state())
    }

    pub fn is_running(&self) -> bool {
        self.read(|core, _| core.is_running())
    }

    pub fn is_paused(&self) -> bool {
        self.read(|core, _| core.is_paused())
    }

    pub fn is_stopped(&self) -> bool {
        self.read(|core, _| core.is_stopped())
    }

    pub fn is_started(&self) -> bool {
        self.read(|core, _| core.is_started())
    }

    fn read<R>(&self, query: impl FnOnce(&TimerCore, Instant) -> R) -> R {
        let cell = self.inner.cell.lock();
        let now = self.inner.clock.now();
        let core = cell.core.borrow();
        query(&core, now)
    }

    fn arm_driver(&self, cell: &TimerCell, epoch: u64) {
        let Some(runtime) = self.inner.runtime.as_ref() else {
            return;
        };
        let handle = driver::spawn(runtime, Arc::downgrade(&self.inner), epoch);
        if let Some(previous) = cell.driver.replace(Some(handle)) {
            previous.abort();
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (state, elapsed, tick_count, delay) = self.read(|core, now| {
            (
                core.state(),
                core.elapsed_running_time(now),
                core.tick_count(),
                core.interval(),
            )
        });
        f.debug_struct("Timer")
            .field("state", &state)
            .field("elapsed", &elapsed)
            .field("tick_count", &tick_count)
            .field("delay", &delay)
            .finish()
    }
}
