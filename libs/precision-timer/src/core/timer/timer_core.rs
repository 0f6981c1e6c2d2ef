// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timer state machine and elapsed-time accountant.
//!
//! `TimerCore` is pure: it never reads a clock and never spawns anything.
//! Every operation receives `now`, which keeps the accounting testable with
//! synthetic instants. The facade supplies `now` from its clock and owns the
//! tick driver.
//!
//! Elapsed running time is always
//! `accumulated + (Running ? now - resumed_at : 0)`.

use super::interval_scheduler::IntervalScheduler;
use super::state::TimerState;
use crate::core::error::Result;
use std::time::Duration;
use tokio::time::Instant;

/// One callback invocation the core decided is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Elapsed running time at the tick.
    pub elapsed: Duration,
    /// Ticks fired in this session, including this one.
    pub tick_count: u64,
    /// Deadline the tick was scheduled for.
    pub scheduled_for: Instant,
    /// Instant the tick was taken.
    pub fired_at: Instant,
    /// Overdue intervals skipped by catch-up.
    pub skipped: u64,
    /// The tick stopped the timer (`run_once`).
    pub stopped: bool,
}

#[derive(Debug, Clone)]
pub struct TimerCore {
    state: TimerState,
    started_at: Option<Instant>,
    resumed_at: Option<Instant>,
    paused_at: Option<Instant>,
    stopped_at: Option<Instant>,
    accumulated: Duration,
    total_paused: Duration,
    tick_count: u64,
    fire_immediately: bool,
    run_once: bool,
    scheduler: Option<IntervalScheduler>,
    // Bumped on every arm and disarm so a wake-up armed earlier can tell it is stale.
    epoch: u64,
}

impl TimerCore {
    /// A core ticking every `interval`, or a plain stopwatch for `None`.
    ///
    /// Fails with `TimerError::InvalidDelay` for a zero interval.
    pub fn new(
        interval: Option<Duration>,
        fire_immediately: bool,
        run_once: bool,
    ) -> Result<Self> {
        let scheduler = interval.map(IntervalScheduler::new).transpose()?;
        Ok(Self::from_scheduler(scheduler, fire_immediately, run_once))
    }

    /// Pure elapsed-time accounting, no periodic ticks.
    pub fn stopwatch() -> Self {
        Self::from_scheduler(None, false, false)
    }

    fn from_scheduler(
        scheduler: Option<IntervalScheduler>,
        fire_immediately: bool,
        run_once: bool,
    ) -> Self {
        Self {
            state: TimerState::Idle,
            started_at: None,
            resumed_at: None,
            paused_at: None,
            stopped_at: None,
            accumulated: Duration::ZERO,
            total_paused: Duration::ZERO,
            tick_count: 0,
            fire_immediately,
            run_once,
            scheduler,
            epoch: 0,
        }
    }

    /// Starts a new session from Idle/Stopped, or resumes from Paused.
    ///
    /// Returns `false` without side effects when already running.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Running => false,
            TimerState::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.total_paused += now.saturating_duration_since(paused_at);
                }
                self.resumed_at = Some(now);
                self.state = TimerState::Running;
                if let Some(scheduler) = self.scheduler.as_mut() {
                    scheduler.rearm_after_pause(now);
                }
                self.epoch += 1;
                tracing::debug!(
                    "[Timer] Resumed with {:?} elapsed, tick_count={}",
                    self.accumulated,
                    self.tick_count
                );
                true
            }
            TimerState::Idle | TimerState::Stopped => {
                self.accumulated = Duration::ZERO;
                self.total_paused = Duration::ZERO;
                self.tick_count = 0;
                self.started_at = Some(now);
                self.resumed_at = Some(now);
                self.paused_at = None;
                self.stopped_at = None;
                self.state = TimerState::Running;
                let fire_immediately = self.fire_immediately;
                if let Some(scheduler) = self.scheduler.as_mut() {
                    scheduler.arm(now, fire_immediately);
                }
                self.epoch += 1;
                tracing::debug!(
                    "[Timer] Started session (interval={:?}, fire_immediately={})",
                    self.interval(),
                    self.fire_immediately
                );
                true
            }
        }
    }

    /// Alias of [`TimerCore::start`]; from Paused it keeps accumulated time.
    pub fn resume(&mut self, now: Instant) -> bool {
        self.start(now)
    }

    /// Freezes the running segment and disarms the schedule. No-op unless running.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.close_running_segment(now);
        self.paused_at = Some(now);
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.disarm_for_pause(now);
        }
        self.state = TimerState::Paused;
        self.epoch += 1;
        tracing::debug!("[Timer] Paused at {:?} elapsed", self.accumulated);
        true
    }

    /// Ends the session, freezing elapsed time. No-op from Idle/Stopped.
    pub fn stop(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Running => self.close_running_segment(now),
            TimerState::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.total_paused += now.saturating_duration_since(paused_at);
                }
            }
            TimerState::Idle | TimerState::Stopped => return false,
        }

        self.paused_at = None;
        self.stopped_at = Some(now);
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.disarm();
        }
        self.state = TimerState::Stopped;
        self.epoch += 1;
        tracing::debug!(
            "[Timer] Stopped after {:?} elapsed, {} ticks",
            self.accumulated,
            self.tick_count
        );
        true
    }

    /// Returns to Idle from any state. Returns `false` if already Idle.
    pub fn reset(&mut self) -> bool {
        let was_idle = self.state == TimerState::Idle;

        self.state = TimerState::Idle;
        self.started_at = None;
        self.resumed_at = None;
        self.paused_at = None;
        self.stopped_at = None;
        self.accumulated = Duration::ZERO;
        self.total_paused = Duration::ZERO;
        self.tick_count = 0;
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.clear();
        }
        self.epoch += 1;

        if !was_idle {
            tracing::debug!("[Timer] Reset to idle");
        }
        !was_idle
    }

    /// Takes the tick due at `now` for the arming identified by `epoch`.
    ///
    /// Returns `None` if the arming is stale, the timer is not running, or
    /// the deadline has not been reached.
    pub fn fire_due(&mut self, now: Instant, epoch: u64) -> Option<Tick> {
        if epoch != self.epoch || self.state != TimerState::Running {
            return None;
        }
        let due = self.scheduler.as_mut()?.poll(now)?;

        self.tick_count += 1;
        if due.skipped > 0 {
            tracing::warn!(
                "[IntervalScheduler] Missed {} ticks, catching up",
                due.skipped
            );
        }

        let elapsed = self.elapsed_running_time(now);
        let tick_count = self.tick_count;
        let stopped = self.run_once && self.stop(now);

        tracing::trace!(
            "[IntervalScheduler] Tick {} at {:?} elapsed (late by {:?})",
            tick_count,
            elapsed,
            due.fired_at.saturating_duration_since(due.scheduled_for)
        );

        Some(Tick {
            elapsed,
            tick_count,
            scheduled_for: due.scheduled_for,
            fired_at: due.fired_at,
            skipped: due.skipped,
            stopped,
        })
    }

    /// The pending deadline, if `epoch` is still the current arming.
    pub fn armed_deadline(&self, epoch: u64) -> Option<Instant> {
        if epoch != self.epoch || self.state != TimerState::Running {
            return None;
        }
        self.scheduler.as_ref()?.next_deadline()
    }

    /// The current arming epoch while a schedule is armed.
    pub fn armed_epoch(&self) -> Option<u64> {
        let scheduler = self.scheduler.as_ref()?;
        (self.state == TimerState::Running && scheduler.is_armed()).then_some(self.epoch)
    }

    pub fn elapsed_running_time(&self, now: Instant) -> Duration {
        match (self.state, self.resumed_at) {
            (TimerState::Running, Some(resumed_at)) => {
                self.accumulated + now.saturating_duration_since(resumed_at)
            }
            _ => self.accumulated,
        }
    }

    /// Wall time since the session started, running and paused alike.
    pub fn elapsed_started_time(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = match self.state {
            TimerState::Stopped => self.stopped_at.unwrap_or(now),
            _ => now,
        };
        end.saturating_duration_since(started_at)
    }

    pub fn total_paused_time(&self, now: Instant) -> Duration {
        match (self.state, self.paused_at) {
            (TimerState::Paused, Some(paused_at)) => {
                self.total_paused + now.saturating_duration_since(paused_at)
            }
            _ => self.total_paused,
        }
    }

    /// Time since the most recent start/resume; zero unless running.
    pub fn elapsed_resumed_time(&self, now: Instant) -> Duration {
        match (self.state, self.resumed_at) {
            (TimerState::Running, Some(resumed_at)) => now.saturating_duration_since(resumed_at),
            _ => Duration::ZERO,
        }
    }

    pub fn remaining_time(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Running | TimerState::Paused => self.scheduler.as_ref()?.remaining(now),
            TimerState::Idle | TimerState::Stopped => None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state == TimerState::Stopped
    }

    pub fn is_started(&self) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Paused)
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn resume_time(&self) -> Option<Instant> {
        self.resumed_at
    }

    pub fn pause_time(&self) -> Option<Instant> {
        self.paused_at
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Option<Duration> {
        self.scheduler.as_ref().map(IntervalScheduler::interval)
    }

    pub fn next_fire_time(&self) -> Option<Instant> {
        self.scheduler.as_ref()?.next_deadline()
    }

    pub fn last_fire_time(&self) -> Option<Instant> {
        self.scheduler.as_ref()?.last_fire()
    }

    fn close_running_segment(&mut self, now: Instant) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.accumulated += now.saturating_duration_since(resumed_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TimerError;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_timer_is_idle() {
        let t0 = Instant::now();
        let core = TimerCore::stopwatch();
        assert_eq!(core.state(), TimerState::Idle);
        assert_eq!(core.elapsed_running_time(t0 + ms(500)), Duration::ZERO);
        assert_eq!(core.tick_count(), 0);
        assert!(core.start_time().is_none());
    }

    #[test]
    fn test_stopwatch_scenario() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();

        assert!(core.start(t0));
        assert!(core.pause(t0 + ms(1000)));
        assert!(core.resume(t0 + ms(2000)));

        assert_eq!(core.elapsed_running_time(t0 + ms(2500)), ms(1500));
        assert_eq!(core.total_paused_time(t0 + ms(2500)), ms(1000));
        assert_eq!(core.elapsed_started_time(t0 + ms(2500)), ms(2500));
        assert_eq!(core.elapsed_resumed_time(t0 + ms(2500)), ms(500));
    }

    #[test]
    fn test_double_pause_is_idempotent() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();
        core.start(t0);

        assert!(core.pause(t0 + ms(300)));
        assert!(!core.pause(t0 + ms(700)));

        assert_eq!(core.elapsed_running_time(t0 + ms(900)), ms(300));
        assert_eq!(core.pause_time(), Some(t0 + ms(300)));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();
        core.start(t0);

        assert!(!core.start(t0 + ms(100)));
        assert_eq!(core.start_time(), Some(t0));
        assert_eq!(core.elapsed_running_time(t0 + ms(250)), ms(250));
    }

    #[test]
    fn test_elapsed_is_sum_of_running_segments() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();

        let segments = [(0, 120), (400, 410), (1000, 1333), (2000, 2001)];
        for (begin, end) in segments {
            core.start(t0 + ms(begin));
            core.pause(t0 + ms(end));
        }

        let expected: u64 = segments.iter().map(|(b, e)| e - b).sum();
        assert_eq!(core.elapsed_running_time(t0 + ms(5000)), ms(expected));
    }

    #[test]
    fn test_stop_freezes_elapsed() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();
        core.start(t0);

        assert!(core.stop(t0 + ms(700)));
        assert!(core.is_stopped());
        assert_eq!(core.elapsed_running_time(t0 + ms(5000)), ms(700));
        assert_eq!(core.elapsed_started_time(t0 + ms(5000)), ms(700));
        assert!(!core.stop(t0 + ms(6000)));
    }

    #[test]
    fn test_stop_from_paused_keeps_accumulated() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();
        core.start(t0);
        core.pause(t0 + ms(200));

        assert!(core.stop(t0 + ms(900)));
        assert_eq!(core.elapsed_running_time(t0 + ms(1000)), ms(200));
        assert_eq!(core.total_paused_time(t0 + ms(1000)), ms(700));
        assert!(core.pause_time().is_none());
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();

        assert!(!core.pause(t0));
        assert!(!core.stop(t0));
        assert_eq!(core.state(), TimerState::Idle);
        assert!(!core.reset());
    }

    #[test]
    fn test_start_from_stopped_begins_new_session() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(100)), false, false).unwrap();
        core.start(t0);
        core.fire_due(t0 + ms(100), core.armed_epoch().unwrap()).unwrap();
        core.stop(t0 + ms(150));

        assert!(core.start(t0 + ms(1000)));
        assert_eq!(core.tick_count(), 0);
        assert_eq!(core.elapsed_running_time(t0 + ms(1000)), Duration::ZERO);
        assert_eq!(core.start_time(), Some(t0 + ms(1000)));
        assert_eq!(core.next_fire_time(), Some(t0 + ms(1100)));
    }

    #[test]
    fn test_reset_restores_initial_session() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(50)), false, false).unwrap();
        core.start(t0);
        let epoch = core.armed_epoch().unwrap();
        core.fire_due(t0 + ms(50), epoch).unwrap();
        core.pause(t0 + ms(60));

        assert!(core.reset());
        assert_eq!(core.state(), TimerState::Idle);
        assert_eq!(core.tick_count(), 0);
        assert_eq!(core.elapsed_running_time(t0 + ms(100)), Duration::ZERO);
        assert!(core.pause_time().is_none());
        assert!(core.last_fire_time().is_none());
        assert!(core.remaining_time(t0 + ms(100)).is_none());

        core.start(t0 + ms(500));
        assert_eq!(core.elapsed_running_time(t0 + ms(520)), ms(20));
        assert_eq!(core.next_fire_time(), Some(t0 + ms(550)));
    }

    #[test]
    fn test_interval_pause_resume_scenario() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(100)), false, false).unwrap();
        core.start(t0);
        let epoch = core.armed_epoch().unwrap();

        assert_eq!(core.fire_due(t0 + ms(100), epoch).unwrap().tick_count, 1);
        assert_eq!(core.fire_due(t0 + ms(200), epoch).unwrap().tick_count, 2);

        core.pause(t0 + ms(250));
        assert!(core.armed_epoch().is_none());
        assert!(core.fire_due(t0 + ms(300), epoch).is_none());
        assert_eq!(core.remaining_time(t0 + ms(300)), Some(ms(50)));

        core.resume(t0 + ms(400));
        let resumed_epoch = core.armed_epoch().unwrap();
        assert_ne!(resumed_epoch, epoch);
        assert_eq!(core.armed_deadline(resumed_epoch), Some(t0 + ms(450)));

        let tick = core.fire_due(t0 + ms(450), resumed_epoch).unwrap();
        assert_eq!(tick.tick_count, 3);
        assert_eq!(tick.elapsed, ms(300));
    }

    #[test]
    fn test_stale_epoch_does_not_fire() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(100)), false, false).unwrap();
        core.start(t0);
        let stale = core.armed_epoch().unwrap();
        core.pause(t0 + ms(10));
        core.resume(t0 + ms(20));

        assert!(core.fire_due(t0 + ms(500), stale).is_none());
        assert!(core.armed_deadline(stale).is_none());
        assert_eq!(core.tick_count(), 0);
    }

    #[test]
    fn test_fire_immediately_arms_at_start() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(100)), true, false).unwrap();
        core.start(t0);
        let epoch = core.armed_epoch().unwrap();

        let tick = core.fire_due(t0, epoch).unwrap();
        assert_eq!(tick.tick_count, 1);
        assert_eq!(tick.elapsed, Duration::ZERO);
        assert_eq!(core.next_fire_time(), Some(t0 + ms(100)));
    }

    #[test]
    fn test_run_once_stops_after_first_tick() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(50)), false, true).unwrap();
        core.start(t0);
        let epoch = core.armed_epoch().unwrap();

        let tick = core.fire_due(t0 + ms(50), epoch).unwrap();
        assert!(tick.stopped);
        assert_eq!(tick.tick_count, 1);
        assert!(core.is_stopped());
        assert!(core.armed_epoch().is_none());
        assert!(core.fire_due(t0 + ms(100), epoch).is_none());
        assert_eq!(core.tick_count(), 1);
    }

    #[test]
    fn test_catch_up_counts_one_tick() {
        let t0 = Instant::now();
        let mut core = TimerCore::new(Some(ms(100)), false, false).unwrap();
        core.start(t0);
        let epoch = core.armed_epoch().unwrap();

        let tick = core.fire_due(t0 + ms(530), epoch).unwrap();
        assert_eq!(tick.tick_count, 1);
        assert_eq!(tick.skipped, 4);
        assert_eq!(core.next_fire_time(), Some(t0 + ms(600)));
    }

    #[test]
    fn test_stopwatch_never_arms() {
        let t0 = Instant::now();
        let mut core = TimerCore::stopwatch();
        core.start(t0);

        assert!(core.armed_epoch().is_none());
        assert!(core.interval().is_none());
        assert!(core.remaining_time(t0).is_none());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = TimerCore::new(Some(Duration::ZERO), false, false);
        assert!(matches!(result, Err(TimerError::InvalidDelay(_))));
        assert!(TimerCore::new(None, false, false).is_ok());
    }
}
