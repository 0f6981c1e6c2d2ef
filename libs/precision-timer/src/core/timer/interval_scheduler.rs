// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Absolute-deadline tick bookkeeping.
//!
//! The scheduler never stores a relative delay. It keeps the instant the next
//! tick is due and derives the wake-up delay from it on demand, so callback
//! latency and wake-up slack never accumulate into drift.

use crate::core::error::{Result, TimerError};
use std::time::Duration;
use tokio::time::Instant;

/// A tick the scheduler decided is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTick {
    /// Deadline the tick was scheduled for.
    pub scheduled_for: Instant,
    /// Instant the tick was actually taken.
    pub fired_at: Instant,
    /// Whole intervals that elapsed past `scheduled_for` and were skipped.
    pub skipped: u64,
}

/// Drift-corrected periodic deadline tracker.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    next_deadline: Option<Instant>,
    remaining_at_pause: Option<Duration>,
    last_fire: Option<Instant>,
}

impl IntervalScheduler {
    /// Fails with [`TimerError::InvalidDelay`] for a zero interval.
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(TimerError::InvalidDelay(
                "interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval,
            next_deadline: None,
            remaining_at_pause: None,
            last_fire: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arms a fresh schedule. The first tick is due at `now` when
    /// `fire_immediately`, otherwise one interval later.
    pub fn arm(&mut self, now: Instant, fire_immediately: bool) {
        self.remaining_at_pause = None;
        self.last_fire = None;
        self.next_deadline = Some(if fire_immediately {
            now
        } else {
            now + self.interval
        });
    }

    /// Re-arms after a pause with whatever was left of the interval in
    /// progress when the pause happened.
    pub fn rearm_after_pause(&mut self, now: Instant) {
        let remaining = self.remaining_at_pause.take().unwrap_or(self.interval);
        self.next_deadline = Some(now + remaining);
    }

    /// Disarms for a pause, freezing the time left until the pending deadline.
    pub fn disarm_for_pause(&mut self, now: Instant) {
        if let Some(deadline) = self.next_deadline.take() {
            self.remaining_at_pause = Some(deadline.saturating_duration_since(now));
        }
    }

    /// Disarms and forgets any pending remainder.
    pub fn disarm(&mut self) {
        self.next_deadline = None;
        self.remaining_at_pause = None;
    }

    /// Disarms and forgets the fire history too.
    pub fn clear(&mut self) {
        self.disarm();
        self.last_fire = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }

    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    /// Time left until the next tick. While disarmed for a pause this is the
    /// frozen remainder.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.next_deadline {
            Some(deadline) => Some(deadline.saturating_duration_since(now)),
            None => self.remaining_at_pause,
        }
    }

    /// Takes the tick due at `now`, if any, and advances the deadline past
    /// `now`. Overdue intervals are skipped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> Option<DueTick> {
        let deadline = self.next_deadline?;
        if now < deadline {
            return None;
        }

        let overdue = now.duration_since(deadline);
        let skipped = (overdue.as_nanos() / self.interval.as_nanos()) as u64;
        let advance_ns = self
            .interval
            .as_nanos()
            .saturating_mul(u128::from(skipped) + 1);
        let advance = Duration::from_nanos(u64::try_from(advance_ns).unwrap_or(u64::MAX));

        self.next_deadline = Some(deadline + advance);
        self.last_fire = Some(now);

        Some(DueTick {
            scheduled_for: deadline,
            fired_at: now,
            skipped,
        })
    }
}
