// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Clock;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Virtual clock that only moves when told to.
///
/// Useful for exercising elapsed-time accounting without sleeping. Share it
/// with a timer through an `Arc` and call [`ManualClock::advance`] between
/// operations.
pub struct ManualClock {
    now: Mutex<Instant>,
    description: String,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self {
            now: Mutex::new(origin),
            description: "Manual Clock".to_string(),
        }
    }

    /// Advances the clock by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Moves the clock to `instant`. Earlier instants are ignored so the clock
    /// stays monotonic.
    pub fn set(&self, instant: Instant) {
        let mut now = self.now.lock();
        if instant > *now {
            *now = instant;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_on_advance() {
        let clock = ManualClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), t1);

        clock.advance(Duration::from_millis(40));
        assert_eq!(clock.now() - t1, Duration::from_millis(40));
    }

    #[test]
    fn test_manual_clock_set_is_monotonic() {
        let clock = ManualClock::new();
        let origin = clock.now();

        clock.set(origin + Duration::from_secs(2));
        clock.set(origin + Duration::from_secs(1));

        assert_eq!(clock.now() - origin, Duration::from_secs(2));
    }
}
