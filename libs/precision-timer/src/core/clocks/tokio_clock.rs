// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Clock;
use tokio::time::Instant;

/// Monotonic clock backed by `tokio::time::Instant`.
///
/// Under `#[tokio::test(start_paused = true)]` this follows tokio's virtual
/// time, so timers driven by it can be tested with `tokio::time::advance`.
pub struct TokioClock {
    description: String,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::with_description("Tokio Clock".to_string())
    }

    pub fn with_description(description: String) -> Self {
        Self { description }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
