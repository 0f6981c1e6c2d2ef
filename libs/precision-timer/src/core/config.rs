// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timer Configuration Types
//!
//! [`TimerConfig`] is what a [`Timer`](crate::core::timer::Timer) is built
//! from. [`TimerSettings`] is its serialisable subset (everything except the
//! callback) so delays and flags can live in TOML or JSON files.

use crate::core::error::{Result, TimerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Callback invoked on every tick with the elapsed running time and the
/// session's tick count (1 for the first tick).
pub type TickCallback = Box<dyn FnMut(Duration, u64) + Send + 'static>;

/// Construction options for a timer.
#[derive(Default)]
pub struct TimerConfig {
    /// Target tick period. Required (and non-zero) when a callback is set.
    pub delay: Option<Duration>,
    /// Invoked on every tick.
    pub callback: Option<TickCallback>,
    /// Fire the first tick at start time instead of one delay later.
    pub fire_immediately: bool,
    /// Stop automatically after exactly one tick.
    pub run_once: bool,
    /// Start the timer as part of construction.
    pub start_immediately: bool,
}

impl TimerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &TimerSettings) -> Self {
        Self {
            delay: settings.delay(),
            callback: None,
            fire_immediately: settings.fire_immediately,
            run_once: settings.run_once,
            start_immediately: settings.start_immediately,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Duration, u64) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn fire_immediately(mut self, fire_immediately: bool) -> Self {
        self.fire_immediately = fire_immediately;
        self
    }

    pub fn run_once(mut self, run_once: bool) -> Self {
        self.run_once = run_once;
        self
    }

    pub fn start_immediately(mut self, start_immediately: bool) -> Self {
        self.start_immediately = start_immediately;
        self
    }

    /// Rejects configurations that cannot produce an absolute-deadline schedule.
    pub fn validate(&self) -> Result<()> {
        match self.delay {
            Some(delay) if delay.is_zero() => {
                return Err(TimerError::InvalidDelay(
                    "delay must be greater than zero".to_string(),
                ));
            }
            Some(_) => {}
            None if self.callback.is_some() => {
                return Err(TimerError::MissingDelay(
                    "a callback requires a positive delay".to_string(),
                ));
            }
            None if self.run_once => {
                return Err(TimerError::MissingDelay(
                    "run_once requires a positive delay".to_string(),
                ));
            }
            None => {}
        }

        if self.fire_immediately && self.delay.is_none() {
            tracing::warn!("[TimerConfig] fire_immediately has no effect without a delay");
        }

        Ok(())
    }
}

impl std::fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerConfig")
            .field("delay", &self.delay)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("fire_immediately", &self.fire_immediately)
            .field("run_once", &self.run_once)
            .field("start_immediately", &self.start_immediately)
            .finish()
    }
}

/// Serialisable timer options.
///
/// ```toml
/// delay_ms = 100
/// fire_immediately = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerSettings {
    /// Tick period in milliseconds.
    pub delay_ms: Option<u64>,
    pub fire_immediately: bool,
    pub run_once: bool,
    pub start_immediately: bool,
}

impl TimerSettings {
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| TimerError::Settings(e.to_string()))
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| TimerError::Settings(e.to_string()))
    }

    /// Loads settings from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            Some("json") => Self::from_json_str(&source),
            other => Err(TimerError::Settings(format!(
                "unsupported settings file extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}
