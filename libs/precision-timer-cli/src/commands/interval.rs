// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Interval command - runs a periodic timer and reports how far each tick
//! landed from the ideal grid.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use precision_timer::{Timer, TimerConfig, TimerSettings};
use tokio::sync::mpsc;

use super::format_secs;

pub struct IntervalOptions {
    pub delay_ms: Option<u64>,
    pub ticks: u64,
    pub fire_immediately: bool,
    pub work_ms: u64,
    pub config: Option<PathBuf>,
}

struct TickReport {
    tick: u64,
    elapsed: Duration,
    offset: Duration,
}

/// How far past the last grid point `elapsed` is. The grid is the same with
/// or without `fire_immediately`; resume preserves it too.
fn grid_offset(elapsed: Duration, delay: Duration) -> Duration {
    let phase = elapsed.as_nanos() % delay.as_nanos();
    Duration::from_nanos(u64::try_from(phase).unwrap_or(u64::MAX))
}

fn resolve_settings(options: &IntervalOptions) -> Result<TimerSettings> {
    let mut settings = match &options.config {
        Some(path) => TimerSettings::load(path)
            .with_context(|| format!("Failed to load timer settings from {}", path.display()))?,
        None => TimerSettings::default(),
    };

    if let Some(delay_ms) = options.delay_ms {
        settings.delay_ms = Some(delay_ms);
    }
    if options.fire_immediately {
        settings.fire_immediately = true;
    }
    Ok(settings)
}

pub async fn run(options: IntervalOptions) -> Result<()> {
    let settings = resolve_settings(&options)?;
    let delay = settings
        .delay()
        .ok_or_else(|| anyhow!("No delay configured: pass --delay-ms or set delay_ms"))?;
    let target = if settings.run_once { 1 } else { options.ticks };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let work = Duration::from_millis(options.work_ms);

    let config = TimerConfig::from_settings(&settings).with_callback(move |elapsed, tick| {
        let _ = tx.send(TickReport {
            tick,
            elapsed,
            offset: grid_offset(elapsed, delay),
        });
        if !work.is_zero() {
            std::thread::sleep(work);
        }
    });
    let timer = Timer::new(config).context("Failed to create interval timer")?;

    tracing::info!(
        "running {} ticks every {:?} (fire_immediately={}, work={:?})",
        target,
        delay,
        settings.fire_immediately,
        work
    );
    timer.start();

    let mut received = 0u64;
    let mut skipped = 0u64;
    let mut last_slot: Option<u128> = None;
    let mut max_offset = Duration::ZERO;
    let mut total_offset = Duration::ZERO;

    while received < target {
        let Some(report) = rx.recv().await else {
            break;
        };
        received += 1;

        let slot = report.elapsed.as_nanos() / delay.as_nanos();
        if let Some(previous) = last_slot {
            skipped += u64::try_from(slot.saturating_sub(previous + 1)).unwrap_or(u64::MAX);
        }
        last_slot = Some(slot);

        max_offset = max_offset.max(report.offset);
        total_offset += report.offset;
        tracing::info!(
            "tick {:>4} at {} (+{:?} from grid)",
            report.tick,
            format_secs(report.elapsed),
            report.offset
        );
    }

    timer.stop();

    let mean_offset = match u32::try_from(received) {
        Ok(count) if count > 0 => total_offset / count,
        _ => Duration::ZERO,
    };
    println!(
        "{} ticks in {}: mean offset {:?}, max offset {:?}, {} skipped",
        received,
        format_secs(timer.elapsed_running_time()),
        mean_offset,
        max_offset,
        skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> IntervalOptions {
        IntervalOptions {
            delay_ms: None,
            ticks: 3,
            fire_immediately: false,
            work_ms: 0,
            config: None,
        }
    }

    #[test]
    fn test_grid_offset() {
        let delay = Duration::from_millis(100);
        assert_eq!(grid_offset(Duration::from_millis(300), delay), Duration::ZERO);
        assert_eq!(
            grid_offset(Duration::from_millis(412), delay),
            Duration::from_millis(12)
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let mut opts = options();
        opts.delay_ms = Some(40);
        opts.fire_immediately = true;

        let settings = resolve_settings(&opts).unwrap();
        assert_eq!(settings.delay_ms, Some(40));
        assert!(settings.fire_immediately);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let mut opts = options();
        opts.config = Some(PathBuf::from("/nonexistent/ptimer.toml"));
        assert!(resolve_settings(&opts).is_err());
    }
}
