// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Stopwatch command.

use std::time::Duration;

use anyhow::{Context, Result};
use precision_timer::{interval_timer, stopwatch};

use super::format_secs;

pub async fn run(seconds: u64, lap_ms: u64, pause_ms: Option<u64>) -> Result<()> {
    let watch = stopwatch();

    let lap_watch = watch.clone();
    let laps = interval_timer(Duration::from_millis(lap_ms), move |_, lap| {
        tracing::info!(
            "lap {}: {} running, {} paused",
            lap,
            format_secs(lap_watch.elapsed_running_time()),
            format_secs(lap_watch.total_paused_time())
        );
    })
    .context("Failed to create lap timer")?;

    let total = Duration::from_secs(seconds);
    watch.start();
    laps.start();

    match pause_ms {
        Some(pause_ms) => {
            let first_half = total / 2;
            tokio::time::sleep(first_half).await;

            watch.pause();
            tracing::info!("paused at {}", format_secs(watch.elapsed_running_time()));
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;
            watch.resume();
            tracing::info!("resumed");

            tokio::time::sleep(total - first_half).await;
        }
        None => tokio::time::sleep(total).await,
    }

    laps.stop();
    watch.stop();

    println!(
        "elapsed {} running, {} since start, {} paused",
        format_secs(watch.elapsed_running_time()),
        format_secs(watch.elapsed_started_time()),
        format_secs(watch.total_paused_time())
    );
    Ok(())
}
