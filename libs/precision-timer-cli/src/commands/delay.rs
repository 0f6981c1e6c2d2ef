// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! One-shot delay command.

use std::time::Duration;

use anyhow::{Context, Result};
use precision_timer::delay as one_shot;
use tokio::sync::oneshot;

use super::format_secs;

pub async fn run(delay_ms: u64) -> Result<()> {
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);

    let timer = one_shot(Duration::from_millis(delay_ms), move |elapsed, _| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(elapsed);
        }
    })
    .context("Failed to create delay timer")?;

    let elapsed = rx.await.context("Delay timer dropped before firing")?;
    tracing::debug!("delay timer state after firing: {}", timer.state());

    println!("fired after {}", format_secs(elapsed));
    Ok(())
}
