// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Tick driver - the cancellable wake-up registration behind an armed timer.
//!
//! One task per arming epoch. Each iteration re-reads the absolute deadline,
//! sleeps for `deadline - now`, then asks the core for the due tick. The task
//! only holds a `Weak` reference between wake-ups so dropping the last
//! [`Timer`](super::Timer) handle is enough to end it.

use super::facade::{FireOutcome, TimerInner};
use std::sync::Weak;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub(crate) fn spawn(runtime: &Handle, inner: Weak<TimerInner>, epoch: u64) -> JoinHandle<()> {
    runtime.spawn(run(inner, epoch))
}

async fn run(inner: Weak<TimerInner>, epoch: u64) {
    tracing::trace!("[IntervalScheduler] Driver armed for epoch {}", epoch);

    loop {
        let Some(delay) = inner.upgrade().and_then(|inner| inner.delay_until_due(epoch)) else {
            break;
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match inner.upgrade().map(|inner| inner.fire_due(epoch)) {
            Some(FireOutcome::Fired) | Some(FireOutcome::NotDue) => {}
            Some(FireOutcome::Disarmed) | None => break,
        }
    }

    tracing::trace!("[IntervalScheduler] Driver for epoch {} exited", epoch);
}
