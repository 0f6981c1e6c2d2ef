// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! ptimer
//!
//! Command-line driver for the precision-timer engine: run a stopwatch, an
//! interval timer with drift reporting, or a one-shot delay.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ptimer")]
#[command(author, version, about = "Drift-corrected stopwatch and interval timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count elapsed time, logging a lap line periodically
    Stopwatch {
        /// How long to run before stopping
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        /// Interval between lap lines
        #[arg(long, default_value_t = 1000)]
        lap_ms: u64,

        /// Pause for this many milliseconds halfway through
        #[arg(long)]
        pause_ms: Option<u64>,
    },

    /// Fire a callback every DELAY_MS and report drift from the ideal schedule
    Interval {
        /// Tick period in milliseconds (overrides the settings file)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Number of ticks to collect before stopping
        #[arg(long, default_value_t = 20)]
        ticks: u64,

        /// Fire the first tick at start time
        #[arg(long)]
        fire_immediately: bool,

        /// Simulated callback work per tick, in milliseconds
        #[arg(long, default_value_t = 0)]
        work_ms: u64,

        /// Timer settings file (.toml or .json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Fire once after DELAY_MS
    Delay {
        /// Delay in milliseconds
        #[arg(long)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Stopwatch {
            seconds,
            lap_ms,
            pause_ms,
        } => commands::stopwatch::run(seconds, lap_ms, pause_ms).await,
        Commands::Interval {
            delay_ms,
            ticks,
            fire_immediately,
            work_ms,
            config,
        } => {
            let options = commands::interval::IntervalOptions {
                delay_ms,
                ticks,
                fire_immediately,
                work_ms,
                config,
            };
            commands::interval::run(options).await
        }
        Commands::Delay { delay_ms } => commands::delay::run(delay_ms).await,
    }
}
