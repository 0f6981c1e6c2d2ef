// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Invalid delay: {0}")]
    InvalidDelay(String),

    #[error("Missing delay: {0}")]
    MissingDelay(String),

    #[error("Missing callback: {0}")]
    MissingCallback(String),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TimerError>;
