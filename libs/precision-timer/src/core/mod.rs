// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod clocks;
pub mod config;
pub mod error;
pub mod prelude;
pub mod presets;
pub mod timer;

pub use clocks::*;
pub use config::*;
pub use error::*;
pub use presets::*;
pub use timer::*;
