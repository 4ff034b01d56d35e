//! Timing constants for the simulator.
//!
//! These use `std::time::Duration`, which is not available in `no_std`, so
//! they are derived here from the millisecond constants in the common crate.

use std::time::Duration;

use eyes_common::config::TICK_MS;

/// Scheduler tick. The main loop sleeps if the tick completes early.
pub const TICK: Duration = Duration::from_millis(TICK_MS);
