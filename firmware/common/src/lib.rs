//! Shared logic for the robot eye displays.
//!
//! This crate contains platform-agnostic code shared between the simulator
//! and the Pico 2 firmware:
//!
//! - [`curves`]: easing curves and range helpers
//! - [`motion`]: eye position generator
//! - [`state`]: display mode state machine
//! - [`settings`]: typed settings tree, dotted-path flattening
//! - [`commands`]: serial command parsing and dispatch
//! - [`skins`]: frame renderers for every visual mode
//! - [`scheduler`]: per-tick renderer selection with redraw gating
//! - [`framebuffer`]: RGB565 `DrawTarget` over a byte buffer
//! - [`assets`]: sprite provider used by the skins
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p eyes-common
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the firmware links the crate as `no_std`.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod assets;
pub mod colors;
pub mod commands;
pub mod config;
pub mod curves;
pub mod framebuffer;
pub mod motion;
pub mod redraw;
pub mod scheduler;
pub mod settings;
pub mod skins;
pub mod state;
pub mod styles;

// Re-export commonly used items
pub use commands::{Command, CommandError, Effect};
pub use framebuffer::{FrameSink, Framebuffer};
pub use motion::{EyePosition, MotionGenerator, MotionMode};
pub use scheduler::{FrameScheduler, TickInput, TickReport};
pub use settings::{Settings, SettingsError};
pub use state::{DisplayMode, PageSelection, VisualPage};
