//! Robot eye firmware library - host-testable pieces of the Pico 2 firmware.
//!
//! The binary (`main.rs`) owns the hardware; everything here is plain data
//! handling that runs on the host as well.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p eyes-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p eyes-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod backlight;
pub mod link;
pub mod store;
