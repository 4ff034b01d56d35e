//! Compile-time configuration shared by the firmware and the simulator.

// =============================================================================
// Panel
// =============================================================================

/// Panel width in pixels (both eyes use identical 240x240 panels).
pub const SCREEN_WIDTH: u32 = 240;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

/// Bytes in one RGB565 frame.
pub const FRAME_BYTES: usize = (SCREEN_WIDTH * SCREEN_HEIGHT * 2) as usize;

// =============================================================================
// Timing
// =============================================================================

/// Sleep between scheduler ticks (~45 Hz).
pub const TICK_MS: u64 = 22;

/// Motion generator quantum while a curve or manual position is active.
pub const MOTION_QUANTUM_MS: u64 = 10;

/// Motion generator quantum while motion is disabled.
pub const MOTION_IDLE_MS: u64 = 50;

/// Minimum interval between two frames of an eye skin, logo or loading banner.
pub const SKIN_REDRAW_MS: u64 = 50;

/// Minimum interval between two frames of TV static.
pub const STATIC_REDRAW_MS: u64 = 100;

/// Interval between `handshake.request` lines while waiting for the host.
pub const HANDSHAKE_RETRY_MS: u64 = 1000;

// =============================================================================
// Motion
// =============================================================================

/// Sweep length in generator steps at speed 0.
pub const SLOWEST_SWEEP_STEPS: f32 = 620.0;

/// Sweep length in generator steps at speed 100.
pub const FASTEST_SWEEP_STEPS: f32 = 20.0;

/// Highest accepted motion speed.
pub const MAX_SPEED: u32 = 100;

/// Highest accepted backlight percentage.
pub const MAX_BACKLIGHT: u8 = 100;

// =============================================================================
// Serial link
// =============================================================================

/// Longest accepted command line (bytes, without the line terminator).
pub const MAX_LINE_LEN: usize = 96;

/// Prefix of the settings dump sent once at startup.
pub const STARTUP_DUMP_PREFIX: &str = "eye_settings.";

/// Prefix of the settings dump sent in reply to `getSettings`.
pub const QUERY_DUMP_PREFIX: &str = "eyeSettings.";

/// Line sent to the host while waiting for the handshake.
pub const HANDSHAKE_REQUEST: &str = "handshake.request";
