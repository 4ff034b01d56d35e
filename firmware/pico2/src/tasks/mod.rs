//! Async tasks for the eye firmware.
//!
//! Core 0:
//! - `flush`: pushes finished frames to both panels (DMA)
//! - `persist`: writes settings to flash after changes
//! - `backlight`: applies brightness changes to the PWM
//!
//! Core 1:
//! - `motion`: eye position generator
//! - `link`: UART command reader and line writer

pub mod backlight;
pub mod flush;
pub mod link;
pub mod motion;
pub mod persist;

pub use backlight::backlight_task;
pub use flush::{FLUSH_DONE, FLUSH_SIGNAL, LeftPanel, RightPanel, display_flush_task};
pub use link::{link_rx_task, link_tx_task};
pub use motion::motion_task;
pub use persist::persist_task;
