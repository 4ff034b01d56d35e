//! Backlight brightness to PWM duty conversion.

use eyes_common::config::MAX_BACKLIGHT;

/// PWM counter wrap value; 16-bit resolution.
pub const PWM_TOP: u16 = 0xFFFF;

/// Compare value for a brightness percentage. Values above 100 clamp.
#[inline]
pub fn duty_for_percent(percent: u8) -> u16 {
    let percent = u32::from(percent.min(MAX_BACKLIGHT));
    (percent * u32::from(PWM_TOP) / u32::from(MAX_BACKLIGHT)) as u16
}
