//! Backlight PWM owner.

use defmt::info;
use embassy_rp::pwm::{Config, Pwm};
use eyes_pico2::backlight::{PWM_TOP, duty_for_percent};

use crate::channels::BACKLIGHT;

/// PWM configuration for a brightness percentage.
pub fn backlight_config(percent: u8) -> Config {
    let mut config = Config::default();
    config.top = PWM_TOP;
    config.compare_a = duty_for_percent(percent);
    config
}

/// Apply every brightness change signalled by the dispatcher.
#[embassy_executor::task]
pub async fn backlight_task(mut pwm: Pwm<'static>) {
    info!("Backlight task started");

    loop {
        let percent = BACKLIGHT.wait().await;
        pwm.set_config(&backlight_config(percent));
        info!("Backlight {}%", percent);
    }
}
