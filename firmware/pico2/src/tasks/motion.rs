//! Eye motion task.

use defmt::info;
use embassy_sync::watch::DynSender;
use embassy_time::Timer;
use embedded_graphics::prelude::Size;
use eyes_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use eyes_common::{EyePosition, MotionGenerator};

use crate::channels::SharedSettings;

/// Advance the motion generator forever, publishing each new position.
///
/// The sleep between steps comes from the generator: short while moving,
/// longer while motion is disabled.
#[embassy_executor::task]
pub async fn motion_task(
    sender: DynSender<'static, EyePosition>,
    settings: &'static SharedSettings,
) {
    info!("Motion task started");

    let mut generator = MotionGenerator::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

    loop {
        let (mode, motions) = settings.lock(|cell| {
            let settings = cell.borrow();
            (settings.states.motion, settings.motions)
        });

        let step = generator.advance(mode, &motions);
        if let Some(position) = step.position {
            sender.send(position);
        }

        Timer::after_millis(step.sleep_ms).await;
    }
}
