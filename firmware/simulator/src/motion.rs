//! Motion thread.

use std::thread;
use std::time::Duration;

use embedded_graphics::prelude::Size;
use eyes_common::MotionGenerator;
use eyes_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use log::info;

use crate::shared::Shared;

/// Thread body: advance the generator forever, publishing each position.
pub fn run(shared: &Shared) -> ! {
    info!("motion thread started");
    let mut generator = MotionGenerator::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

    loop {
        let (mode, motions) = {
            let settings = shared.snapshot();
            (settings.states.motion, settings.motions)
        };

        let step = generator.advance(mode, &motions);
        if let Some(position) = step.position {
            shared.set_eye(position);
        }

        thread::sleep(Duration::from_millis(step.sleep_ms));
    }
}
