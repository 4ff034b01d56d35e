//! Robot eye simulator for desktop platforms.
//!
//! Runs the same scheduler and renderers as the firmware against a window
//! showing both panels. Commands are read from stdin one per line and
//! outgoing lines (settings dumps, handshake requests) go to stdout, so a
//! host program can drive the simulator over a pipe exactly as it would the
//! serial link.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod args;
mod link;
mod motion;
mod shared;
mod store;
mod timing;
mod window;

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use embedded_graphics::prelude::Size;
use embedded_graphics_simulator::SimulatorEvent;
use eyes_common::assets::ProceduralAssets;
use eyes_common::config::{FRAME_BYTES, HANDSHAKE_REQUEST, SCREEN_HEIGHT, SCREEN_WIDTH, STARTUP_DUMP_PREFIX};
use eyes_common::{FrameScheduler, Framebuffer, Settings, TickInput};
use log::{debug, info};

use crate::args::Args;
use crate::shared::Shared;
use crate::timing::TICK;
use crate::window::{EyeWindow, key_command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.write_defaults {
        store::save(&args.settings, &Settings::default())?;
        info!("wrote defaults to {}", args.settings.display());
        return Ok(());
    }

    let settings = store::load(&args.settings)?;
    info!("loaded settings from {}", args.settings.display());

    let (outbox, outgoing) = mpsc::channel();
    let shared = Shared::new(settings, outbox, args.settings.clone());

    thread::Builder::new()
        .name("writer".into())
        .spawn(move || link::write_lines(&outgoing))
        .context("spawning writer thread")?;
    let reader = shared.clone();
    thread::Builder::new()
        .name("commands".into())
        .spawn(move || link::read_commands(&reader))
        .context("spawning command thread")?;
    let motion = shared.clone();
    thread::Builder::new()
        .name("motion".into())
        .spawn(move || motion::run(&motion))
        .context("spawning motion thread")?;

    shared.send_dump(STARTUP_DUMP_PREFIX);

    let panel = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut window = EyeWindow::new(args.scale, shared.snapshot().display.backlight);
    let mut buffer = vec![0u8; FRAME_BYTES];
    let mut framebuffer =
        Framebuffer::new(&mut buffer, SCREEN_WIDTH, SCREEN_HEIGHT).context("framebuffer smaller than a frame")?;

    let start = Instant::now();
    let mut scheduler = FrameScheduler::new(ProceduralAssets::new(panel), 0);
    let mut frames = 0u32;

    loop {
        let tick_start = Instant::now();
        let mut settings = shared.snapshot();

        let mut commands = Vec::new();
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => {
                    info!("window closed after {frames} frames");
                    return Ok(());
                }
                SimulatorEvent::KeyDown { keycode, repeat: false, .. } => commands.extend(key_command(keycode, &settings)),
                _ => {}
            }
        }
        if !commands.is_empty() {
            for line in &commands {
                link::handle_line(&shared, line);
            }
            settings = shared.snapshot();
        }

        window.set_backlight(settings.display.backlight);
        let input = TickInput {
            now_ms: start.elapsed().as_millis() as u64,
            settings: &settings,
            eye: shared.eye(),
            handshake_complete: shared.take_handshake(),
        };
        let Ok(report) = scheduler.tick_into(&input, &mut framebuffer, &mut window);

        if report.mode_changed {
            info!("display mode {:?}", report.mode);
        }
        if report.request_handshake {
            debug!("requesting handshake");
            shared.send(HANDSHAKE_REQUEST.into());
        }
        if report.frame_ready {
            frames = frames.wrapping_add(1);
        }

        if let Some(rest) = TICK.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}
