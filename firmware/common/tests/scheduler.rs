//! End-to-end runs of the frame scheduler with an in-memory framebuffer.

use embedded_graphics::prelude::*;
use eyes_common::assets::ProceduralAssets;
use eyes_common::commands::{Effect, handle_line};
use eyes_common::config::{FRAME_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH, TICK_MS};
use eyes_common::settings::Scope;
use eyes_common::{
    DisplayMode,
    EyePosition,
    FrameScheduler,
    FrameSink,
    Framebuffer,
    MotionGenerator,
    Settings,
    TickInput,
    VisualPage,
};

/// Sink that records a checksum of every pushed frame.
#[derive(Default)]
struct RecordingSink {
    frames: Vec<u64>,
}

impl FrameSink for RecordingSink {
    type Error = ();

    fn push(
        &mut self,
        frame: &[u8],
    ) -> Result<(), ()> {
        assert_eq!(frame.len(), FRAME_BYTES);
        self.frames.push(frame.iter().map(|&b| u64::from(b)).sum());
        Ok(())
    }
}

struct Rig {
    settings: Settings,
    scheduler: FrameScheduler<ProceduralAssets>,
    motion: MotionGenerator,
    buffer: Vec<u8>,
    sink: RecordingSink,
    now_ms: u64,
}

impl Rig {
    fn new(settings: Settings) -> Self {
        let panel = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        Self {
            settings,
            scheduler: FrameScheduler::new(ProceduralAssets::new(panel), 0),
            motion: MotionGenerator::new(panel),
            buffer: vec![0u8; FRAME_BYTES],
            sink: RecordingSink::default(),
            now_ms: 0,
        }
    }

    /// Run ticks until `until_ms`, returning the modes entered and handshake requests sent.
    fn run(
        &mut self,
        until_ms: u64,
        mut handshake_at: Option<u64>,
    ) -> (Vec<DisplayMode>, usize) {
        let mut modes = Vec::new();
        let mut requests = 0;
        while self.now_ms <= until_ms {
            let handshake = handshake_at.is_some_and(|at| self.now_ms >= at);
            if handshake {
                handshake_at = None;
            }
            let eye = self
                .motion
                .advance(self.settings.states.motion, &self.settings.motions)
                .position
                .unwrap_or(EyePosition::from_point(self.settings.motions.center_point));
            let mut fb = Framebuffer::new(&mut self.buffer, SCREEN_WIDTH, SCREEN_HEIGHT).unwrap();
            let input = TickInput {
                now_ms: self.now_ms,
                settings: &self.settings,
                eye,
                handshake_complete: handshake,
            };
            let report = self.scheduler.tick_into(&input, &mut fb, &mut self.sink).unwrap();
            if report.mode_changed {
                modes.push(report.mode);
            }
            if report.request_handshake {
                requests += 1;
            }
            self.now_ms += TICK_MS;
        }
        (modes, requests)
    }
}

#[test]
fn test_boot_sequence_lands_on_persisted_page() {
    let settings = Settings::from_flat("states.page=4\nlogo_format.duration=300\n").unwrap();
    let mut rig = Rig::new(settings);

    let (modes, requests) = rig.run(2000, Some(1500));

    assert_eq!(modes, vec![DisplayMode::WaitHandshake, DisplayMode::Home(VisualPage::EyeMetal)]);
    // entered WaitHandshake at 308 ms, retried at 1320 ms
    assert_eq!(requests, 2);
}

#[test]
fn test_handshake_never_arrives() {
    let mut settings = Settings::default();
    settings.logo_format.duration = 0;
    let mut rig = Rig::new(settings);

    let (modes, requests) = rig.run(10_000, None);

    assert_eq!(modes, vec![DisplayMode::WaitHandshake]);
    assert_eq!(requests, 10);
    assert_eq!(rig.scheduler.mode(), DisplayMode::WaitHandshake);
}

#[test]
fn test_tv_static_pushes_at_half_the_skin_rate() {
    let mut settings = Settings::from_flat("states.page=3\n").unwrap();
    settings.logo_format.duration = 0;
    let mut rig = Rig::new(settings);
    rig.run(0, Some(0));

    let before = rig.sink.frames.len();
    rig.run(1000, None);
    let skin_frames = rig.sink.frames.len() - before;

    assert_eq!(handle_line(&mut rig.settings, "setState=2").unwrap(), Effect::Saved);
    let before = rig.sink.frames.len();
    rig.run(2000, None);
    let static_frames = rig.sink.frames.len() - before;

    // 22 ms ticks: a 50 ms gate opens every 3rd tick, a 100 ms gate every 5th
    assert!((14..=17).contains(&skin_frames), "skin pushed {skin_frames}");
    assert!((9..=11).contains(&static_frames), "static pushed {static_frames}");
}

#[test]
fn test_set_state_switches_to_error_banner() {
    let mut settings = Settings::default();
    settings.logo_format.duration = 0;
    let mut rig = Rig::new(settings);
    rig.run(100, Some(0));
    assert_eq!(rig.scheduler.mode(), DisplayMode::Home(VisualPage::EyeSimple));

    handle_line(&mut rig.settings, "setError=7").unwrap();
    handle_line(&mut rig.settings, "setState=1").unwrap();
    let before = rig.sink.frames.len();
    let (modes, _) = rig.run(1200, None);

    assert_eq!(modes, vec![DisplayMode::Error]);
    // flash_speed 500 ms: entry frame plus two toggles
    let frames = &rig.sink.frames[before..];
    assert_eq!(frames.len(), 3);
    assert_ne!(frames[0], frames[1]);
    assert_eq!(frames[0], frames[2]);
}

#[test]
fn test_simple_eye_follows_sweep() {
    let mut settings = Settings::default();
    settings.logo_format.duration = 0;
    let mut rig = Rig::new(settings);
    rig.run(0, Some(0));

    let before = rig.sink.frames.len();
    rig.run(2000, None);
    let frames = &rig.sink.frames[before..];

    // the iris moves, so consecutive frames differ at least once
    assert!(frames.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_query_dump_excludes_error_format() {
    let settings = Settings::default();
    assert!(settings.leaves(Scope::Dump).all(|leaf| !leaf.path.starts_with("error_format.")));
    assert!(settings.leaves(Scope::Full).any(|leaf| leaf.path.starts_with("error_format.")));
}
