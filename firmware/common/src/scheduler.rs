//! Fixed-rate frame scheduler.
//!
//! The platform calls [`FrameScheduler::tick`] every [`crate::config::TICK_MS`].
//! Each tick advances the [`DisplayStateMachine`], picks the renderer for the
//! active mode and runs it only if that renderer's [`RedrawGate`] is open, so
//! the tick rate and the pixel-push rate are independent.
//!
//! | Mode | Gate interval |
//! |------|---------------|
//! | Logo, loading, eye skins | [`SKIN_REDRAW_MS`] |
//! | TV static | [`STATIC_REDRAW_MS`] |
//! | Error | `error_format.flash_speed` |

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::assets::ImageProvider;
use crate::config::{HANDSHAKE_RETRY_MS, SKIN_REDRAW_MS, STATIC_REDRAW_MS};
use crate::framebuffer::{FrameSink, Framebuffer};
use crate::motion::EyePosition;
use crate::redraw::RedrawGate;
use crate::settings::Settings;
use crate::skins::{ErrorBanner, TvStatic, draw_loading, draw_logo, draw_metal, draw_neon, draw_simple};
use crate::state::{DisplayMode, DisplayStateMachine, VisualPage};

/// Everything a tick reads from shared state.
#[derive(Clone, Copy, Debug)]
pub struct TickInput<'a> {
    /// Monotonic milliseconds since boot.
    pub now_ms: u64,
    /// Settings snapshot for this tick.
    pub settings: &'a Settings,
    /// Latest eye position from the motion generator.
    pub eye: EyePosition,
    /// The host completed the handshake since the previous tick.
    pub handshake_complete: bool,
}

/// What happened during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Mode after the tick.
    pub mode: DisplayMode,
    /// The mode changed during this tick.
    pub mode_changed: bool,
    /// A new frame was composed and must be pushed to the sinks.
    pub frame_ready: bool,
    /// A `handshake.request` line must be sent to the host.
    pub request_handshake: bool,
}

/// Redraw gates, one per renderer.
#[derive(Clone, Copy, Debug)]
struct Gates {
    logo: RedrawGate,
    loading: RedrawGate,
    error: RedrawGate,
    pages: [RedrawGate; 4],
}

impl Gates {
    const fn new() -> Self {
        Self {
            logo: RedrawGate::new(SKIN_REDRAW_MS),
            loading: RedrawGate::new(SKIN_REDRAW_MS),
            error: RedrawGate::new(SKIN_REDRAW_MS),
            pages: [
                RedrawGate::new(STATIC_REDRAW_MS),
                RedrawGate::new(SKIN_REDRAW_MS),
                RedrawGate::new(SKIN_REDRAW_MS),
                RedrawGate::new(SKIN_REDRAW_MS),
            ],
        }
    }

    fn for_mode(
        &mut self,
        mode: DisplayMode,
    ) -> &mut RedrawGate {
        match mode {
            DisplayMode::Logo => &mut self.logo,
            DisplayMode::WaitHandshake => &mut self.loading,
            DisplayMode::Error => &mut self.error,
            DisplayMode::Home(page) => &mut self.pages[page_slot(page)],
        }
    }
}

const fn page_slot(page: VisualPage) -> usize {
    match page {
        VisualPage::TvStatic => 0,
        VisualPage::EyeSimple => 1,
        VisualPage::EyeMetal => 2,
        VisualPage::EyeNeon => 3,
    }
}

/// Drives the display state machine and the renderers.
pub struct FrameScheduler<A> {
    machine: DisplayStateMachine,
    gates: Gates,
    error_banner: ErrorBanner,
    noise: TvStatic,
    last_handshake_request_ms: Option<u64>,
    assets: A,
}

impl<A: ImageProvider> FrameScheduler<A> {
    /// Start in Logo at `now_ms`.
    pub fn new(
        assets: A,
        now_ms: u64,
    ) -> Self {
        Self {
            machine: DisplayStateMachine::new(now_ms),
            gates: Gates::new(),
            error_banner: ErrorBanner::new(),
            noise: TvStatic::new(now_ms as u32),
            last_handshake_request_ms: None,
            assets,
        }
    }

    /// Current display mode.
    #[inline]
    pub const fn mode(&self) -> DisplayMode { self.machine.mode() }

    /// Run one tick, composing into `target` if the active gate opens.
    pub fn tick<D>(
        &mut self,
        input: &TickInput<'_>,
        target: &mut D,
    ) -> Result<TickReport, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let settings = input.settings;
        let now = input.now_ms;

        let mode_changed = self.machine.update(
            now,
            u64::from(settings.logo_format.duration),
            settings.states.page,
            input.handshake_complete,
        );
        let mode = self.machine.mode();
        if mode_changed {
            self.gates.for_mode(mode).reset();
        }

        let request_handshake = mode == DisplayMode::WaitHandshake && self.handshake_due(now);

        if mode == DisplayMode::Error {
            self.gates.error.set_interval(u64::from(settings.error_format.flash_speed));
        }
        let frame_ready = self.gates.for_mode(mode).try_open(now);
        if frame_ready {
            self.render(mode, input, target)?;
        }

        Ok(TickReport {
            mode,
            mode_changed,
            frame_ready,
            request_handshake,
        })
    }

    /// Run one tick into a framebuffer and push the frame to `sink` if one was composed.
    pub fn tick_into<S: FrameSink>(
        &mut self,
        input: &TickInput<'_>,
        framebuffer: &mut Framebuffer<'_>,
        sink: &mut S,
    ) -> Result<TickReport, S::Error> {
        let Ok(report) = self.tick(input, framebuffer);
        if report.frame_ready {
            sink.push(framebuffer.as_bytes())?;
        }
        Ok(report)
    }

    fn handshake_due(
        &mut self,
        now_ms: u64,
    ) -> bool {
        let due = self
            .last_handshake_request_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= HANDSHAKE_RETRY_MS);
        if due {
            self.last_handshake_request_ms = Some(now_ms);
        }
        due
    }

    fn render<D>(
        &mut self,
        mode: DisplayMode,
        input: &TickInput<'_>,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let settings = input.settings;
        match mode {
            DisplayMode::Logo => draw_logo(target, &settings.logo_format, &self.assets),
            DisplayMode::WaitHandshake => draw_loading(target, &settings.loading_format),
            DisplayMode::Error => self.error_banner.draw(target, &settings.error_format, settings.states.error),
            DisplayMode::Home(VisualPage::TvStatic) => self.noise.draw(target),
            DisplayMode::Home(page @ VisualPage::EyeSimple) => {
                draw_simple(target, input.eye, &settings.skin(skin_key(page)))
            }
            DisplayMode::Home(page @ VisualPage::EyeMetal) => {
                draw_metal(target, input.eye, &settings.skin(skin_key(page)), &self.assets)
            }
            DisplayMode::Home(page @ VisualPage::EyeNeon) => draw_neon(
                target,
                input.eye,
                &settings.skin(skin_key(page)),
                &settings.motions,
                &self.assets,
            ),
        }
    }
}

fn skin_key(page: VisualPage) -> &'static str { page.skin_key().unwrap_or_default() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProceduralAssets;
    use crate::config::FRAME_BYTES;
    use crate::state::PageSelection;

    const PANEL: Size = Size::new(240, 240);

    fn scheduler() -> FrameScheduler<ProceduralAssets> { FrameScheduler::new(ProceduralAssets::new(PANEL), 0) }

    fn input(
        settings: &Settings,
        now_ms: u64,
        handshake_complete: bool,
    ) -> TickInput<'_> {
        TickInput {
            now_ms,
            settings,
            eye: EyePosition::new(120.0, 120.0),
            handshake_complete,
        }
    }

    #[test]
    fn test_handshake_requests_repeat_every_second() {
        let mut settings = Settings::default();
        settings.logo_format.duration = 0;
        let mut sched = scheduler();
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut fb = Framebuffer::new(&mut buf, 240, 240).unwrap();

        let mut requests = Vec::new();
        for now in (0..=2500).step_by(22) {
            let report = sched.tick(&input(&settings, now, false), &mut fb).unwrap();
            if report.request_handshake {
                requests.push(now);
            }
        }
        assert_eq!(requests, vec![0, 1012, 2024]);
        assert_eq!(sched.mode(), DisplayMode::WaitHandshake);
    }

    #[test]
    fn test_error_gate_uses_flash_speed() {
        let mut settings = Settings::default();
        settings.logo_format.duration = 0;
        settings.states.page = PageSelection::Error;
        settings.error_format.flash_speed = 200;
        let mut sched = scheduler();
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut fb = Framebuffer::new(&mut buf, 240, 240).unwrap();

        sched.tick(&input(&settings, 0, false), &mut fb).unwrap();
        let entered = sched.tick(&input(&settings, 10, true), &mut fb).unwrap();
        assert_eq!(entered.mode, DisplayMode::Error);
        assert!(entered.frame_ready);

        let frames = (1..=20)
            .map(|i| sched.tick(&input(&settings, 10 + i * 20, false), &mut fb).unwrap())
            .filter(|r| r.frame_ready)
            .count();
        // 400 ms at a 200 ms flash interval
        assert_eq!(frames, 2);
    }

    #[test]
    fn test_page_switch_draws_immediately() {
        let mut settings = Settings::default();
        settings.logo_format.duration = 0;
        let mut sched = scheduler();
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut fb = Framebuffer::new(&mut buf, 240, 240).unwrap();

        sched.tick(&input(&settings, 0, false), &mut fb).unwrap();
        let home = sched.tick(&input(&settings, 5, true), &mut fb).unwrap();
        assert_eq!(home.mode, DisplayMode::Home(VisualPage::EyeSimple));

        settings.states.page = PageSelection::Visual(VisualPage::TvStatic);
        let report = sched.tick(&input(&settings, 10, false), &mut fb).unwrap();
        assert!(report.mode_changed);
        assert!(report.frame_ready);
        assert_eq!(report.mode, DisplayMode::Home(VisualPage::TvStatic));
    }

    #[derive(Default)]
    struct CountingSink {
        frames: usize,
    }

    impl FrameSink for CountingSink {
        type Error = ();

        fn push(
            &mut self,
            frame: &[u8],
        ) -> Result<(), ()> {
            assert_eq!(frame.len(), FRAME_BYTES);
            self.frames += 1;
            Ok(())
        }
    }

    #[test]
    fn test_boot_to_home_over_commands() {
        use crate::commands::{Effect, handle_line};

        let mut settings = Settings::default();
        settings.logo_format.duration = 100;
        let mut sched = scheduler();
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut fb = Framebuffer::new(&mut buf, 240, 240).unwrap();
        let mut sink = CountingSink::default();

        let mut now = 0;
        let mut handshake = false;
        let mut sent = false;
        let mut modes = vec![sched.mode()];
        while now <= 1000 {
            if now >= 500 && !sent {
                sent = true;
                assert_eq!(handle_line(&mut settings, "setState=5").unwrap(), Effect::Saved);
                handshake = handle_line(&mut settings, "handshake.complete").unwrap() == Effect::HandshakeComplete;
            }
            let report = sched.tick_into(&input(&settings, now, handshake), &mut fb, &mut sink).unwrap();
            handshake = false;
            if report.mode_changed {
                modes.push(report.mode);
            }
            now += 22;
        }

        assert_eq!(
            modes,
            vec![
                DisplayMode::Logo,
                DisplayMode::WaitHandshake,
                DisplayMode::Home(VisualPage::EyeNeon),
            ]
        );
        // ~46 ticks at 22 ms, gated at 50 ms: roughly every third tick pushes
        assert!(sink.frames > 10 && sink.frames < 25, "pushed {}", sink.frames);
    }
}

