//! Eye motion generator.
//!
//! The generator is a pure state machine: each call to
//! [`MotionGenerator::advance`] computes the next eye position for the active
//! [`MotionMode`] and tells the caller how long to sleep before calling again.
//! The firmware drives it from an embassy task, the simulator from a thread.

use embedded_graphics::prelude::{Point, Size};

use crate::config::{
    FASTEST_SWEEP_STEPS,
    MAX_SPEED,
    MOTION_IDLE_MS,
    MOTION_QUANTUM_MS,
    SLOWEST_SWEEP_STEPS,
};
use crate::curves::{ease_in_out_cubic, map_range, reflect, step_jump};
use crate::settings::MotionSettings;

/// Period of the sweep phase fed to [`reflect`].
const SWEEP_PERIOD: f32 = 1.0;

// =============================================================================
// Motion Mode
// =============================================================================

/// How the eye position is produced. Persisted as `states.motion`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionMode {
    /// Eye stays where it is.
    Disabled,
    /// Smooth eased sweep between the left and right points.
    #[default]
    LeftRight,
    /// Stepped left / center / right holds.
    Jump,
    /// Eye follows `motions.pos`.
    Manual,
}

impl MotionMode {
    /// All modes in `states.motion` index order.
    pub const ALL: [Self; 4] = [Self::Disabled, Self::LeftRight, Self::Jump, Self::Manual];

    /// Mode for a settings index, `None` if out of range.
    pub fn from_index(index: u32) -> Option<Self> { Self::ALL.get(index as usize).copied() }

    /// Index as stored in settings.
    pub const fn index(self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::LeftRight => 1,
            Self::Jump => 2,
            Self::Manual => 3,
        }
    }
}

// =============================================================================
// Eye Position
// =============================================================================

/// Eye center in panel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EyePosition {
    pub x: f32,
    pub y: f32,
}

impl EyePosition {
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }

    /// Position of an integer point.
    pub fn from_point(point: Point) -> Self { Self::new(point.x as f32, point.y as f32) }

    /// Nearest pixel.
    pub fn to_point(self) -> Point {
        Point::new(micromath::F32(self.x).round().0 as i32, micromath::F32(self.y).round().0 as i32)
    }

    /// Clamp into a panel of the given size.
    #[must_use]
    pub fn clamped(
        self,
        bounds: Size,
    ) -> Self {
        let max_x = bounds.width.saturating_sub(1) as f32;
        let max_y = bounds.height.saturating_sub(1) as f32;
        Self::new(self.x.clamp(0.0, max_x), self.y.clamp(0.0, max_y))
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Result of one generator iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStep {
    /// New eye position, `None` when the eye should stay put.
    pub position: Option<EyePosition>,
    /// Delay before the next iteration.
    pub sleep_ms: u64,
}

/// Sweep length in generator steps for a speed setting (clamped to 0..=100).
///
/// Higher speed means fewer steps and a faster sweep.
pub fn steps_for_speed(speed: u32) -> f32 {
    map_range(
        speed.min(MAX_SPEED) as f32,
        0.0,
        MAX_SPEED as f32,
        SLOWEST_SWEEP_STEPS,
        FASTEST_SWEEP_STEPS,
    )
}

/// Stateful eye position generator.
///
/// `step` is a phase accumulator, not wall-clock time. It keeps its value in
/// every mode so returning to a sweep resumes where it left off.
#[derive(Clone, Copy, Debug)]
pub struct MotionGenerator {
    step: f32,
    bounds: Size,
}

impl MotionGenerator {
    pub const fn new(bounds: Size) -> Self { Self { step: 0.0, bounds } }

    /// Current phase accumulator, always in `[0, 2)`.
    #[inline]
    pub const fn step(&self) -> f32 { self.step }

    /// Compute the next position for `mode`.
    ///
    /// Settings are read on every call, so speed and endpoint changes take
    /// effect on the next iteration.
    pub fn advance(
        &mut self,
        mode: MotionMode,
        motions: &MotionSettings,
    ) -> MotionStep {
        match mode {
            MotionMode::LeftRight => self.sweep(motions, ease_in_out_cubic),
            MotionMode::Jump => self.sweep(motions, step_jump),
            MotionMode::Manual => MotionStep {
                position: Some(EyePosition::from_point(motions.pos).clamped(self.bounds)),
                sleep_ms: MOTION_QUANTUM_MS,
            },
            MotionMode::Disabled => MotionStep {
                position: None,
                sleep_ms: MOTION_IDLE_MS,
            },
        }
    }

    fn sweep(
        &mut self,
        motions: &MotionSettings,
        curve: fn(f32) -> f32,
    ) -> MotionStep {
        let steps = steps_for_speed(motions.speed);
        let progress = reflect(self.step, SWEEP_PERIOD).unwrap_or(0.0);
        let x = map_range(
            curve(progress),
            0.0,
            1.0,
            motions.left_point.x as f32,
            motions.right_point.x as f32,
        );
        let y = self.bounds.height as f32 / 2.0;

        // Wrap at one full back-and-forth so the accumulator keeps its precision
        self.step = (self.step + 2.0 / steps) % (2.0 * SWEEP_PERIOD);

        MotionStep {
            position: Some(EyePosition::new(x, y).clamped(self.bounds)),
            sleep_ms: MOTION_QUANTUM_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    const PANEL: Size = Size::new(240, 240);

    fn motions() -> MotionSettings {
        let mut motions = Settings::default().motions;
        motions.left_point = Point::new(40, 120);
        motions.right_point = Point::new(200, 120);
        motions.speed = 100;
        motions
    }

    #[test]
    fn test_mode_index_round_trip() {
        for mode in MotionMode::ALL {
            assert_eq!(MotionMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(MotionMode::from_index(4), None);
    }

    #[test]
    fn test_steps_for_speed_clamps() {
        assert_eq!(steps_for_speed(0), 620.0);
        assert_eq!(steps_for_speed(100), 20.0);
        assert_eq!(steps_for_speed(5000), 20.0);
    }

    #[test]
    fn test_left_right_starts_left_and_reaches_right() {
        let motions = motions();
        let mut generator = MotionGenerator::new(PANEL);

        let first = generator.advance(MotionMode::LeftRight, &motions);
        assert_eq!(first.sleep_ms, MOTION_QUANTUM_MS);
        assert_eq!(first.position, Some(EyePosition::new(40.0, 120.0)));

        // speed 100 -> 20 steps per sweep, step grows by 0.1
        let mut last = first;
        for _ in 0..10 {
            last = generator.advance(MotionMode::LeftRight, &motions);
        }
        let pos = last.position.unwrap();
        assert!((pos.x - 200.0).abs() < 0.01, "x = {}", pos.x);
    }

    #[test]
    fn test_left_right_stays_between_endpoints() {
        let motions = motions();
        let mut generator = MotionGenerator::new(PANEL);
        for _ in 0..500 {
            let pos = generator.advance(MotionMode::LeftRight, &motions).position.unwrap();
            assert!((40.0..=200.0).contains(&pos.x));
            assert_eq!(pos.y, 120.0);
        }
    }

    #[test]
    fn test_jump_only_three_positions() {
        let motions = motions();
        let mut generator = MotionGenerator::new(PANEL);
        for _ in 0..200 {
            let x = generator.advance(MotionMode::Jump, &motions).position.unwrap().x;
            assert!(x == 40.0 || x == 120.0 || x == 200.0, "x = {x}");
        }
    }

    #[test]
    fn test_manual_follows_pos_and_clamps() {
        let mut motions = motions();
        let mut generator = MotionGenerator::new(PANEL);

        motions.pos = Point::new(30, 60);
        let step = generator.advance(MotionMode::Manual, &motions);
        assert_eq!(step.position, Some(EyePosition::new(30.0, 60.0)));

        motions.pos = Point::new(-20, 1000);
        let step = generator.advance(MotionMode::Manual, &motions);
        assert_eq!(step.position, Some(EyePosition::new(0.0, 239.0)));
    }

    #[test]
    fn test_disabled_sleeps_longer() {
        let mut generator = MotionGenerator::new(PANEL);
        let step = generator.advance(MotionMode::Disabled, &motions());
        assert_eq!(step.position, None);
        assert_eq!(step.sleep_ms, MOTION_IDLE_MS);
    }

    #[test]
    fn test_step_preserved_outside_sweeps() {
        let motions = motions();
        let mut generator = MotionGenerator::new(PANEL);
        for _ in 0..3 {
            generator.advance(MotionMode::LeftRight, &motions);
        }
        let phase = generator.step();
        generator.advance(MotionMode::Manual, &motions);
        generator.advance(MotionMode::Disabled, &motions);
        assert_eq!(generator.step(), phase);
    }

    #[test]
    fn test_degenerate_endpoints_hold_still() {
        let mut motions = motions();
        motions.right_point = motions.left_point;
        let mut generator = MotionGenerator::new(PANEL);
        for _ in 0..30 {
            let x = generator.advance(MotionMode::LeftRight, &motions).position.unwrap().x;
            assert_eq!(x, 40.0);
        }
    }
}
