//! Converts host frame timestamps into simulation time steps.

pub const TARGET_FPS: f32 = 60.0;
/// Seconds per nominal frame.
pub const NOMINAL_DT: f32 = 1.0 / TARGET_FPS;
/// Longest step taken in one go; a backgrounded tab resumes without a jump.
const MAX_DT: f32 = 0.1;

/// One simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Seconds.
    pub dt: f32,
    /// `dt` in nominal frames; per-frame speeds are multiplied by this.
    pub frames: f32,
}

impl Tick {
    pub fn from_seconds(dt: f32) -> Self {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { NOMINAL_DT };
        Self {
            dt,
            frames: dt / NOMINAL_DT,
        }
    }

    pub fn nominal() -> Self {
        Self {
            dt: NOMINAL_DT,
            frames: 1.0,
        }
    }
}

/// Tracks the previous frame timestamp (milliseconds, as handed out by
/// `requestAnimationFrame`).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step for a frame stamped `now_ms`. The first frame, a missing stamp,
    /// or a stamp that runs backwards all yield the nominal step.
    pub fn tick(&mut self, now_ms: Option<f64>) -> Tick {
        let Some(now) = now_ms.filter(|t| t.is_finite()) else {
            return Tick::nominal();
        };
        let tick = match self.last_ms {
            Some(last) if now > last => Tick::from_seconds(((now - last) / 1000.0) as f32),
            _ => Tick::nominal(),
        };
        self.last_ms = Some(now);
        tick
    }

    /// Forget the last stamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_missing_frames_are_nominal() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Some(1000.0)), Tick::nominal());
        assert_eq!(clock.tick(None), Tick::nominal());
        assert_eq!(clock.tick(Some(f64::NAN)), Tick::nominal());
    }

    #[test]
    fn measures_delta_and_frames() {
        let mut clock = FrameClock::new();
        clock.tick(Some(0.0));
        let tick = clock.tick(Some(1000.0 / 30.0));
        assert!((tick.dt - 1.0 / 30.0).abs() < 1e-6);
        assert!((tick.frames - 2.0).abs() < 1e-4);
    }

    #[test]
    fn clamps_long_gaps_and_backwards_time() {
        let mut clock = FrameClock::new();
        clock.tick(Some(0.0));
        let tick = clock.tick(Some(60_000.0));
        assert!((tick.dt - MAX_DT).abs() < 1e-6);
        assert_eq!(clock.tick(Some(10.0)), Tick::nominal());
    }

    #[test]
    fn reset_makes_next_frame_nominal() {
        let mut clock = FrameClock::new();
        clock.tick(Some(0.0));
        clock.reset();
        assert_eq!(clock.tick(Some(400.0)), Tick::nominal());
        let tick = clock.tick(Some(400.0 + 1000.0 / 60.0));
        assert!((tick.frames - 1.0).abs() < 1e-3);
    }
}
