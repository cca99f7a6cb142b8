use crate::options::AnimationOptions;

/// Converts wall-clock frame deltas into reference frames.
///
/// Rotation speeds are authored per frame at a fixed reference rate, so a
/// 120 Hz display should advance half as far per frame as a 60 Hz one.
/// Long gaps (a backgrounded tab, a debugger pause) are capped so bodies do
/// not jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    reference_fps: f32,
    time_scale: f32,
    max_frames_per_tick: f32,
    /// Smoothed frames per second, for diagnostics.
    smoothed_fps: f32,
}

impl FrameClock {
    /// Clock configured from animation options.
    #[must_use]
    pub fn new(options: &AnimationOptions) -> Self {
        let mut clock = Self {
            reference_fps: 60.0,
            time_scale: 1.0,
            max_frames_per_tick: 4.0,
            smoothed_fps: 60.0,
        };
        clock.configure(options);
        clock
    }

    /// Apply new options, keeping the FPS estimate.
    pub fn configure(&mut self, options: &AnimationOptions) {
        self.reference_fps = options.reference_fps.max(1.0);
        self.time_scale = options.time_scale.max(0.0);
        self.max_frames_per_tick = options.max_frames_per_tick.max(0.0);
    }

    /// Reference frames elapsed over `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        self.smoothed_fps = self.smoothed_fps * 0.95 + (1.0 / dt) * 0.05;
        (dt * self.reference_fps * self.time_scale)
            .min(self.max_frames_per_tick)
    }

    /// Exponentially smoothed frame rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_reference_frame_per_sixtieth() {
        let mut clock = FrameClock::new(&AnimationOptions::default());
        assert!((clock.tick(1.0 / 60.0) - 1.0).abs() < 1e-5);
        assert!((clock.tick(1.0 / 120.0) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn long_gaps_are_capped() {
        let mut clock = FrameClock::new(&AnimationOptions::default());
        assert_eq!(clock.tick(5.0), 4.0);
    }

    #[test]
    fn time_scale_and_bad_input() {
        let options = AnimationOptions {
            time_scale: 2.0,
            ..AnimationOptions::default()
        };
        let mut clock = FrameClock::new(&options);
        assert!((clock.tick(1.0 / 60.0) - 2.0).abs() < 1e-5);
        assert_eq!(clock.tick(0.0), 0.0);
        assert_eq!(clock.tick(-1.0), 0.0);
        assert_eq!(clock.tick(f32::NAN), 0.0);
    }
}
