/// Playback direction of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayDirection {
    #[default]
    Forward,
    Backward,
}

/// Playback clock for one animation instance.
///
/// Accumulates wall-clock deltas into a clip-local time, with the direction
/// applied as a sign on the delta. Backward playback is decreasing time,
/// wrapped into `[0, duration)` like forward playback.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    pub time: f32,
    pub speed: f32,
    pub direction: PlayDirection,
    pub paused: bool,
}

impl AnimationAction {
    #[must_use]
    pub fn new() -> Self {
        Self {
            time: 0.0,
            speed: 1.0,
            direction: PlayDirection::Forward,
            paused: false,
        }
    }

    /// Advances the clock by `dt` seconds and wraps against `duration`.
    ///
    /// A clip without keyframes (zero duration) pins the clock at 0.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if self.paused {
            return;
        }
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }

        let sign = match self.direction {
            PlayDirection::Forward => 1.0,
            PlayDirection::Backward => -1.0,
        };

        self.time = (self.time + dt * self.speed * sign).rem_euclid(duration);
    }

    /// Resets the clock to the start of the clip.
    pub fn rewind(&mut self) {
        self.time = 0.0;
    }
}

impl Default for AnimationAction {
    fn default() -> Self {
        Self::new()
    }
}
