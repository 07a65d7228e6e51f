/// Fixed timestep accumulator for driving [`World::tick`](crate::World::tick).
///
/// The simulation does no internal sub-stepping, so a huge frame delta would
/// let bodies tunnel through thin tiles. Frame deltas are clamped to
/// `max_frame_dt` before they reach the accumulator, and at most `max_steps`
/// ticks are released per frame.
pub struct FixedTimestep {
    dt: f32,
    max_frame_dt: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            max_frame_dt: dt * 6.0,
            max_steps: 6,
            accumulator: 0.0,
        }
    }

    /// Override the largest accepted frame delta.
    pub fn with_max_frame_dt(mut self, max_frame_dt: f32) -> Self {
        self.max_frame_dt = max_frame_dt.max(self.dt);
        self
    }

    /// Override the catch-up cap.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Feed one frame's elapsed time. Returns how many fixed ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = clamp_frame_dt(frame_dt, self.max_frame_dt);
        self.accumulator += frame_dt;
        let steps = ((self.accumulator / self.dt) as u32).min(self.max_steps);
        self.accumulator -= steps as f32 * self.dt;
        // Drop whatever the cap left behind rather than carrying a backlog.
        self.accumulator = self.accumulator.min(self.dt);
        steps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.dt).clamp(0.0, 1.0)
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Forget any accumulated time (level swaps, unpausing).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Clamp a raw frame delta into `[0, max]`; negative or non-finite deltas become 0.
pub fn clamp_frame_dt(frame_dt: f32, max: f32) -> f32 {
    if frame_dt.is_finite() {
        frame_dt.clamp(0.0, max)
    } else {
        0.0
    }
}
