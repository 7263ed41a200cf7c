/// Fixed-step clock for the control loop.
/// Turns variable frame times into a whole number of physics ticks.
pub struct StepClock {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Most ticks a single frame may request.
    max_steps: u32,
    /// Ticks handed out since creation.
    ticks: u64,
}

impl StepClock {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            ticks: 0,
        }
    }

    /// Add frame time. Returns how many fixed ticks to run now.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        // Dropping backlog beyond `max_steps` keeps a slow frame from snowballing.
        self.accumulator = (self.accumulator + frame_dt.max(0.0)).min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        self.ticks += u64::from(steps);
        steps
    }

    /// Fraction of a tick left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds covered by all ticks so far.
    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn exact_frame_is_one_tick() {
        let mut clock = StepClock::new(DT, 10);
        assert_eq!(clock.dt(), DT);
        assert_eq!(clock.advance(DT), 1);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn short_frames_carry_over() {
        let mut clock = StepClock::new(DT, 10);
        assert_eq!(clock.advance(0.008), 0);
        assert_eq!(clock.advance(0.010), 1);
        let a = clock.alpha();
        assert!((0.0..1.0).contains(&a), "alpha was {}", a);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut clock = StepClock::new(DT, 4);
        assert_eq!(clock.advance(1.0), 4);
        // The backlog was dropped, not deferred.
        assert_eq!(clock.advance(0.0), 0);
        assert_eq!(clock.ticks(), 4);
        assert!((clock.elapsed() - 4.0 * DT).abs() < 1e-6);
    }

    #[test]
    fn negative_frame_time_is_ignored() {
        let mut clock = StepClock::new(DT, 10);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.alpha(), 0.0);
    }
}
