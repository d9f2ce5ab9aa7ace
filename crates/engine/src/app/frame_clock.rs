use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Turns wall-clock time into a bounded simulation step and paces iterations
/// to a target rate. Never fails; under load it only lowers the frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_step: Duration,
    frame_budget: Duration,
    last_updated: Instant,
    frame_started: Instant,
    last_raw_delta: Duration,
}

impl FrameClock {
    pub fn new(target_fps: u32, max_step: Duration) -> Self {
        Self::starting_at(target_fps, max_step, Instant::now())
    }

    pub fn starting_at(target_fps: u32, max_step: Duration, now: Instant) -> Self {
        Self {
            max_step,
            frame_budget: target_frame_duration(target_fps),
            last_updated: now,
            frame_started: now,
            last_raw_delta: Duration::ZERO,
        }
    }

    pub fn max_step(&self) -> Duration {
        self.max_step
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Marks the start of an iteration; pacing measures from here.
    pub fn begin_frame(&mut self) {
        self.begin_frame_at(Instant::now());
    }

    pub fn begin_frame_at(&mut self, now: Instant) {
        self.frame_started = now;
    }

    /// Simulation time to advance this iteration.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let raw = now.saturating_duration_since(self.last_updated);
        self.last_updated = now;
        self.last_raw_delta = raw;

        let step = clamp_frame_delta(raw, self.max_step);
        if step < raw {
            debug!(
                raw_delta_ms = raw.as_millis() as u64,
                max_step_ms = self.max_step.as_millis() as u64,
                "frame_delta_clamped"
            );
        }
        step
    }

    pub fn last_raw_delta(&self) -> Duration {
        self.last_raw_delta
    }

    pub fn last_tick_was_clamped(&self) -> bool {
        self.last_raw_delta > self.max_step
    }

    /// Blocks for whatever is left of the frame budget. Over-budget frames
    /// proceed immediately with no catch-up stepping.
    pub fn pace(&self) {
        let delay = self.pacing_delay_at(Instant::now());
        if delay > Duration::ZERO {
            thread::sleep(delay);
        }
    }

    pub fn pacing_delay_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.frame_started);
        compute_cap_sleep(elapsed, self.frame_budget)
    }
}

pub(crate) fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

pub(crate) fn target_frame_duration(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
}

pub(crate) fn compute_cap_sleep(elapsed: Duration, frame_target: Duration) -> Duration {
    frame_target.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(base: Instant) -> FrameClock {
        FrameClock::starting_at(60, Duration::from_millis(83), base)
    }

    #[test]
    fn stall_is_clamped_to_max_step() {
        let base = Instant::now();
        let mut clock = clock_at(base);

        let step = clock.tick_at(base + Duration::from_millis(500));

        assert_eq!(step, Duration::from_millis(83));
        assert_eq!(clock.last_raw_delta(), Duration::from_millis(500));
        assert!(clock.last_tick_was_clamped());
    }

    #[test]
    fn short_frames_pass_through_unchanged() {
        let base = Instant::now();
        let mut clock = clock_at(base);

        let step = clock.tick_at(base + Duration::from_millis(16));

        assert_eq!(step, Duration::from_millis(16));
        assert!(!clock.last_tick_was_clamped());
    }

    #[test]
    fn step_never_exceeds_max_for_any_elapsed_time() {
        let base = Instant::now();
        let mut clock = clock_at(base);
        let mut now = base;
        for elapsed_ms in [0u64, 1, 82, 83, 84, 1_000, 60_000, 3_600_000] {
            now += Duration::from_millis(elapsed_ms);
            let step = clock.tick_at(now);
            assert_eq!(step, Duration::from_millis(elapsed_ms.min(83)));
            assert!(step <= clock.max_step());
        }
    }

    #[test]
    fn time_going_backwards_yields_zero_step() {
        let base = Instant::now() + Duration::from_secs(1);
        let mut clock = clock_at(base);

        assert_eq!(clock.tick_at(base - Duration::from_millis(10)), Duration::ZERO);
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(60);
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        assert_eq!(target_frame_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn pacing_delay_is_remaining_budget() {
        let base = Instant::now();
        let mut clock = clock_at(base);
        clock.begin_frame_at(base);

        let delay = clock.pacing_delay_at(base + Duration::from_millis(5));
        let expected = target_frame_duration(60) - Duration::from_millis(5);

        assert_eq!(delay, expected);
    }

    #[test]
    fn pacing_delay_zero_when_over_budget() {
        let base = Instant::now();
        let mut clock = clock_at(base);
        clock.begin_frame_at(base);

        assert_eq!(
            clock.pacing_delay_at(base + Duration::from_millis(20)),
            Duration::ZERO
        );
    }
}
