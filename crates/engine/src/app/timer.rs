use std::time::Duration;

/// Countdown owned by a single entity and advanced from that entity's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    current: Duration,
    expiration: Duration,
}

impl Timer {
    /// Starts expired; call [`Timer::reset`] to arm it.
    pub fn new(expiration: Duration) -> Self {
        Self {
            current: expiration,
            expiration,
        }
    }

    pub fn started(expiration: Duration) -> Self {
        Self {
            current: Duration::ZERO,
            expiration,
        }
    }

    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    pub fn update(&mut self, elapsed: Duration) {
        if self.is_active() {
            self.current = self.current.saturating_add(elapsed).min(self.expiration);
        }
    }

    pub fn is_active(&self) -> bool {
        self.current < self.expiration
    }

    pub fn is_expired(&self) -> bool {
        !self.is_active()
    }

    pub fn current_time(&self) -> Duration {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_expired_until_reset() {
        let mut timer = Timer::new(Duration::from_millis(100));
        assert!(timer.is_expired());

        timer.reset();
        assert!(timer.is_active());
        assert_eq!(timer.current_time(), Duration::ZERO);
    }

    #[test]
    fn update_runs_until_expiration_and_saturates() {
        let mut timer = Timer::started(Duration::from_millis(100));
        timer.update(Duration::from_millis(60));
        assert!(timer.is_active());

        timer.update(Duration::from_millis(60));
        assert!(timer.is_expired());
        assert_eq!(timer.current_time(), Duration::from_millis(100));
    }
}
