use crate::clock::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Single-shot software timer.
///
/// The module runs in the host stack's event context, so timers are not
/// callbacks: a timer holds a deadline, the host asks [`crate::Arp::poll_at`]
/// when the next one falls due and calls [`crate::Arp::poll`] at (or after)
/// that point. Firing clears the deadline; whoever handles the fire decides
/// whether to re-arm.
pub struct Timer {
    clock: Arc<dyn Clock>,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Timer {
        Timer {
            clock,
            deadline: None,
        }
    }

    pub fn start(&mut self, after: Duration) {
        self.deadline = Some(self.clock.now() + after);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true and disarms the timer if the deadline has passed.
    pub fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::MockClock;

    #[test]
    fn starts_stopped() {
        let clock = Arc::new(MockClock::new());
        let mut timer = Timer::new(clock);
        assert!(!timer.is_running());
        assert!(!timer.take_due());
    }

    #[test]
    fn fires_after_deadline() {
        let clock = Arc::new(MockClock::new());
        let mut timer = Timer::new(clock.clone());

        timer.start(Duration::from_secs(1));
        assert!(timer.is_running());
        assert!(!timer.take_due());

        clock.advance(Duration::from_secs(1));
        assert!(timer.take_due());
        // Firing disarms.
        assert!(!timer.is_running());
        assert!(!timer.take_due());
    }

    #[test]
    fn stop_discards_deadline() {
        let clock = Arc::new(MockClock::new());
        let mut timer = Timer::new(clock.clone());

        timer.start(Duration::from_secs(1));
        timer.stop();
        clock.advance(Duration::from_secs(2));
        assert!(!timer.take_due());
    }
}
