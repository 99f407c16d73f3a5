//! Single-slot, cancellable deadline.
//!
//! A [`Timer`] holds at most one pending deadline, so "only one retry is
//! ever scheduled" holds by construction: arming a timer that is already
//! pending leaves the original deadline in place.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the timer `after` from `now`. Returns `false` (and keeps
    /// the existing deadline) if it is already pending.
    pub fn arm(&mut self, now: Instant, after: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + after);
        true
    }

    /// Drop the pending deadline, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed. A fired timer is disarmed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
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

    #[test]
    fn test_arm_once() {
        let now = Instant::now();
        let mut timer = Timer::new();
        assert!(timer.arm(now, Duration::from_secs(2)));
        assert!(!timer.arm(now, Duration::from_secs(5)));
        assert_eq!(timer.deadline(), Some(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_fire_only_when_due() {
        let now = Instant::now();
        let mut timer = Timer::new();
        timer.arm(now, Duration::from_millis(200));

        assert!(!timer.fire(now + Duration::from_millis(199)));
        assert!(timer.is_pending());
        assert!(timer.fire(now + Duration::from_millis(200)));
        assert!(!timer.is_pending());
        assert!(!timer.fire(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_cancel_then_rearm() {
        let now = Instant::now();
        let mut timer = Timer::new();
        timer.arm(now, Duration::from_secs(2));
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(timer.arm(now, Duration::from_secs(1)));
    }
}
