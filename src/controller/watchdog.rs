//! Inactivity watchdog: a single deadline reset by any interaction event.

use std::time::{Duration, Instant};

/// Tracks user inactivity against a fixed timeout.
///
/// The host reports interaction through [`touch`](Self::touch) and polls
/// [`fire_if_expired`](Self::fire_if_expired) from its event loop. Expiry
/// fires at most once per arming, then the watchdog disarms until the next
/// interaction. Timekeeping is injected, never read ambiently, so expiry is
/// fully testable.
#[derive(Debug, Clone)]
pub struct InactivityWatchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl InactivityWatchdog {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Records an interaction: arms the watchdog (or pushes the deadline out).
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    /// Returns true exactly once when the deadline has passed, disarming the
    /// watchdog until the next [`touch`](Self::touch).
    pub fn fire_if_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for InactivityWatchdog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}
