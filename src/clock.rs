//! `Clock` seam (section 1): matchmaking deadlines, room timers, and job
//! TTLs all read "now" through this trait so tests can pin time instead of
//! sleeping real seconds.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test double: `now()` returns whatever was last set, never the wall clock.
pub struct FixedClock(std::sync::RwLock<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(std::sync::RwLock::new(at))
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.0.write().unwrap();
        *guard += delta;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.write().unwrap() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.read().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_deterministically() {
        let start = "2026-01-01T00:00:00Z".parse().unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(30));
    }
}
