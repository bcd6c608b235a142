//! Cooperative execution budget for the long-running scans.

use std::time::{Duration, Instant};

/// A point in time after which scans should give up.
///
/// Checked from inside scan loops; an expired deadline makes the scan return
/// its degraded `timed_out` result instead of finishing.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(budget),
        }
    }

    /// A deadline that never expires
    pub fn unbounded() -> Self {
        Self { expires_at: None }
    }

    pub fn expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_expired() {
        assert!(Deadline::after(Duration::ZERO).expired());
    }

    #[test]
    fn test_generous_budget_is_not_expired() {
        assert!(!Deadline::after(Duration::from_secs(60)).expired());
    }

    #[test]
    fn test_unbounded_never_expires() {
        assert!(!Deadline::unbounded().expired());
    }
}
