//! Single-flight gate for poll rounds.
//!
//! At most one round may be outstanding. A trigger that finds a round in
//! flight is simply skipped; it is neither queued nor an error. The gate is
//! a shared atomic flag, released by a guard when the round finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "round in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    /// Create an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a round is already in flight.
    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: self.busy.clone(),
            })
    }

    /// Check if a round is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop.
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_refused() {
        let gate = SingleFlight::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());
    }

    #[test]
    fn test_release_on_drop() {
        let gate = SingleFlight::new();
        {
            let _guard = gate.try_begin().unwrap();
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let gate = SingleFlight::new();
        let other = gate.clone();
        let _guard = gate.try_begin().unwrap();
        assert!(other.is_busy());
        assert!(other.try_begin().is_none());
    }
}
