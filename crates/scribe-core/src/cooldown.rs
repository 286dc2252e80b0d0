//! Per-actor command cooldown.
//!
//! The gate is the only mutable state shared between the synchronous context
//! and worker tasks. It is checked synchronously before any fetch is
//! scheduled and never blocks: one sharded-map entry per actor, superseded on
//! the next accepted invocation, never expired explicitly.

use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::ids::ActorId;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

/// Actor → last-accepted-invocation timestamp map.
#[derive(Debug, Default)]
pub struct CooldownGate {
    entries: DashMap<ActorId, i64>,
}

impl CooldownGate {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and, on success, record an invocation for `actor`.
    ///
    /// With `window_secs <= 0` the gate is disabled: always passes, records
    /// nothing. Otherwise passes (recording `now_ms`) iff the actor has no
    /// entry or the previous entry is at least `window_secs * 1000` ms old;
    /// a rejected call leaves the entry untouched.
    pub fn try_acquire(&self, actor: ActorId, window_secs: i64, now_ms: i64) -> bool {
        if window_secs <= 0 {
            return true;
        }

        match self.entries.entry(actor) {
            Entry::Occupied(mut entry) => {
                if now_ms - *entry.get() < window_secs * 1000 {
                    false
                } else {
                    *entry.get_mut() = now_ms;
                    true
                }
            }
            Entry::Vacant(entry) => {
                let _ = entry.insert(now_ms);
                true
            }
        }
    }

    /// Number of actors with a recorded invocation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no actor has a recorded invocation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_passes_and_records() {
        let gate = CooldownGate::new();
        let actor = ActorId::random();
        assert!(gate.try_acquire(actor, 5, 0));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn window_sequence() {
        // t=0 passes, t=2000 rejected, t=5001 passes again.
        let gate = CooldownGate::new();
        let actor = ActorId::random();
        assert!(gate.try_acquire(actor, 5, 0));
        assert!(!gate.try_acquire(actor, 5, 2000));
        assert!(gate.try_acquire(actor, 5, 5001));
    }

    #[test]
    fn exact_window_boundary_passes() {
        let gate = CooldownGate::new();
        let actor = ActorId::random();
        assert!(gate.try_acquire(actor, 5, 0));
        assert!(gate.try_acquire(actor, 5, 5000));
    }

    #[test]
    fn rejection_does_not_extend_the_window() {
        let gate = CooldownGate::new();
        let actor = ActorId::random();
        assert!(gate.try_acquire(actor, 5, 0));
        assert!(!gate.try_acquire(actor, 5, 4999));
        // The rejected call at t=4999 must not have reset the entry.
        assert!(gate.try_acquire(actor, 5, 5000));
    }

    #[test]
    fn disabled_window_always_passes_and_records_nothing() {
        let gate = CooldownGate::new();
        let actor = ActorId::random();
        assert!(gate.try_acquire(actor, 0, 0));
        assert!(gate.try_acquire(actor, 0, 1));
        assert!(gate.try_acquire(actor, -3, 2));
        assert!(gate.is_empty());
    }

    #[test]
    fn actors_are_independent() {
        let gate = CooldownGate::new();
        let (a, b) = (ActorId::random(), ActorId::random());
        assert!(gate.try_acquire(a, 5, 0));
        assert!(gate.try_acquire(b, 5, 1));
        assert!(!gate.try_acquire(a, 5, 2));
        assert!(!gate.try_acquire(b, 5, 2));
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn concurrent_actors_do_not_contend() {
        let gate = std::sync::Arc::new(CooldownGate::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = std::sync::Arc::clone(&gate);
                std::thread::spawn(move || {
                    let actor = ActorId::random();
                    assert!(gate.try_acquire(actor, 5, i));
                    assert!(!gate.try_acquire(actor, 5, i + 1));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(gate.len(), 8);
    }
}
