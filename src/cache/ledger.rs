//! Write ordering per entity.
//!
//! Every mutation draws a monotonically increasing epoch for its entity key
//! before the request leaves, and reports back when the response settles.
//! A response that lands after a newer write has already applied for the
//! same entity is stale: the caller must discard it instead of merging it
//! over the fresher state. The in-flight map doubles as the UI's pending
//! flag: at most one write per entity is ever visible as pending.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tracing::{debug, warn};

use super::keys::EntityKey;
use super::lock;

/// Monotonic sequence number for ordering writes within this process.
pub type Epoch = u64;

#[derive(Debug, Default)]
struct LedgerState {
    in_flight: HashMap<EntityKey, Epoch>,
    applied: HashMap<EntityKey, Epoch>,
}

/// Per-entity write sequencing. Shared by every resource handle of a
/// [`crate::resources::SyncContext`].
#[derive(Debug, Default)]
pub struct WriteLedger {
    counter: AtomicU64,
    state: Mutex<LedgerState>,
}

impl WriteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the epoch for a new write and mark the entity pending.
    ///
    /// A second `begin` for the same entity supersedes the first: the older
    /// write's response will be rejected by [`WriteLedger::settle`].
    pub fn begin(&self, entity: EntityKey) -> Epoch {
        let epoch = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = lock::lock(&self.state, "ledger.begin");
        state.in_flight.insert(entity, epoch);
        debug!(?entity, epoch, "Write began");
        epoch
    }

    /// Whether a write on this entity is still awaiting its response.
    pub fn is_pending(&self, entity: &EntityKey) -> bool {
        lock::lock(&self.state, "ledger.is_pending")
            .in_flight
            .contains_key(entity)
    }

    /// Entity keys with an in-flight write, for UI loading flags.
    pub fn pending(&self) -> Vec<EntityKey> {
        lock::lock(&self.state, "ledger.pending")
            .in_flight
            .keys()
            .copied()
            .collect()
    }

    /// Record a settled write. Returns `false` when a newer epoch already
    /// applied for the entity; the response is stale and must not be merged.
    pub fn settle(&self, entity: EntityKey, epoch: Epoch) -> bool {
        let mut state = lock::lock(&self.state, "ledger.settle");
        if state.in_flight.get(&entity) == Some(&epoch) {
            state.in_flight.remove(&entity);
        }

        match state.applied.get(&entity) {
            Some(&applied) if applied > epoch => {
                counter!("bantin_sync_stale_discard_total").increment(1);
                warn!(
                    ?entity,
                    epoch, applied, "Discarding stale mutation response"
                );
                false
            }
            _ => {
                state.applied.insert(entity, epoch);
                debug!(?entity, epoch, "Write applied");
                true
            }
        }
    }

    /// Abandon a failed write without recording an application.
    pub fn abort(&self, entity: &EntityKey, epoch: Epoch) {
        let mut state = lock::lock(&self.state, "ledger.abort");
        if state.in_flight.get(entity) == Some(&epoch) {
            state.in_flight.remove(entity);
        }
        debug!(?entity, epoch, "Write aborted");
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    const ENTITY: EntityKey = EntityKey::Category(1);

    #[test]
    fn epochs_are_monotonic() {
        let ledger = WriteLedger::new();
        let e1 = ledger.begin(ENTITY);
        let e2 = ledger.begin(ENTITY);
        let e3 = ledger.begin(EntityKey::Post(9));
        assert!(e1 < e2);
        assert!(e2 < e3);
    }

    #[test]
    fn newer_write_wins_over_slow_response() {
        let ledger = WriteLedger::new();
        let slow = ledger.begin(ENTITY);
        let fast = ledger.begin(ENTITY);

        assert!(ledger.settle(ENTITY, fast));
        // The earlier write's response lands afterwards: discard.
        assert!(!ledger.settle(ENTITY, slow));
    }

    #[test]
    fn pending_tracks_in_flight_writes() {
        let ledger = WriteLedger::new();
        assert!(!ledger.is_pending(&ENTITY));

        let epoch = ledger.begin(ENTITY);
        assert!(ledger.is_pending(&ENTITY));
        assert_eq!(ledger.pending(), vec![ENTITY]);

        assert!(ledger.settle(ENTITY, epoch));
        assert!(!ledger.is_pending(&ENTITY));
    }

    #[test]
    fn superseded_write_does_not_clear_the_newer_pending_flag() {
        let ledger = WriteLedger::new();
        let old = ledger.begin(ENTITY);
        let new = ledger.begin(ENTITY);

        assert!(ledger.settle(ENTITY, old));
        // The newer write is still in flight.
        assert!(ledger.is_pending(&ENTITY));
        assert!(ledger.settle(ENTITY, new));
        assert!(!ledger.is_pending(&ENTITY));
    }

    #[test]
    fn abort_clears_pending_without_applying() {
        let ledger = WriteLedger::new();
        let epoch = ledger.begin(ENTITY);
        ledger.abort(&ENTITY, epoch);
        assert!(!ledger.is_pending(&ENTITY));

        // A later write applies normally.
        let next = ledger.begin(ENTITY);
        assert!(ledger.settle(ENTITY, next));
    }

    #[test]
    fn ledger_recovers_from_poisoned_lock() {
        let ledger = WriteLedger::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = ledger.state.lock().expect("state lock should be acquired");
            panic!("poison ledger lock");
        }));

        let epoch = ledger.begin(ENTITY);
        assert!(ledger.settle(ENTITY, epoch));
    }
}
