use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

// A panic while holding a cache or session lock poisons it; the data is at
// worst stale, never structurally broken, so recover instead of propagating.

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        recovered("rwlock.read", op);
        poisoned.into_inner()
    })
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        recovered("rwlock.write", op);
        poisoned.into_inner()
    })
}

pub(crate) fn lock<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        recovered("mutex.lock", op);
        poisoned.into_inner()
    })
}

fn recovered(lock_kind: &'static str, op: &'static str) {
    warn!(
        op,
        lock_kind,
        result = "poisoned_recovered",
        hint = "state may be stale after panic in another thread",
        "Recovered from poisoned lock"
    );
}
