use std::sync::{Mutex, MutexGuard, PoisonError};

use super::state::{GuardKey, QueueState};

pub(crate) fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds one in-flight flag and clears it on drop, so the flag is released
/// on success, failure, timeout, and when the action future is dropped.
pub(crate) struct InFlight<'a> {
    state: &'a Mutex<QueueState>,
    key: GuardKey,
    token: u64,
}

impl<'a> InFlight<'a> {
    /// Take `key` on an already-locked state. `None` when it is held.
    pub fn acquire(
        state: &'a Mutex<QueueState>,
        locked: &mut QueueState,
        key: GuardKey,
    ) -> Option<Self> {
        let token = locked.try_mark(key)?;
        Some(Self { state, key, token })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).release(self.key, self.token);
    }
}
