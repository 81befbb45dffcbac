//! Keeping displayed data consistent with the latest request
//!
//! Every load issues a `RequestToken`. Only the holder of the most recently
//! issued token may publish its result; a response that arrives after a newer
//! request has been issued is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Issues monotonically increasing request tokens
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    latest: Arc<AtomicU64>,
}

/// Proof that a request was issued; compares against the guard's latest id
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, invalidating every token issued before it
    pub fn issue(&self) -> RequestToken {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            id,
            latest: self.latest.clone(),
        }
    }

    /// Invalidate all outstanding tokens without issuing a usable one
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer request has been issued since this one
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

/// Data shown by a component together with its loading status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

/// Shared slot holding the latest accepted result of a load
pub struct LoadSlot<T> {
    state: RwLock<LoadState<T>>,
    guard: RequestGuard,
}

impl<T: Default> Default for LoadSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> LoadSlot<T> {
    /// Create a slot with initial data
    pub fn new(data: T) -> Self {
        Self {
            state: RwLock::new(LoadState {
                data,
                loading: false,
                error: None,
            }),
            guard: RequestGuard::new(),
        }
    }

    /// Start a new load: marks the slot as loading and supersedes any load
    /// still in flight
    pub fn begin(&self) -> RequestToken {
        let token = self.guard.issue();
        self.state.write().loading = true;
        token
    }

    /// Publish a finished load.
    ///
    /// `data` replaces the current data and `error` becomes the visible error
    /// message. Returns false (and changes nothing) if a newer load was begun
    /// after `token` was issued.
    pub fn finish(&self, token: &RequestToken, data: T, error: Option<String>) -> bool {
        let mut state = self.state.write();

        // Checked under the write lock so a concurrent `begin` cannot slip in
        // between the check and the update.
        if !token.is_current() {
            tracing::debug!(request = token.id(), "Discarding stale response");
            return false;
        }

        state.data = data;
        state.error = error;
        state.loading = false;
        true
    }

    /// End a load that produced no data: the previous data stays visible
    /// next to `error`. Stale tokens are ignored as in `finish`.
    pub fn fail(&self, token: &RequestToken, error: String) -> bool {
        let mut state = self.state.write();
        if !token.is_current() {
            tracing::debug!(request = token.id(), "Discarding stale failure");
            return false;
        }

        state.error = Some(error);
        state.loading = false;
        true
    }

    /// Read the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&LoadState<T>) -> R) -> R {
        f(&self.state.read())
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }
}

impl<T: Clone> LoadSlot<T> {
    /// Clone of the current state
    pub fn snapshot(&self) -> LoadState<T> {
        self.state.read().clone()
    }

    /// Clone of the current data
    pub fn data(&self) -> T {
        self.state.read().data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let guard = RequestGuard::new();
        let first = guard.issue();
        assert!(first.is_current());

        let second = guard.issue();
        assert!(!first.is_current());
        assert!(second.is_current());

        guard.invalidate();
        assert!(!second.is_current());
    }

    #[test]
    fn test_stale_finish_is_discarded() {
        let slot: LoadSlot<Vec<u32>> = LoadSlot::default();

        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.finish(&second, vec![2], None));
        assert!(!slot.finish(&first, vec![1], Some("late".into())));

        let state = slot.snapshot();
        assert_eq!(state.data, vec![2]);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[test]
    fn test_loading_until_latest_finishes() {
        let slot: LoadSlot<u32> = LoadSlot::new(0);
        let first = slot.begin();
        let second = slot.begin();

        slot.finish(&first, 1, None);
        assert!(slot.is_loading());
        assert_eq!(slot.data(), 0);

        slot.finish(&second, 2, Some("boom".into()));
        assert!(!slot.is_loading());
        assert_eq!(slot.error().as_deref(), Some("boom"));
        assert_eq!(slot.with_state(|s| s.data), 2);
    }

    #[test]
    fn test_fail_keeps_previous_data() {
        let slot = LoadSlot::new(1u32);
        let first = slot.begin();
        assert!(slot.finish(&first, 7, None));

        let stale = slot.begin();
        let latest = slot.begin();
        assert!(!slot.fail(&stale, "old".to_string()));
        assert!(slot.is_loading());

        assert!(slot.fail(&latest, "task panicked".to_string()));
        let state = slot.snapshot();
        assert_eq!(state.data, 7);
        assert_eq!(state.error.as_deref(), Some("task panicked"));
        assert!(!state.loading);
    }
}
