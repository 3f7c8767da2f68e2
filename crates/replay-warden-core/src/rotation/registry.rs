use crate::session::is_synthetic;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

/// One live countdown for a session key.
struct ArmedEntry {
    /// Generation stamped when this entry was armed. The countdown task only
    /// fires if its own generation is still the live one for the key, so a
    /// cancel or re-arm that races with imminent expiry always wins.
    generation: u64,
    handle: JoinHandle<()>,
}

/// Registry of per-key countdown timers.
///
/// At most one live countdown exists per key at any instant. Arming a key
/// that already has a countdown cancels the old one first; cancellation is
/// race-free against the countdown's own expiry (winner-take-all via a
/// generation check under the map lock, with task abort as a resource
/// cleanup on top).
///
/// All operations are synchronous and non-blocking: the map lock guards only
/// short read/modify sections. Countdown tasks are spawned onto the ambient
/// Tokio runtime, so the registry must be used from within one.
#[derive(Clone)]
pub struct TimerRegistry {
    inner: Arc<Mutex<HashMap<String, ArmedEntry>>>,
    next_generation: Arc<AtomicU64>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arms (or re-arms) the countdown for `key`.
    ///
    /// Any existing countdown for the key is canceled first; the new one
    /// invokes `on_expire(key)` after `duration` unless canceled or replaced
    /// sooner. Returns `false` without arming for synthetic keys and for a
    /// zero duration (the latter is a programming error and is logged as
    /// such).
    #[instrument(skip(self, on_expire))]
    pub fn arm<F>(&self, key: &str, duration: Duration, on_expire: F) -> bool
    where
        F: FnOnce(String) + Send + 'static,
    {
        if is_synthetic(key) {
            debug!(key, "Synthetic session, countdown not armed");
            return false;
        }
        if duration.is_zero() {
            error!(key, "Refusing to arm a zero-duration countdown");
            return false;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // The old entry is removed and the new one inserted under a single
        // lock acquisition, so the countdown task can never observe the map
        // mid-replacement.
        let mut map = lock_map(&self.inner);
        if let Some(old) = map.remove(key) {
            old.handle.abort();
            debug!(key, "Superseded previous countdown");
        }

        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let fired = {
                let mut map = lock_map(&inner);
                match map.get(&owned_key) {
                    Some(entry) if entry.generation == generation => {
                        map.remove(&owned_key);
                        true
                    }
                    // A newer arm or a cancel got there first; this
                    // countdown lost the race and must not fire.
                    _ => false,
                }
            };

            if fired {
                debug!(key = %owned_key, "Countdown expired");
                on_expire(owned_key);
            }
        });

        map.insert(
            key.to_string(),
            ArmedEntry {
                generation,
                handle,
            },
        );
        debug!(key, duration_secs = duration.as_secs(), "Countdown armed");

        true
    }

    /// Cancels the countdown for `key`, if one is armed. Idempotent.
    #[instrument(skip(self))]
    pub fn cancel(&self, key: &str) {
        let mut map = lock_map(&self.inner);
        if let Some(entry) = map.remove(key) {
            entry.handle.abort();
            debug!(key, "Countdown canceled");
        }
    }

    /// Returns `true` if a countdown is currently armed for `key`.
    pub fn is_armed(&self, key: &str) -> bool {
        lock_map(&self.inner).contains_key(key)
    }

    /// Number of currently armed countdowns.
    pub fn armed_count(&self) -> usize {
        lock_map(&self.inner).len()
    }

    /// Best-effort cancellation of every armed countdown.
    #[instrument(skip(self))]
    pub fn cancel_all(&self) {
        let mut map = lock_map(&self.inner);
        let count = map.len();
        for (_, entry) in map.drain() {
            entry.handle.abort();
        }
        if count > 0 {
            debug!(count, "All countdowns canceled");
        }
    }
}

/// Locks the registry map, recovering from poison.
///
/// A poisoned mutex means a previous holder panicked, but the map data is
/// still valid and usable.
fn lock_map(
    inner: &Mutex<HashMap<String, ArmedEntry>>,
) -> MutexGuard<'_, HashMap<String, ArmedEntry>> {
    inner.lock().unwrap_or_else(|e| {
        warn!("Timer registry lock poisoned, recovering");
        e.into_inner()
    })
}
