//! Read-through cache for generated content with per-fingerprint single-flight.
//!
//! Concurrent callers asking for the same [`Fingerprint`] serialize on that key's slot: the first
//! one runs the (billable) generation, the others wait and then read its stored result. Failures
//! are not stored, so the next waiter simply tries again. Different keys never block each other.
//! Idle slots that are empty or expired are dropped on the next insertion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use xxhash_rust::xxh3::Xxh3;

use crate::content::generator::GeneratedContent;
use crate::content::model::ContentRequest;
use crate::foundation::error::SlidecastResult;

const XXH3_SEED: u64 = 0x51de_ca57_0c0f_fee5;

/// Deterministic key for equivalent generation requests.
///
/// Topic whitespace and case are normalized; language codes compare case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl Fingerprint {
    pub fn of(request: &ContentRequest) -> Self {
        let topic = request
            .topic
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let language = request.language.trim().to_ascii_lowercase();

        let mut h = Xxh3::with_seed(XXH3_SEED);
        write_str(&mut h, &topic);
        write_str(&mut h, &language);
        write_str(&mut h, request.depth.as_str());
        let v = h.digest128();
        Self {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

// Length-prefixed so ("ab", "c") and ("a", "bc") hash differently.
fn write_str(h: &mut Xxh3, s: &str) {
    h.update(&(s.len() as u64).to_le_bytes());
    h.update(s.as_bytes());
}

/// Whether a lookup was served from the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

struct Entry {
    value: Arc<GeneratedContent>,
    stored_at: Instant,
}

#[derive(Default)]
struct Slot {
    entry: Mutex<Option<Entry>>,
}

/// Fingerprint-keyed content cache.
pub struct ContentCache {
    slots: Mutex<HashMap<Fingerprint, Arc<Slot>>>,
    ttl: Option<Duration>,
}

impl ContentCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn slot(&self, key: Fingerprint) -> Arc<Slot> {
        Arc::clone(self.slots.lock().entry(key).or_default())
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        self.ttl.is_none_or(|ttl| entry.stored_at.elapsed() < ttl)
    }

    // A slot only the map references has no waiter and no computation in flight, so its entry
    // lock is free. Cloning a slot requires the map lock, which the caller holds.
    fn is_idle(slot: &Arc<Slot>) -> bool {
        Arc::strong_count(slot) == 1
    }

    /// Drop idle slots whose entry is empty or expired.
    fn sweep(&self) {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| {
            if !Self::is_idle(slot) {
                return true;
            }
            slot.entry
                .try_lock()
                .is_none_or(|entry| entry.as_ref().is_some_and(|e| self.is_fresh(e)))
        });
        let swept = before - slots.len();
        if swept > 0 {
            tracing::trace!(swept, remaining = slots.len(), "content cache swept");
        }
    }

    /// Return the stored value if present, fresh, and not currently being regenerated.
    pub fn get(&self, key: Fingerprint) -> Option<Arc<GeneratedContent>> {
        let slot = self.slots.lock().get(&key).cloned()?;
        let guard = slot.entry.try_lock()?;
        guard
            .as_ref()
            .filter(|e| self.is_fresh(e))
            .map(|e| Arc::clone(&e.value))
    }

    /// Return the cached value for `key` or compute it with `f`.
    ///
    /// At most one `f` runs per key at any time.
    pub fn get_or_try_insert_with<F>(
        &self,
        key: Fingerprint,
        f: F,
    ) -> SlidecastResult<(Arc<GeneratedContent>, CacheStatus)>
    where
        F: FnOnce() -> SlidecastResult<GeneratedContent>,
    {
        self.sweep();
        let slot = self.slot(key);
        let mut guard = slot.entry.lock();
        if let Some(entry) = guard.as_ref()
            && self.is_fresh(entry)
        {
            tracing::debug!(%key, "content cache hit");
            return Ok((Arc::clone(&entry.value), CacheStatus::Hit));
        }

        tracing::debug!(%key, "content cache miss");
        let value = Arc::new(f()?);
        *guard = Some(Entry {
            value: Arc::clone(&value),
            stored_at: Instant::now(),
        });
        Ok((value, CacheStatus::Miss))
    }

    /// Drop the entry for `key`. Waits for an in-flight computation of that key to finish.
    pub fn invalidate(&self, key: Fingerprint) {
        let busy = {
            let mut slots = self.slots.lock();
            match slots.get(&key).map(Self::is_idle) {
                Some(true) => {
                    slots.remove(&key);
                    None
                }
                Some(false) => slots.get(&key).cloned(),
                None => None,
            }
        };
        if let Some(slot) = busy {
            *slot.entry.lock() = None;
        }
    }

    /// Drop every stored entry.
    pub fn clear(&self) {
        let busy: Vec<Arc<Slot>> = {
            let mut slots = self.slots.lock();
            slots.retain(|_, slot| !Self::is_idle(slot));
            slots.values().cloned().collect()
        };
        for slot in busy {
            *slot.entry.lock() = None;
        }
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        let slots: Vec<Arc<Slot>> = self.slots.lock().values().cloned().collect();
        slots
            .iter()
            .filter(|s| s.entry.lock().as_ref().is_some_and(|e| self.is_fresh(e)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/cache.rs"]
mod tests;
