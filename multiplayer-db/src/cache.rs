//! Ephemeral key-value cache with per-key time-to-live.
//!
//! Entries are disposable projections of the store. Absence or expiry is a
//! miss, never an error; callers treat every `CacheError` as non-fatal.

use std::time::Duration;

use async_trait::async_trait;
use scc::hash_map::Entry;
use tokio::time::Instant;
use tracing::debug;

use crate::error::CacheError;

/// String-valued cache with per-key TTL.
///
/// Implementations must be safe to share between concurrently running
/// requests; the access layer holds one behind an `Arc`.
#[async_trait]
pub trait Cache: Send + Sync {
  /// Returns `None` on a miss or an expired entry.
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

  /// Writes `value` under `key`, replacing any previous entry and its TTL.
  async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

  /// Removes `key`. Deleting an absent key succeeds.
  async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

struct Slot {
  value: String,
  expires_at: Instant,
}

impl Slot {
  fn is_expired(&self, now: Instant) -> bool {
    now >= self.expires_at
  }
}

/// In-process cache backed by a lock-free `scc::HashMap`.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`MemoryCache::purge_expired`].
pub struct MemoryCache {
  entries: scc::HashMap<String, Slot>,
}

impl MemoryCache {
  pub fn new() -> Self {
    Self {
      entries: scc::HashMap::new(),
    }
  }

  /// Drop every expired entry. Returns how many were removed.
  pub async fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut removed = 0;
    self
      .entries
      .retain_async(|_, slot| {
        let keep = !slot.is_expired(now);
        if !keep {
          removed += 1;
        }
        keep
      })
      .await;

    if removed > 0 {
      debug!(removed, "purged expired cache entries");
    }
    removed
  }

  /// Number of stored entries, expired ones included until purged.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  async fn evict_if_expired(&self, key: &str) {
    if let Entry::Occupied(entry) = self.entries.entry_async(key.to_string()).await {
      if entry.get().is_expired(Instant::now()) {
        entry.remove();
      }
    }
  }
}

impl Default for MemoryCache {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Cache for MemoryCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let now = Instant::now();
    let lookup = self
      .entries
      .read_async(key, |_, slot| {
        (!slot.is_expired(now)).then(|| slot.value.clone())
      })
      .await;

    match lookup {
      Some(Some(value)) => {
        debug!(key, "cache hit");
        Ok(Some(value))
      }
      Some(None) => {
        self.evict_if_expired(key).await;
        debug!(key, "cache miss (expired)");
        Ok(None)
      }
      None => {
        debug!(key, "cache miss");
        Ok(None)
      }
    }
  }

  async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
    let slot = Slot {
      value,
      expires_at: Instant::now() + ttl,
    };

    match self.entries.entry_async(key.to_string()).await {
      Entry::Occupied(mut entry) => {
        *entry.get_mut() = slot;
      }
      Entry::Vacant(entry) => {
        entry.insert_entry(slot);
      }
    }
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    let _ = self.entries.remove_async(key).await;
    Ok(())
  }
}
