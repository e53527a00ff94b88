use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tracing::warn;

use crate::models::response::{Detail, SessionResponse};

#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// `None` when the expiry falls outside the representable date range.
    pub fn new(value: T, ttl_seconds: i64) -> Option<Self> {
        let expires_at = TimeDelta::try_seconds(ttl_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))?;
        Some(Self { value, expires_at })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Short-lived cache of built session responses. A TTL of zero disables it.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry<SessionResponse>>,
    ttl_seconds: i64,
}

impl ResponseCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_seconds,
        }
    }

    pub fn key(season: i32, round: i32, detail: Detail) -> String {
        format!("{season}:{round}:{}", detail.as_str())
    }

    pub fn get(&self, key: &str) -> Option<SessionResponse> {
        if self.ttl_seconds <= 0 {
            return None;
        }
        let entry = self.entries.get(key)?;
        if !entry.is_expired() {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.evict_if_expired(key);
        None
    }

    /// Removes the entry only if it is still expired when the shard lock is
    /// held, so a replacement stored in the meantime survives.
    fn evict_if_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| entry.is_expired());
    }

    pub fn insert(&self, key: String, value: SessionResponse) {
        if self.ttl_seconds <= 0 {
            return;
        }
        match CacheEntry::new(value, self.ttl_seconds) {
            Some(entry) => {
                self.entries.insert(key, entry);
            }
            None => warn!("Cache TTL of {}s is out of range, not caching {key}", self.ttl_seconds),
        }
    }
}
