use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sb_reconcile::{CacheGateway, CacheReadError, CacheWriteError};

use crate::{Clock, SystemClock};

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache honouring TTLs against a [`Clock`].
///
/// An entry is absent from the instant `written_at + ttl` onwards.
#[derive(Debug)]
pub struct MemoryCache<K = SystemClock> {
    clock: K,
    entries: HashMap<String, Entry>,
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K: Clock> MemoryCache<K> {
    pub fn with_clock(clock: K) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
        }
    }

    /// Live value for `key`, without touching expired entries.
    pub fn peek(&self, key: &str) -> Option<&str> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.as_str())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Clock> CacheGateway for MemoryCache<K> {
    fn get(&mut self, key: &str) -> Result<Option<String>, CacheReadError> {
        let now = self.clock.now();
        let live = self.entries.get(key).map(|e| e.expires_at > now);
        match live {
            Some(true) => Ok(self.entries.get(key).map(|e| e.value.clone())),
            Some(false) => {
                self.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheWriteError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheWriteError(format!("ttl out of range: {e}")))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| CacheWriteError("ttl overflows clock".to_string()))?;

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    const DAY: Duration = Duration::from_secs(86_400);

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn get_returns_written_value_before_expiry() {
        let clock = ManualClock::new(start());
        let mut cache = MemoryCache::with_clock(clock.clone());

        cache.set("github:r:abc", "success", 14 * DAY).unwrap();
        clock.advance(chrono::Duration::days(13));

        assert_eq!(cache.get("github:r:abc").unwrap().as_deref(), Some("success"));
    }

    #[test]
    fn entry_is_absent_once_ttl_elapses() {
        let clock = ManualClock::new(start());
        let mut cache = MemoryCache::with_clock(clock.clone());

        cache.set("k", "pending", 14 * DAY).unwrap();
        clock.advance(chrono::Duration::days(14));

        assert_eq!(cache.get("k").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_refreshes_value_and_expiry() {
        let clock = ManualClock::new(start());
        let mut cache = MemoryCache::with_clock(clock.clone());

        cache.set("k", "pending", DAY).unwrap();
        clock.advance(chrono::Duration::hours(23));
        cache.set("k", "failure", DAY).unwrap();
        clock.advance(chrono::Duration::hours(2));

        assert_eq!(cache.peek("k"), Some("failure"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let mut cache = MemoryCache::new();
        assert_eq!(cache.get("nope").unwrap(), None);
    }

    #[test]
    fn absurd_ttl_is_a_write_error() {
        let mut cache = MemoryCache::new();
        assert!(cache.set("k", "v", Duration::MAX).is_err());
    }
}
