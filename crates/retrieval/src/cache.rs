//! Bounded meeting-date cache.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use council_core::{Clock, RetrievalSettings};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, (NaiveDate, DateTime<Utc>)>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// Meeting id to meeting date, with a capacity bound and per-entry TTL.
///
/// Time comes from the injected clock so expiry is testable. When full, the
/// oldest insertion is evicted first.
#[derive(Debug)]
pub struct MeetingDateCache {
    clock: Arc<dyn Clock>,
    capacity: usize,
    ttl: Duration,
    inner: Mutex<CacheInner>,
}

impl MeetingDateCache {
    pub fn new(clock: Arc<dyn Clock>, capacity: usize, ttl: Duration) -> Self {
        Self {
            clock,
            capacity,
            ttl,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// A TTL too large for chrono means entries never expire.
    pub fn from_settings(clock: Arc<dyn Clock>, settings: &RetrievalSettings) -> Self {
        let ttl = i64::try_from(settings.cache_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(clock, settings.cache_capacity, ttl)
    }

    pub fn get(&self, meeting_id: &str) -> Option<NaiveDate> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        match inner.entries.get(meeting_id) {
            Some((date, expires)) if *expires > now => Some(*date),
            Some(_) => {
                inner.entries.remove(meeting_id);
                inner.order.retain(|id| id != meeting_id);
                None
            }
            None => None,
        }
    }

    /// Cached dates for `ids`, skipping misses and expired entries.
    pub fn get_many(&self, ids: &[String]) -> HashMap<String, NaiveDate> {
        ids.iter()
            .filter_map(|id| self.get(id).map(|date| (id.clone(), date)))
            .collect()
    }

    pub fn insert(&self, meeting_id: &str, date: NaiveDate) {
        if self.capacity == 0 {
            return;
        }

        let expires = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.entries.contains_key(meeting_id) {
            inner.order.retain(|id| id != meeting_id);
        }
        while inner.order.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.entries.insert(meeting_id.to_string(), (date, expires));
        inner.order.push_back(meeting_id.to_string());
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::FixedClock;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn cache(capacity: usize) -> (Arc<FixedClock>, MeetingDateCache) {
        let clock = Arc::new(FixedClock::at_date(date(1)));
        let cache = MeetingDateCache::new(clock.clone(), capacity, Duration::minutes(15));
        (clock, cache)
    }

    #[test]
    fn test_hit_and_miss() {
        let (_, cache) = cache(4);
        cache.insert("m1", date(14));
        assert_eq!(cache.get("m1"), Some(date(14)));
        assert_eq!(cache.get("m2"), None);
    }

    #[test]
    fn test_entries_expire() {
        let (clock, cache) = cache(4);
        cache.insert("m1", date(14));

        clock.advance(Duration::minutes(14));
        assert_eq!(cache.get("m1"), Some(date(14)));

        clock.advance(Duration::minutes(2));
        assert_eq!(cache.get("m1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_insertion_evicted_at_capacity() {
        let (_, cache) = cache(2);
        cache.insert("m1", date(1));
        cache.insert("m2", date(2));
        cache.insert("m3", date(3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("m1"), None);
        assert_eq!(cache.get("m3"), Some(date(3)));
    }

    #[test]
    fn test_reinsert_refreshes_position() {
        let (_, cache) = cache(2);
        cache.insert("m1", date(1));
        cache.insert("m2", date(2));
        cache.insert("m1", date(1));
        cache.insert("m3", date(3));

        assert_eq!(cache.get("m1"), Some(date(1)));
        assert_eq!(cache.get("m2"), None);
    }

    #[test]
    fn test_get_many_skips_misses() {
        let (_, cache) = cache(4);
        cache.insert("m1", date(1));
        let found = cache.get_many(&["m1".to_string(), "m9".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found["m1"], date(1));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let clock = Arc::new(FixedClock::at_date(date(1)));
        let settings = RetrievalSettings {
            cache_ttl_secs: 10_000_000_000_000_000,
            ..RetrievalSettings::default()
        };
        let cache = MeetingDateCache::from_settings(clock.clone(), &settings);
        cache.insert("m1", date(14));

        clock.advance(Duration::days(365 * 100));
        assert_eq!(cache.get("m1"), Some(date(14)));

        let cache = MeetingDateCache::new(clock.clone(), 4, Duration::MAX);
        cache.insert("m2", date(2));
        assert_eq!(cache.get("m2"), Some(date(2)));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let (_, cache) = cache(0);
        cache.insert("m1", date(1));
        assert!(cache.is_empty());
    }
}
