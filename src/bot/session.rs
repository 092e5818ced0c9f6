use std::time::Duration;

use crate::data::cache::TtlCache;
use crate::data::types::{DateWindow, RawRecord};

#[derive(Debug, Clone)]
struct Listing {
    fixtures: Vec<RawRecord>,
    window: Option<DateWindow>,
}

/// Fixtures last listed to each session, so follow-up commands can refer to them by index.
pub struct SessionStore {
    listings: TtlCache<Listing>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            listings: TtlCache::new(ttl),
        }
    }

    /// Replace the session's listing and the date window it covers. Last write wins.
    pub fn remember(&self, session: &str, fixtures: Vec<RawRecord>, window: Option<DateWindow>) {
        self.listings.insert(session, Listing { fixtures, window });
    }

    /// Fixture at a 1-based index of the session's most recent listing.
    pub fn fixture_at(&self, session: &str, index: usize) -> Option<RawRecord> {
        let listing = self.listings.get(session)?;
        index.checked_sub(1).and_then(|i| listing.fixtures.get(i).cloned())
    }

    /// Date window of the session's most recent listing, if it was date-bound.
    pub fn window(&self, session: &str) -> Option<DateWindow> {
        self.listings.get(session)?.window
    }

    pub fn has_listing(&self, session: &str) -> bool {
        self.listings.get(session).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        self.listings.purge_expired()
    }

    pub fn clear(&self) {
        self.listings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_lookup_is_one_based_and_per_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.remember(
            "alice",
            vec![json!({ "fixture": { "id": 1 } }), json!({ "fixture": { "id": 2 } })],
            None,
        );

        assert_eq!(store.fixture_at("alice", 2).unwrap()["fixture"]["id"], 2);
        assert!(store.fixture_at("alice", 0).is_none());
        assert!(store.fixture_at("alice", 3).is_none());
        assert!(store.fixture_at("bob", 1).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.remember("s", vec![json!({ "fixture": { "id": 1 } })], None);
        store.remember("s", vec![json!({ "fixture": { "id": 9 } })], None);
        assert_eq!(store.fixture_at("s", 1).unwrap()["fixture"]["id"], 9);
    }

    #[test]
    fn test_window_follows_latest_listing() {
        let store = SessionStore::new(Duration::from_secs(60));
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        store.remember("s", vec![json!({})], Some(DateWindow::single(day)));
        assert_eq!(store.window("s"), Some(DateWindow::single(day)));
        assert_eq!(store.window("other"), None);

        store.remember("s", vec![json!({})], None);
        assert_eq!(store.window("s"), None);
    }

    #[test]
    fn test_listing_expires() {
        let store = SessionStore::new(Duration::from_millis(20));
        store.remember("s", vec![json!({})], None);
        assert!(store.has_listing("s"));

        sleep(Duration::from_millis(40));
        assert!(!store.has_listing("s"));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.remember("a", vec![json!({})], None);
        store.remember("b", vec![json!({})], None);
        assert_eq!(store.purge_expired(), 0);
        store.clear();
        assert!(!store.has_listing("a"));
    }
}
