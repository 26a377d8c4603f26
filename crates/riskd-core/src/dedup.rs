//! Event dedup cache (§4.8 step 1): `(event_kind, entity_id) -> seen` with a
//! sliding TTL, swept lazily on every call rather than by a background task.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub struct DedupCache {
    ttl: Duration,
    seen: HashMap<(&'static str, String), DateTime<Utc>>,
}

impl DedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, seen: HashMap::new() }
    }

    /// Returns `true` if `(kind, entity_id)` was already seen within the TTL
    /// window (a duplicate to drop); otherwise records it as seen now and
    /// returns `false`. Expired entries anywhere in the map are swept first.
    pub fn check_and_record(&mut self, kind: &'static str, entity_id: &str, now: DateTime<Utc>) -> bool {
        self.sweep(now);
        let key = (kind, entity_id.to_string());
        if self.seen.contains_key(&key) {
            return true;
        }
        self.seen.insert(key, now);
        false
    }

    fn sweep(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.seen.retain(|_, seen_at| now.signed_duration_since(*seen_at).to_std().map(|age| age < ttl).unwrap_or(true));
    }
}
