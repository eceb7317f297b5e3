//! In-memory record of accepted Slack `event_id`s.
//!
//! Slack may deliver the same event more than once (and anyone holding a
//! captured request can replay it inside the signature window). The id, not
//! the request, identifies the work, so every delivery after the first is
//! suppressed.
//!
//! # Retention
//!
//! Ids are kept for a TTL (default 24 hours) and the set is capped; once the
//! cap is hit the oldest ids are evicted first. Pruning happens under the same
//! lock as the check-and-insert, so the set never grows without bound. The set
//! is process-local and starts empty on every restart.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

#[derive(Debug, Default)]
struct SeenEvents {
    seen: HashMap<String, Instant>,
    /// Insertion order, oldest at the front.
    order: VecDeque<(Instant, String)>,
}

impl SeenEvents {
    fn prune(&mut self, now: Instant, ttl: Duration) {
        while let Some((seen_at, _)) = self.order.front() {
            if now.saturating_duration_since(*seen_at) < ttl {
                break;
            }
            if let Some((_, id)) = self.order.pop_front() {
                self.seen.remove(&id);
            }
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, id)) = self.order.pop_front() {
            self.seen.remove(&id);
        }
    }
}

#[derive(Debug)]
pub struct EventDeduplicator {
    inner: Mutex<SeenEvents>,
    ttl: Duration,
    capacity: usize,
}

impl EventDeduplicator {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(SeenEvents::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Atomically records `event_id` and reports whether it was new.
    ///
    /// Returns `false` for ids already seen within the TTL and for empty ids.
    pub fn should_process(&self, event_id: &str) -> bool {
        self.should_process_at(event_id, Instant::now())
    }

    pub fn should_process_at(&self, event_id: &str, now: Instant) -> bool {
        if event_id.trim().is_empty() {
            return false;
        }

        // A poisoned lock only means another handler panicked mid-insert; the map is still usable.
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        state.prune(now, self.ttl);

        if state.seen.contains_key(event_id) {
            debug!(event_id = %event_id, "Duplicate event suppressed");
            return false;
        }

        while state.seen.len() >= self.capacity {
            warn!(capacity = self.capacity, "Dedup set full, evicting oldest event id");
            state.evict_oldest();
        }

        state.seen.insert(event_id.to_string(), now);
        state.order.push_back((now, event_id.to_string()));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .seen
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_first_delivery_accepted_second_rejected() {
        let dedup = EventDeduplicator::new(HOUR, 100);

        assert!(dedup.should_process("Ev01"));
        assert!(!dedup.should_process("Ev01"));
        assert!(dedup.should_process("Ev02"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_empty_event_id_never_accepted() {
        let dedup = EventDeduplicator::new(HOUR, 100);

        assert!(!dedup.should_process(""));
        assert!(!dedup.should_process("   "));
        assert!(dedup.is_empty());
    }

    #[test]
    fn test_expired_id_accepted_again() {
        let dedup = EventDeduplicator::new(HOUR, 100);
        let t0 = Instant::now();

        assert!(dedup.should_process_at("Ev01", t0));
        assert!(!dedup.should_process_at("Ev01", t0 + HOUR - Duration::from_secs(1)));
        assert!(dedup.should_process_at("Ev01", t0 + HOUR));
    }

    #[test]
    fn test_expiry_prunes_set() {
        let dedup = EventDeduplicator::new(HOUR, 100);
        let t0 = Instant::now();

        for i in 0..10 {
            assert!(dedup.should_process_at(&format!("Ev{i}"), t0));
        }
        assert_eq!(dedup.len(), 10);

        assert!(dedup.should_process_at("Ev-late", t0 + HOUR * 2));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let dedup = EventDeduplicator::new(HOUR, 3);
        let t0 = Instant::now();

        assert!(dedup.should_process_at("a", t0));
        assert!(dedup.should_process_at("b", t0 + Duration::from_secs(1)));
        assert!(dedup.should_process_at("c", t0 + Duration::from_secs(2)));
        assert!(dedup.should_process_at("d", t0 + Duration::from_secs(3)));

        assert_eq!(dedup.len(), 3);
        // "a" was evicted; "b".."d" are still remembered.
        assert!(!dedup.should_process_at("b", t0 + Duration::from_secs(4)));
        assert!(!dedup.should_process_at("d", t0 + Duration::from_secs(4)));
        assert!(dedup.should_process_at("a", t0 + Duration::from_secs(4)));
    }

    #[test]
    fn test_concurrent_same_id_accepted_once() {
        let dedup = Arc::new(EventDeduplicator::new(HOUR, 1000));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let dedup = Arc::clone(&dedup);
                std::thread::spawn(move || dedup.should_process("Ev-shared"))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|accepted| *accepted)
            .count();

        assert_eq!(accepted, 1);
    }
}
