//! Per-browser sessions (views, games, quizzes) keyed by id.
//!
//! A session nobody touched for the store's TTL is gone: lookups treat it as
//! missing, inserts sweep idle entries, and the server runs a periodic sweep.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

struct Entry<T> {
    value: T,
    last_touched: Instant,
}

pub struct SessionStore<T> {
    kind: &'static str,
    entries: DashMap<Uuid, Entry<T>>,
    ttl: Duration,
}

impl<T> SessionStore<T> {
    pub fn new(kind: &'static str, ttl: Duration) -> Self {
        Self {
            kind,
            entries: DashMap::new(),
            ttl,
        }
    }

    fn idle(&self, last_touched: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_touched) >= self.ttl
    }

    /// Stores a new session under a fresh id, sweeping idle ones first.
    pub fn insert(&self, value: T, now: Instant) -> Uuid {
        self.evict_idle(now);
        let id = Uuid::new_v4();
        self.entries.insert(
            id,
            Entry {
                value,
                last_touched: now,
            },
        );
        id
    }

    /// Runs `f` on a live session and marks it touched at `now`.
    pub fn touch<R>(&self, id: &Uuid, now: Instant, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entry = self.entries.get_mut(id)?;
        if self.idle(entry.last_touched, now) {
            drop(entry);
            self.entries
                .remove_if(id, |_, e| self.idle(e.last_touched, now));
            debug!(kind = self.kind, %id, "idle session expired on access");
            return None;
        }
        entry.last_touched = now;
        Some(f(&mut entry.value))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drops every session idle for at least the TTL; returns how many.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.last_touched) < self.ttl);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(kind = self.kind, evicted, "dropped idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// How often the background sweep runs for a given TTL.
pub fn sweep_period(ttl: Duration) -> Duration {
    (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}
