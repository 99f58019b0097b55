//! Run identity.
//!
//! Ids are positive `i64`s laid out as `unix_millis << 16 | random16`. Two
//! watchers starting in the same millisecond still differ in the low bits,
//! and within one process every id is strictly greater than the last.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const RANDOM_BITS: u32 = 16;

/// Unique identifier of one watch cycle; the join key between the artifact
/// file and the relational row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub i64);

impl RunId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RunId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Process-wide floor shared by every [`RunIdSource`].
static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Allocates collision-resistant run ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunIdSource;

impl RunIdSource {
    pub fn new() -> Self {
        Self
    }

    pub fn next(&self) -> RunId {
        self.next_at(Utc::now())
    }

    pub fn next_at(&self, now: DateTime<Utc>) -> RunId {
        let noise: i64 = rand::thread_rng().gen_range(0..(1_i64 << RANDOM_BITS));
        let candidate = (now.timestamp_millis().max(0) << RANDOM_BITS) | noise;

        let mut prev = LAST_ISSUED.load(Ordering::Relaxed);
        loop {
            let id = candidate.max(prev + 1);
            match LAST_ISSUED.compare_exchange_weak(prev, id, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return RunId(id),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn ids_are_strictly_increasing_within_process() {
        let source = RunIdSource::new();
        let now = Utc::now();
        let mut last = source.next_at(now);
        for _ in 0..10_000 {
            let id = source.next_at(now);
            assert!(id > last, "{id} must be > {last}");
            last = id;
        }
    }

    #[test]
    fn ids_do_not_collide_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let source = RunIdSource::new();
                    (0..1_000).map(|_| source.next()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }

    #[test]
    fn ids_encode_wall_clock_millis() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let id = RunIdSource::new().next_at(at);
        assert!(id.get() > 0);
        assert!(id.get() >> RANDOM_BITS >= at.timestamp_millis());
    }
}
