#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use slot_scheduler::models::{FixedClock, Slot, SlotStatus};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Reference instant shared by the integration tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 5, 20, 10, 0, 0).unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(now()))
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

/// Slot `id` spanning `[now + from_h, now + to_h]` hours.
pub fn slot_at(id: i64, from_h: i64, to_h: i64, status: SlotStatus) -> Slot {
    Slot::new(id, now() + hours(from_h), now() + hours(to_h), status).unwrap()
}

/// Future slot `id`, one hour long, starting `id` hours from now.
pub fn future_slot(id: i64, status: SlotStatus) -> Slot {
    slot_at(id, id, id + 1, status)
}

/// Runs `f` with environment variables temporarily modified.
///
/// Panic-safe (restores variables on unwind) and serialized through a global
/// lock because tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
