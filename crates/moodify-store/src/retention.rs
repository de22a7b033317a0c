//! Retention sweeper.
//!
//! Mood entries and assessments older than [`RETENTION_MONTHS`] are purged
//! from the aggregate application state. Daily check-ins are kept forever.
//! The sweep works on the raw JSON blob so that fields it does not know about
//! are written back untouched.

use std::time::Duration;

use chrono::{DateTime, Months, Utc};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use moodify_shared::constants::{KEY_APP_STATE, RETENTION_MONTHS, RETENTION_SWEEP_INTERVAL_SECS};

use crate::error::{Result, StoreError};
use crate::kv::KvStore;

const MOOD_HISTORY: &str = "moodHistory";
const MOOD_TIMESTAMP: &str = "createdAt";
const ASSESSMENT_HISTORY: &str = "assessmentHistory";
const ASSESSMENT_TIMESTAMP: &str = "completedAt";

/// Oldest timestamp still retained at `now`.
pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(RETENTION_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub moods_removed: usize,
    pub assessments_removed: usize,
}

impl SweepOutcome {
    pub fn total(&self) -> usize {
        self.moods_removed + self.assessments_removed
    }
}

fn is_retained(entry: &Value, field: &str, cutoff: DateTime<Utc>) -> bool {
    // An unreadable timestamp never compares as recent.
    entry
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(false, |at| at.with_timezone(&Utc) >= cutoff)
}

fn prune(state: &mut Value, collection: &str, field: &str, cutoff: DateTime<Utc>) -> usize {
    let Some(Value::Array(entries)) = state.get_mut(collection) else {
        return 0;
    };
    let before = entries.len();
    entries.retain(|entry| is_retained(entry, field, cutoff));
    before - entries.len()
}

/// Apply the retention policy to a parsed aggregate in place.
pub fn prune_state(state: &mut Value, now: DateTime<Utc>) -> SweepOutcome {
    let cutoff = retention_cutoff(now);
    SweepOutcome {
        moods_removed: prune(state, MOOD_HISTORY, MOOD_TIMESTAMP, cutoff),
        assessments_removed: prune(state, ASSESSMENT_HISTORY, ASSESSMENT_TIMESTAMP, cutoff),
    }
}

/// Sweep the aggregate stored under `key`.
///
/// Returns `Ok(None)` when nothing is stored. Otherwise the pruned blob is
/// written back, whether or not anything was removed.
pub fn sweep(store: &KvStore, key: &str, now: DateTime<Utc>) -> Result<Option<SweepOutcome>> {
    store.update_json(key, |state| {
        if !state.is_object() {
            return Err(StoreError::Malformed {
                key: key.to_string(),
                reason: "application state is not an object",
            });
        }
        Ok(prune_state(state, now))
    })
}

/// Recurring retention task over one store key.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: KvStore,
    key: String,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            key: KEY_APP_STATE.to_string(),
            interval: Duration::from_secs(RETENTION_SWEEP_INTERVAL_SECS),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One sweep as of `now`. Errors are logged and the cycle is skipped.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> Option<SweepOutcome> {
        match sweep(&self.store, &self.key, now) {
            Ok(Some(outcome)) => {
                if outcome.total() > 0 {
                    info!(
                        key = %self.key,
                        moods = outcome.moods_removed,
                        assessments = outcome.assessments_removed,
                        "purged entries past retention horizon"
                    );
                } else {
                    debug!(key = %self.key, "retention sweep found nothing to purge");
                }
                Some(outcome)
            }
            Ok(None) => {
                debug!(key = %self.key, "no stored state to sweep");
                None
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "retention sweep failed, retrying next cycle");
                None
            }
        }
    }

    pub fn run_once(&self) -> Option<SweepOutcome> {
        self.sweep_at(Utc::now())
    }

    /// Sweep now, then once per interval, until the handle is stopped or
    /// dropped. Must be called from within a tokio runtime.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            // The first tick completes immediately.
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let sweeper = self.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || sweeper.run_once()).await {
                            error!(error = %e, "retention sweep task panicked");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        debug!("retention sweeper stopped");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running sweeper. Dropping it cancels the task.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ts(at: DateTime<Utc>) -> String {
        at.to_rfc3339()
    }

    fn store_with(state: Value) -> KvStore {
        let store = KvStore::new(MemoryBackend::new());
        store
            .try_save_raw(KEY_APP_STATE, &state.to_string())
            .unwrap();
        store
    }

    fn stored(store: &KvStore) -> Value {
        serde_json::from_str(&store.try_load_raw(KEY_APP_STATE).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_cutoff_is_three_calendar_months() {
        assert_eq!(
            retention_cutoff(now()),
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_boundary_one_second_each_side() {
        let cutoff = retention_cutoff(now());
        let store = store_with(json!({
            "moodHistory": [
                {"id": "keep", "mood": "happy", "intensity": 5,
                 "createdAt": ts(cutoff + ChronoDuration::seconds(1))},
                {"id": "drop", "mood": "sad", "intensity": 5,
                 "createdAt": ts(cutoff - ChronoDuration::seconds(1))},
            ],
            "assessmentHistory": [
                {"id": "a-keep", "completedAt": ts(cutoff + ChronoDuration::seconds(1))},
                {"id": "a-drop", "completedAt": ts(cutoff - ChronoDuration::seconds(1))},
            ],
        }));

        let outcome = sweep(&store, KEY_APP_STATE, now()).unwrap().unwrap();
        assert_eq!(
            outcome,
            SweepOutcome {
                moods_removed: 1,
                assessments_removed: 1
            }
        );

        let state = stored(&store);
        assert_eq!(state["moodHistory"].as_array().unwrap().len(), 1);
        assert_eq!(state["moodHistory"][0]["id"], "keep");
        assert_eq!(state["assessmentHistory"][0]["id"], "a-keep");
    }

    #[test]
    fn test_check_ins_never_removed() {
        let ancient = ts(now() - ChronoDuration::days(3650));
        let store = store_with(json!({
            "hasCompletedOnboarding": true,
            "moodHistory": [],
            "dailyCheckIns": [
                {"id": "c1", "question": "q", "answer": "a", "createdAt": ancient},
            ],
            "somethingNew": {"kept": true},
        }));

        sweep(&store, KEY_APP_STATE, now()).unwrap();

        let state = stored(&store);
        assert_eq!(state["dailyCheckIns"].as_array().unwrap().len(), 1);
        assert_eq!(state["hasCompletedOnboarding"], true);
        assert_eq!(state["somethingNew"]["kept"], true);
    }

    #[test]
    fn test_unparsable_timestamp_removed() {
        let store = store_with(json!({
            "moodHistory": [
                {"id": "bad", "createdAt": "last tuesday"},
                {"id": "none"},
                {"id": "ok", "createdAt": ts(now())},
            ],
        }));
        let outcome = sweep(&store, KEY_APP_STATE, now()).unwrap().unwrap();
        assert_eq!(outcome.moods_removed, 2);
        assert_eq!(stored(&store)["moodHistory"][0]["id"], "ok");
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let store = store_with(json!({
            "moodHistory": [
                {"id": "old", "createdAt": ts(now() - ChronoDuration::days(200))},
                {"id": "new", "createdAt": ts(now() - ChronoDuration::days(2))},
            ],
            "assessmentHistory": [],
        }));

        sweep(&store, KEY_APP_STATE, now()).unwrap();
        let once = stored(&store);
        let second = sweep(&store, KEY_APP_STATE, now()).unwrap().unwrap();
        assert_eq!(second.total(), 0);
        assert_eq!(stored(&store), once);
    }

    #[test]
    fn test_absent_state_not_created() {
        let store = KvStore::new(MemoryBackend::new());
        assert_eq!(sweep(&store, KEY_APP_STATE, now()).unwrap(), None);
        assert!(store.try_load_raw(KEY_APP_STATE).unwrap().is_none());
    }

    #[test]
    fn test_malformed_state_left_untouched() {
        let store = KvStore::new(MemoryBackend::with_entries([(KEY_APP_STATE, "[1,2,3]")]));
        let sweeper = RetentionSweeper::new(store.clone());
        assert_eq!(sweeper.sweep_at(now()), None);
        assert_eq!(
            store.try_load_raw(KEY_APP_STATE).unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn test_spawned_sweeper_runs_immediately_and_stops() {
        let old = ts(Utc::now() - ChronoDuration::days(365));
        let store = store_with(json!({
            "moodHistory": [{"id": "old", "createdAt": old}],
        }));

        let handle = RetentionSweeper::new(store.clone())
            .with_interval(Duration::from_secs(3600))
            .spawn();

        let mut swept = false;
        for _ in 0..100 {
            if stored(&store)["moodHistory"]
                .as_array()
                .is_some_and(|a| a.is_empty())
            {
                swept = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(swept, "first sweep should run without waiting a full interval");

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_dropped_handle_cancels_task() {
        let store = KvStore::new(MemoryBackend::new());
        let handle = RetentionSweeper::new(store)
            .with_interval(Duration::from_millis(5))
            .spawn();
        assert!(!handle.is_finished());
        drop(handle);
    }
}
