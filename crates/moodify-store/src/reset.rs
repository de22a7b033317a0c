//! Full reset: remove every key the application owns.
//!
//! Not transactional. Keys are removed in order and a failure on one key does
//! not stop the rest; whatever was removed stays removed.

use tracing::{error, info};

use moodify_shared::constants::OWNED_KEYS;

use crate::kv::KvStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub removed: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

impl ResetReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn reset_all(store: &KvStore) -> ResetReport {
    let mut report = ResetReport::default();

    for key in OWNED_KEYS {
        match store.try_remove(key) {
            Ok(()) => report.removed.push(key),
            Err(e) => {
                error!(key, error = %e, "failed to remove key during reset");
                report.failed.push(key);
            }
        }
    }

    info!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        "local data reset"
    );
    report
}
