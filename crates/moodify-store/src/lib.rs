//! # moodify-store
//!
//! Local persistence for the Moodify application.
//!
//! Every record lives as one JSON blob under a fixed key. [`KvStore`] gives
//! fail-soft typed access with merge-on-read over a pluggable
//! [`KeyValueBackend`]: [`Database`] keeps the blobs in SQLite, and
//! [`MemoryBackend`] keeps them in a map. On top of that sit the retention
//! sweeper and the full reset.

pub mod database;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod reset;
pub mod retention;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use kv::{KeyValueBackend, KvStore};
pub use memory::MemoryBackend;
pub use reset::{reset_all, ResetReport};
pub use retention::{RetentionSweeper, SweepOutcome, SweeperHandle};
