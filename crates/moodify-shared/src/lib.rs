//! # moodify-shared
//!
//! Domain records, validation rules, assessment scoring, PIN hashing and the
//! HTTP wire types used by every other Moodify crate.

pub mod constants;
pub mod error;
pub mod pin;
pub mod protocol;
pub mod resources;
pub mod scoring;
pub mod stats;
pub mod types;

pub use error::ValidationError;
