// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod feed;
pub mod lifecycle;
pub mod throttle;

// ---- Re-exports for stable public API ----
pub use crate::feed::run_once;
pub use crate::feed::types::{
    ContestRecord, ContestSource, ContestStatus, Platform, TimeConfidence,
};
