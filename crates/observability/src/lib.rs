//! Tracing and logging setup shared by binaries.

pub mod tracing;

pub use crate::tracing::{LogFormat, init_with};

/// Install the process-wide subscriber. Later calls are no-ops.
pub fn init() {
    tracing::init();
}
