//! Progress reporting for long-running loads.
//!
//! The loader reports rows and pages through [`ProgressCallback`] without
//! knowing how (or whether) progress is rendered. Binaries plug in an
//! `indicatif` implementation; tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a load.
///
/// Implementations must be `Send + Sync` so a single reporter can be shared
/// through an [`Arc`].
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work, when known up front.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
