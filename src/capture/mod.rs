//! Frame acquisition: capture sources, workers, and the scheduler that
//! staggers them.

pub mod errors;
pub mod scheduler;
pub mod sources;
pub mod worker;

pub use errors::CaptureError;
pub use scheduler::{merge_frames, CaptureOutcome, CaptureScheduler};
pub use sources::TestPatternSource;
pub use worker::CaptureWorker;

use crate::frame::Raster;

/// The boundary to whatever actually grabs pixels.
///
/// Implementations take one snapshot per call and own any platform handles
/// they need. Each capture worker gets its own source instance, so
/// implementations never have to be shared across threads.
pub trait CaptureSource: Send {
    /// Grab one truecolor snapshot.
    fn capture_snapshot(&mut self) -> Result<Raster, CaptureError>;
}
