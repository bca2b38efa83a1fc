//! One capture worker: a thread that snapshots its source on a fixed
//! cadence and keeps its frames private until joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{CaptureError, CaptureSource};
use crate::frame::Frame;

/// How far a capture may overrun its interval before a rate warning is
/// logged.
const OVERRUN_TOLERANCE: Duration = Duration::from_millis(5);

/// Handle to a running capture thread.
///
/// The thread owns its source and its frame buffer exclusively; the buffer
/// comes back through `join` after the stop flag is raised. A worker that is
/// mid-capture when the flag goes up finishes that snapshot and keeps it.
pub struct CaptureWorker {
    handle: JoinHandle<Vec<Frame>>,
}

impl CaptureWorker {
    /// Spawn a worker that sleeps `offset`, then captures every `interval`,
    /// tagging frames with elapsed time since `started_at`.
    pub fn spawn<S>(
        source: S,
        offset: Duration,
        interval: Duration,
        started_at: Instant,
        stop: Arc<AtomicBool>,
    ) -> Self
    where
        S: CaptureSource + 'static,
    {
        let handle =
            thread::spawn(move || run_capture_loop(source, offset, interval, started_at, stop));
        Self { handle }
    }

    /// Wait for the worker to observe the stop flag and take its frames.
    pub fn join(self) -> Result<Vec<Frame>, CaptureError> {
        self.handle.join().map_err(|_| CaptureError::WorkerPanicked)
    }
}

fn run_capture_loop<S: CaptureSource>(
    mut source: S,
    offset: Duration,
    interval: Duration,
    started_at: Instant,
    stop: Arc<AtomicBool>,
) -> Vec<Frame> {
    if !offset.is_zero() {
        thread::sleep(offset);
    }
    log::debug!("Capture worker starting after {:?} offset.", offset);

    let mut frames = Vec::new();
    while !stop.load(Ordering::SeqCst) {
        let capture_began = Instant::now();
        match source.capture_snapshot() {
            Ok(raster) => {
                let captured_at_ms = started_at.elapsed().as_millis() as u64;
                frames.push(Frame::new(raster, captured_at_ms));
            }
            Err(e) => {
                log::warn!("Snapshot failed: {}. Skipping this frame.", e);
            }
        }

        // Pace to the interval; a capture that blew its budget only costs a
        // warning, never the recording.
        let spent = capture_began.elapsed();
        match interval.checked_sub(spent) {
            Some(remaining) => thread::sleep(remaining),
            None => {
                let overrun = spent - interval;
                if overrun > OVERRUN_TOLERANCE {
                    log::warn!(
                        "Failure to keep up with frame rate: capture overran its {}ms interval by {}ms.",
                        interval.as_millis(),
                        overrun.as_millis()
                    );
                }
            }
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Raster, Rgb};

    struct CountingSource {
        captured: u32,
    }

    impl CaptureSource for CountingSource {
        fn capture_snapshot(&mut self) -> Result<Raster, CaptureError> {
            self.captured += 1;
            Ok(Raster::solid(Rgb::new(0, 0, 0), 2, 2))
        }
    }

    #[test]
    fn test_worker_captures_until_stopped() {
        let stop = Arc::new(AtomicBool::new(false));
        let worker = CaptureWorker::spawn(
            CountingSource { captured: 0 },
            Duration::ZERO,
            Duration::from_millis(5),
            Instant::now(),
            stop.clone(),
        );
        thread::sleep(Duration::from_millis(60));
        stop.store(true, Ordering::SeqCst);
        let frames = worker.join().unwrap();
        assert!(!frames.is_empty());
    }

    #[test]
    fn test_worker_timestamps_are_monotonic() {
        let stop = Arc::new(AtomicBool::new(false));
        let worker = CaptureWorker::spawn(
            CountingSource { captured: 0 },
            Duration::ZERO,
            Duration::from_millis(2),
            Instant::now(),
            stop.clone(),
        );
        thread::sleep(Duration::from_millis(40));
        stop.store(true, Ordering::SeqCst);
        let frames = worker.join().unwrap();
        for pair in frames.windows(2) {
            assert!(pair[0].captured_at_ms <= pair[1].captured_at_ms);
        }
    }

    #[test]
    fn test_worker_with_stop_already_set_returns_no_frames() {
        let stop = Arc::new(AtomicBool::new(true));
        let worker = CaptureWorker::spawn(
            CountingSource { captured: 0 },
            Duration::ZERO,
            Duration::from_millis(1),
            Instant::now(),
            stop,
        );
        let frames = worker.join().unwrap();
        assert!(frames.is_empty());
    }
}
