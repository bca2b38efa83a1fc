//! Staggered multi-worker capture.
//!
//! N workers capturing every `N * base_interval` with phase offsets
//! `0, base_interval, 2 * base_interval, ...` collectively sample the screen
//! N times more densely than one worker could sustain. Workers share nothing
//! but a stop flag and the recording-start instant; their private buffers
//! are merged only after every thread has been joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{CaptureError, CaptureSource, CaptureWorker};
use crate::cli::enums::MergeStrategy;
use crate::frame::Frame;

/// What a finished recording hands back: the merged frame stream and how
/// long capture actually ran.
#[derive(Debug)]
pub struct CaptureOutcome {
    pub frames: Vec<Frame>,
    pub recorded_for: Duration,
}

impl CaptureOutcome {
    /// Frames per second actually achieved across all workers.
    pub fn achieved_fps(&self) -> f64 {
        let seconds = self.recorded_for.as_secs_f64();
        if seconds > 0.0 {
            self.frames.len() as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Starts and stops a set of staggered capture workers.
pub struct CaptureScheduler {
    thread_count: usize,
    fps: u32,
    merge: MergeStrategy,
    stop: Arc<AtomicBool>,
    workers: Vec<CaptureWorker>,
    started_at: Option<Instant>,
}

impl CaptureScheduler {
    /// `thread_count` and `fps` are validated by the recorder configuration
    /// before a scheduler is built; both must be positive.
    pub fn new(thread_count: usize, fps: u32, merge: MergeStrategy) -> Self {
        debug_assert!(thread_count > 0);
        debug_assert!(fps > 0);
        Self {
            thread_count,
            fps,
            merge,
            stop: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            started_at: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.started_at.is_some()
    }

    /// Spawn the workers, one source per worker.
    pub fn start<S, F>(&mut self, mut make_source: F) -> Result<(), CaptureError>
    where
        S: CaptureSource + 'static,
        F: FnMut() -> S,
    {
        if self.started_at.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        log::debug!("Set to record on {} threads.", self.thread_count);

        self.stop.store(false, Ordering::SeqCst);
        let base_interval = Duration::from_millis(1000 / self.fps as u64);
        let worker_interval = base_interval * self.thread_count as u32;

        let started_at = Instant::now();
        for i in 0..self.thread_count {
            let offset = base_interval * i as u32;
            self.workers.push(CaptureWorker::spawn(
                make_source(),
                offset,
                worker_interval,
                started_at,
                Arc::clone(&self.stop),
            ));
        }
        self.started_at = Some(started_at);
        Ok(())
    }

    /// Raise the stop flag, join every worker, and merge their buffers.
    ///
    /// A worker that panicked is logged and skipped; the surviving buffers
    /// still merge.
    pub fn stop(&mut self) -> Result<CaptureOutcome, CaptureError> {
        let started_at = self.started_at.take().ok_or(CaptureError::NotRecording)?;
        self.stop.store(true, Ordering::SeqCst);

        let mut buffers = Vec::with_capacity(self.workers.len());
        for worker in self.workers.drain(..) {
            match worker.join() {
                Ok(frames) => buffers.push(frames),
                Err(e) => log::error!("{}", e),
            }
        }
        let recorded_for = started_at.elapsed();

        Ok(CaptureOutcome {
            frames: merge_frames(buffers, self.merge),
            recorded_for,
        })
    }
}

/// Combine per-worker buffers into one stream.
///
/// Round-robin takes one frame per worker per round until the longest
/// buffer runs dry, skipping workers that ran out earlier. This is an
/// approximation of chronological order, not a sort; `Timestamp` does the
/// stable sort instead.
pub fn merge_frames(buffers: Vec<Vec<Frame>>, strategy: MergeStrategy) -> Vec<Frame> {
    let total: usize = buffers.iter().map(|b| b.len()).sum();
    match strategy {
        MergeStrategy::RoundRobin => {
            let rounds = buffers.iter().map(|b| b.len()).max().unwrap_or(0);
            let mut cursors: Vec<_> = buffers.into_iter().map(|b| b.into_iter()).collect();
            let mut merged = Vec::with_capacity(total);
            for _ in 0..rounds {
                for cursor in cursors.iter_mut() {
                    if let Some(frame) = cursor.next() {
                        merged.push(frame);
                    }
                }
            }
            merged
        }
        MergeStrategy::Timestamp => {
            let mut merged: Vec<Frame> = buffers.into_iter().flatten().collect();
            merged.sort_by_key(|f| f.captured_at_ms);
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::TestPatternSource;
    use crate::frame::{Raster, Rgb};
    use std::thread;

    fn frame_at(ms: u64) -> Frame {
        Frame::new(Raster::solid(Rgb::new(0, 0, 0), 1, 1), ms)
    }

    #[test]
    fn test_round_robin_merge_alternates_workers() {
        // Two workers, five frames each: merged stream alternates and keeps
        // all ten frames.
        let worker_a: Vec<Frame> = [0, 100, 200, 300, 400].iter().map(|&t| frame_at(t)).collect();
        let worker_b: Vec<Frame> = [50, 150, 250, 350, 450].iter().map(|&t| frame_at(t)).collect();
        let merged = merge_frames(vec![worker_a, worker_b], MergeStrategy::RoundRobin);
        assert_eq!(merged.len(), 10);
        let times: Vec<u64> = merged.iter().map(|f| f.captured_at_ms).collect();
        assert_eq!(times, vec![0, 50, 100, 150, 200, 250, 300, 350, 400, 450]);
    }

    #[test]
    fn test_round_robin_merge_skips_exhausted_workers() {
        let worker_a: Vec<Frame> = [0, 100, 200].iter().map(|&t| frame_at(t)).collect();
        let worker_b: Vec<Frame> = [50].iter().map(|&t| frame_at(t)).collect();
        let merged = merge_frames(vec![worker_a, worker_b], MergeStrategy::RoundRobin);
        let times: Vec<u64> = merged.iter().map(|f| f.captured_at_ms).collect();
        assert_eq!(times, vec![0, 50, 100, 200]);
    }

    #[test]
    fn test_round_robin_merge_empty() {
        assert!(merge_frames(Vec::new(), MergeStrategy::RoundRobin).is_empty());
    }

    #[test]
    fn test_timestamp_merge_sorts_chronologically() {
        let worker_a: Vec<Frame> = [0, 300, 310].iter().map(|&t| frame_at(t)).collect();
        let worker_b: Vec<Frame> = [100, 150, 500].iter().map(|&t| frame_at(t)).collect();
        let merged = merge_frames(vec![worker_a, worker_b], MergeStrategy::Timestamp);
        let times: Vec<u64> = merged.iter().map(|f| f.captured_at_ms).collect();
        assert_eq!(times, vec![0, 100, 150, 300, 310, 500]);
    }

    #[test]
    fn test_scheduler_start_stop_produces_frames() {
        let mut scheduler = CaptureScheduler::new(2, 100, MergeStrategy::RoundRobin);
        scheduler.start(|| TestPatternSource::new(4, 4)).unwrap();
        assert!(scheduler.is_recording());
        thread::sleep(Duration::from_millis(80));
        let outcome = scheduler.stop().unwrap();
        assert!(!scheduler.is_recording());
        assert!(!outcome.frames.is_empty());
        assert!(outcome.recorded_for >= Duration::from_millis(80));
    }

    #[test]
    fn test_scheduler_rejects_double_start() {
        let mut scheduler = CaptureScheduler::new(1, 100, MergeStrategy::RoundRobin);
        scheduler.start(|| TestPatternSource::new(2, 2)).unwrap();
        let err = scheduler.start(|| TestPatternSource::new(2, 2)).unwrap_err();
        assert!(matches!(err, CaptureError::AlreadyRecording));
        scheduler.stop().unwrap();
    }

    #[test]
    fn test_scheduler_rejects_stop_when_idle() {
        let mut scheduler = CaptureScheduler::new(1, 100, MergeStrategy::RoundRobin);
        let err = scheduler.stop().unwrap_err();
        assert!(matches!(err, CaptureError::NotRecording));
    }

    #[test]
    fn test_outcome_fps_math() {
        let outcome = CaptureOutcome {
            frames: (0..50).map(|i| frame_at(i * 100)).collect(),
            recorded_for: Duration::from_secs(5),
        };
        assert!((outcome.achieved_fps() - 10.0).abs() < f64::EPSILON);
    }
}
