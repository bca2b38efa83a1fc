//! Error types for capture operations.

/// Errors that can occur while capturing frames
#[derive(Debug)]
pub enum CaptureError {
    /// start() called while a recording is already in progress
    AlreadyRecording,
    /// stop() called with no recording in progress
    NotRecording,
    /// The capture source failed to produce a snapshot
    SourceFailed(String),
    /// The achieved frame rate fell outside the configured tolerance
    FrameRateDeviation {
        target_fps: u32,
        tolerance: f64,
        achieved_fps: f64,
    },
    /// A worker thread panicked before handing back its frames
    WorkerPanicked,
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::AlreadyRecording => {
                write!(f, "Cannot start recording while already recording.")
            }
            CaptureError::NotRecording => {
                write!(f, "Cannot stop recording if not currently recording.")
            }
            CaptureError::SourceFailed(msg) => {
                write!(f, "Capture source failed: {}", msg)
            }
            CaptureError::FrameRateDeviation {
                target_fps,
                tolerance,
                achieved_fps,
            } => {
                write!(
                    f,
                    "Recording failed: expected {} +/- {} frames per second, but got {:.2} frames per second.\n\nLower --fps or --threads, or relax --strict-fps (a negative value warns instead of failing).",
                    target_fps, tolerance, achieved_fps
                )
            }
            CaptureError::WorkerPanicked => {
                write!(f, "A capture worker thread panicked; its frames were lost.")
            }
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_deviation_display() {
        let err = CaptureError::FrameRateDeviation {
            target_fps: 24,
            tolerance: 3.0,
            achieved_fps: 11.5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("24"));
        assert!(msg.contains("11.5"));
        assert!(msg.contains("--strict-fps"));
    }

    #[test]
    fn test_already_recording_display() {
        let msg = format!("{}", CaptureError::AlreadyRecording);
        assert!(msg.contains("already recording"));
    }
}
