//! Recording sessions: capture, rate policy, and encoding glued together.
//!
//! A `RecordingSession` owns all recording state explicitly; there are no
//! process-wide flags. It drives the capture scheduler, applies the
//! strict/lenient frame-rate policy at stop time, and hands the merged
//! frame stream to the GIF encoder.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::capture::{CaptureError, CaptureScheduler, CaptureSource};
use crate::cli::enums::MergeStrategy;
use crate::frame::{Resolution, Rgb};
use crate::gif::{DelaySource, EncodeError, EncoderConfig, GifEncoder};

/// Everything a recording needs, assembled once and validated before the
/// first worker spawns.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Target frames per second across all workers
    pub fps: u32,
    /// Number of capture worker threads
    pub thread_count: usize,
    /// Frame-rate tolerance: 0 disables the check, positive fails the
    /// recording when exceeded, negative warns instead
    pub strict_fps: f64,
    /// Output resolution; frames are resampled to this size
    pub resolution: Resolution,
    /// How worker buffers are merged
    pub merge: MergeStrategy,
    /// GIF loop count: negative = play once, 0 = forever, n = n times
    pub repeat: i32,
    /// Quantizer sampling factor, 1..=30
    pub quantization_sample: u32,
    /// Color rendered as transparent, if any
    pub transparent_color: Option<Rgb>,
    /// Explicit disposal method 0-3
    pub disposal_method: Option<u8>,
    /// One global color table instead of per-frame tables
    pub use_global_color_table: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            thread_count: 2,
            strict_fps: -3.0,
            resolution: Resolution::default(),
            merge: MergeStrategy::default(),
            repeat: 0,
            quantization_sample: 10,
            transparent_color: None,
            disposal_method: None,
            use_global_color_table: false,
        }
    }
}

impl RecorderConfig {
    /// Check the capture-side settings and the derived encoder settings.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.fps == 0 {
            return Err(SessionError::InvalidConfiguration(
                "frames per second must be greater than 0".to_string(),
            ));
        }
        if self.fps > 1000 {
            return Err(SessionError::InvalidConfiguration(format!(
                "frames per second must be at most 1000, got {}",
                self.fps
            )));
        }
        if self.thread_count == 0 {
            return Err(SessionError::InvalidConfiguration(
                "thread count must be greater than 0".to_string(),
            ));
        }
        self.encoder_config().validate()?;
        Ok(())
    }

    /// The encoder settings this recording implies. Delays always come from
    /// the real capture timestamps.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            width: self.resolution.width,
            height: self.resolution.height,
            repeat: self.repeat,
            delay: DelaySource::PerFrameTimestamps,
            transparent_color: self.transparent_color,
            disposal_method: self.disposal_method,
            quantization_sample: self.quantization_sample,
            use_global_color_table: self.use_global_color_table,
        }
    }
}

/// Errors from the full record-then-encode pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid recorder configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Summary of one finished recording.
#[derive(Debug)]
pub struct RecordingReport {
    pub frame_count: usize,
    pub recorded_for: Duration,
    pub achieved_fps: f64,
    pub output_path: PathBuf,
}

/// One recording from start to encoded file.
pub struct RecordingSession {
    config: RecorderConfig,
    scheduler: CaptureScheduler,
}

impl RecordingSession {
    pub fn new(config: RecorderConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let scheduler = CaptureScheduler::new(config.thread_count, config.fps, config.merge);
        Ok(Self { config, scheduler })
    }

    pub fn is_recording(&self) -> bool {
        self.scheduler.is_recording()
    }

    /// Begin capturing; one source per worker.
    pub fn start<S, F>(&mut self, make_source: F) -> Result<(), SessionError>
    where
        S: CaptureSource + 'static,
        F: FnMut() -> S,
    {
        log::info!("Recording...");
        self.scheduler.start(make_source)?;
        Ok(())
    }

    /// Stop capturing, apply the frame-rate policy, and encode to `output`.
    pub fn stop_and_encode(&mut self, output: &Path) -> Result<RecordingReport, SessionError> {
        let outcome = self.scheduler.stop()?;
        log::info!("Stopped recording.");

        let achieved_fps = outcome.achieved_fps();
        log::debug!(
            "Recorded for {:.2} seconds targeting {} frames per second; achieved {:.2} real frames per second.",
            outcome.recorded_for.as_secs_f64(),
            self.config.fps,
            achieved_fps
        );
        frame_rate_check(self.config.fps, self.config.strict_fps, achieved_fps)?;

        log::info!("Building GIF...");
        log::info!("Processing {} captures...", outcome.frames.len());
        let mut encoder = GifEncoder::new(self.config.encoder_config())?;
        encoder.encode_to_path(&outcome.frames, output)?;
        log::info!("GIF successfully created. Saved to {}.", output.display());

        Ok(RecordingReport {
            frame_count: outcome.frames.len(),
            recorded_for: outcome.recorded_for,
            achieved_fps,
            output_path: output.to_path_buf(),
        })
    }
}

/// Apply the sign-selected strict-fps policy: 0 skips the check, a positive
/// tolerance fails the recording, a negative one downgrades to a warning.
fn frame_rate_check(target_fps: u32, strict_fps: f64, achieved_fps: f64) -> Result<(), CaptureError> {
    if strict_fps == 0.0 {
        return Ok(());
    }
    let tolerance = strict_fps.abs();
    if (achieved_fps - target_fps as f64).abs() <= tolerance {
        return Ok(());
    }
    if strict_fps > 0.0 {
        Err(CaptureError::FrameRateDeviation {
            target_fps,
            tolerance,
            achieved_fps,
        })
    } else {
        log::warn!(
            "Frame rate is more than {} away from the desired {} frames per second (achieved {:.2}). Continuing...",
            tolerance,
            target_fps,
            achieved_fps
        );
        Ok(())
    }
}

/// Timestamp-derived output file name, unique enough for back-to-back
/// recordings.
pub fn timestamped_file_name() -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}.gif", stamp)
}

/// Default output location: `<Downloads>/<unix-millis>.gif`, falling back to
/// the working directory when no Downloads folder exists.
pub fn default_output_path() -> PathBuf {
    let directory = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
    directory.join(timestamped_file_name())
}
