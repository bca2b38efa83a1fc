//! GIF89a encoding.
//!
//! `GifEncoder` drives the full pipeline: color quantization of each
//! truecolor frame, LZW compression of the resulting palette indices, and
//! the GIF89a block structure around them. Settings live in an immutable
//! `EncoderConfig` validated once up front; the encoder itself is a small
//! state machine that refuses reuse after it has produced a stream.

pub mod bitstream;
pub mod errors;
pub mod lzw;
pub mod quantizer;

pub use bitstream::{delay_between, delay_for_fps, BitstreamWriter};
pub use errors::{EncodeError, EncodeStage};
pub use lzw::LzwEncoder;
pub use quantizer::{quantize, ColorQuantizer, Palette, QuantizationResult};

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::frame::{Frame, Raster, Rgb};

/// Bit planes per palette index; tables always advertise 256 entries.
const COLOR_DEPTH: u8 = 8;

/// Where per-frame delays come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelaySource {
    /// Derive each delay from the difference between consecutive frame
    /// timestamps
    PerFrameTimestamps,
    /// Uniform delay derived from a target frame rate
    ConstantFps(f64),
}

/// Immutable encoder settings, validated once before any byte is written.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Output width in pixels; frames are resampled to match
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Loop count: negative = play once, 0 = loop forever, n = play n times
    pub repeat: i32,
    /// Per-frame delay policy
    pub delay: DelaySource,
    /// Color rendered as transparent, if any
    pub transparent_color: Option<Rgb>,
    /// Explicit disposal method 0-3; `None` selects a default based on
    /// whether transparency is in use
    pub disposal_method: Option<u8>,
    /// Quantizer sampling factor, 1 (every pixel) to 30
    pub quantization_sample: u32,
    /// Write one global color table instead of a table per frame
    pub use_global_color_table: bool,
}

impl EncoderConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            repeat: 0,
            delay: DelaySource::PerFrameTimestamps,
            transparent_color: None,
            disposal_method: None,
            quantization_sample: 10,
            use_global_color_table: false,
        }
    }

    /// Check every setting, returning the first violation.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.width == 0 || self.height == 0 {
            return Err(EncodeError::InvalidConfiguration(format!(
                "output dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > u16::MAX as u32 || self.height > u16::MAX as u32 {
            return Err(EncodeError::InvalidConfiguration(format!(
                "output dimensions exceed the format's 16-bit limit: {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=30).contains(&self.quantization_sample) {
            return Err(EncodeError::InvalidConfiguration(format!(
                "quantization sample factor must be in 1..=30, got {}",
                self.quantization_sample
            )));
        }
        if let DelaySource::ConstantFps(fps) = self.delay {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(EncodeError::InvalidConfiguration(format!(
                    "frames per second must be positive, got {}",
                    fps
                )));
            }
        }
        if let Some(disposal) = self.disposal_method {
            if disposal > 3 {
                return Err(EncodeError::InvalidConfiguration(format!(
                    "disposal method must be 0-3, got {}",
                    disposal
                )));
            }
        }
        if self.repeat > u16::MAX as i32 {
            return Err(EncodeError::InvalidConfiguration(format!(
                "repeat count does not fit the format's 16-bit loop field: {}",
                self.repeat
            )));
        }
        Ok(())
    }
}

/// Encoder lifecycle. `Finished` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    Ready,
    Encoding,
    Finished,
    Failed,
}

/// Orchestrates one GIF encode over an ordered frame list.
pub struct GifEncoder {
    config: EncoderConfig,
    state: EncoderState,
}

impl GifEncoder {
    /// Validate the configuration and produce a ready encoder.
    pub fn new(config: EncoderConfig) -> Result<Self, EncodeError> {
        config.validate()?;
        Ok(Self {
            config,
            state: EncoderState::Ready,
        })
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `frames` into `sink`.
    ///
    /// Rejections (`EmptyFrameSet`, reuse of a finished encoder) happen
    /// before any byte is written. A sink failure mid-stream is logged and
    /// recorded, later frames are still attempted, and the sink is flushed
    /// on the way out; the first failure is what the caller gets back.
    pub fn encode<W: Write>(&mut self, frames: &[Frame], sink: W) -> Result<(), EncodeError> {
        if self.state == EncoderState::Finished || self.state == EncoderState::Failed {
            return Err(EncodeError::AlreadyFinished);
        }
        if frames.is_empty() {
            return Err(EncodeError::EmptyFrameSet);
        }
        self.state = EncoderState::Encoding;

        let mut writer = BitstreamWriter::new(sink);
        let mut first_error: Option<EncodeError> = None;

        // In global-table mode the first frame's palette serves the whole
        // stream; later frames are mapped through it.
        let mut global_quantizer: Option<ColorQuantizer> = None;
        let mut previous_ms = 0u64;

        for (index, frame) in frames.iter().enumerate() {
            let raster = self.normalized(&frame.raster);
            let result = if let Some(quantizer) = global_quantizer.as_ref() {
                quantizer.index_pixels(&raster.data)
            } else {
                let (quantizer, result) = quantize(&raster.data, self.config.quantization_sample);
                if self.config.use_global_color_table {
                    global_quantizer = Some(quantizer);
                }
                result
            };

            if index == 0 {
                let outcome = self.write_stream_prologue(&mut writer, &result.palette);
                record_failure(&mut first_error, outcome, index);
            }

            let delay = match self.config.delay {
                DelaySource::PerFrameTimestamps => {
                    delay_between(previous_ms, frame.captured_at_ms)
                }
                DelaySource::ConstantFps(fps) => delay_for_fps(fps),
            };
            previous_ms = frame.captured_at_ms;

            let outcome = self.write_frame(&mut writer, &result, delay);
            record_failure(&mut first_error, outcome, index);
        }

        let outcome = writer
            .write_trailer()
            .map_err(|e| EncodeError::io(EncodeStage::BitstreamWrite, e))
            .and_then(|_| {
                writer
                    .flush()
                    .map_err(|e| EncodeError::io(EncodeStage::Flush, e))
            });
        record_failure(&mut first_error, outcome, frames.len());

        match first_error {
            Some(error) => {
                self.state = EncoderState::Failed;
                Err(error)
            }
            None => {
                self.state = EncoderState::Finished;
                Ok(())
            }
        }
    }

    /// Encode into a freshly created file, buffering writes.
    pub fn encode_to_path(&mut self, frames: &[Frame], path: &Path) -> Result<(), EncodeError> {
        let file = File::create(path).map_err(|source| EncodeError::SinkUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.encode(frames, BufWriter::new(file))
    }

    /// Header, logical screen descriptor, the global color table when
    /// enabled, and the looping extension when looping is requested.
    fn write_stream_prologue<W: Write>(
        &self,
        writer: &mut BitstreamWriter<W>,
        palette: &Palette,
    ) -> Result<(), EncodeError> {
        let stage = EncodeStage::BitstreamWrite;
        writer.write_header().map_err(|e| EncodeError::io(stage, e))?;
        writer
            .write_logical_screen_descriptor(
                self.config.width as u16,
                self.config.height as u16,
                self.config.use_global_color_table,
            )
            .map_err(|e| EncodeError::io(stage, e))?;
        if self.config.use_global_color_table {
            writer
                .write_color_table(&palette.colors)
                .map_err(|e| EncodeError::io(stage, e))?;
        }
        if self.config.repeat >= 0 {
            writer
                .write_loop_extension(self.config.repeat as u16)
                .map_err(|e| EncodeError::io(stage, e))?;
        }
        Ok(())
    }

    /// One frame's graphic control extension, image descriptor, local color
    /// table (unless the global table is in force), and pixel data.
    fn write_frame<W: Write>(
        &self,
        writer: &mut BitstreamWriter<W>,
        result: &QuantizationResult,
        delay_centis: u16,
    ) -> Result<(), EncodeError> {
        let stage = EncodeStage::BitstreamWrite;
        let transparent_index = self
            .config
            .transparent_color
            .map(|c| result.palette.find_closest(c.r, c.g, c.b));
        let disposal = self
            .config
            .disposal_method
            .unwrap_or(if transparent_index.is_some() { 2 } else { 0 });

        writer
            .write_graphic_control(disposal, delay_centis, transparent_index)
            .map_err(|e| EncodeError::io(stage, e))?;
        writer
            .write_image_descriptor(
                self.config.width as u16,
                self.config.height as u16,
                !self.config.use_global_color_table,
            )
            .map_err(|e| EncodeError::io(stage, e))?;
        if !self.config.use_global_color_table {
            writer
                .write_color_table(&result.palette.colors)
                .map_err(|e| EncodeError::io(stage, e))?;
        }
        writer
            .write_pixels(&result.indices, COLOR_DEPTH)
            .map_err(|e| EncodeError::io(EncodeStage::Compression, e))
    }

    /// Bring a raster to the configured dimensions, borrowing when it
    /// already matches.
    fn normalized<'a>(&self, raster: &'a Raster) -> Cow<'a, Raster> {
        if raster.width == self.config.width && raster.height == self.config.height {
            Cow::Borrowed(raster)
        } else {
            Cow::Owned(raster.clone().resize_to(self.config.width, self.config.height))
        }
    }
}

/// Keep the first failure, log the rest.
fn record_failure(
    first_error: &mut Option<EncodeError>,
    outcome: Result<(), EncodeError>,
    frame_index: usize,
) {
    if let Err(error) = outcome {
        log::error!(
            "Encoding error at frame {}: {}. Trying to continue...",
            frame_index,
            error
        );
        if first_error.is_none() {
            *first_error = Some(error);
        }
    }
}
