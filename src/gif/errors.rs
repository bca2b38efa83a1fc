//! Error types for GIF encoding.

use std::io;
use std::path::PathBuf;

/// The encoding stage an I/O failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    /// Writing fixed structures: header, descriptors, extensions, palettes
    BitstreamWrite,
    /// Writing LZW-compressed pixel data
    Compression,
    /// Flushing the sink at the end of the stream
    Flush,
}

impl std::fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeStage::BitstreamWrite => write!(f, "bitstream write"),
            EncodeStage::Compression => write!(f, "pixel compression"),
            EncodeStage::Flush => write!(f, "final flush"),
        }
    }
}

/// Errors that can occur while encoding a GIF
#[derive(Debug)]
pub enum EncodeError {
    /// Encoder configuration rejected before any byte was written
    InvalidConfiguration(String),
    /// Encode requested with zero frames
    EmptyFrameSet,
    /// The output destination could not be opened
    SinkUnavailable { path: PathBuf, source: io::Error },
    /// The sink failed mid-stream
    Io { stage: EncodeStage, source: io::Error },
    /// The encoder already finished (or failed) and cannot be reused
    AlreadyFinished,
}

impl EncodeError {
    pub(crate) fn io(stage: EncodeStage, source: io::Error) -> Self {
        EncodeError::Io { stage, source }
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::InvalidConfiguration(reason) => {
                write!(f, "Invalid encoder configuration: {}", reason)
            }
            EncodeError::EmptyFrameSet => {
                write!(
                    f,
                    "No frames to encode. Record at least one frame before building a GIF."
                )
            }
            EncodeError::SinkUnavailable { path, source } => {
                write!(
                    f,
                    "Cannot open output file '{}': {}. No output was written.",
                    path.display(),
                    source
                )
            }
            EncodeError::Io { stage, source } => {
                write!(
                    f,
                    "I/O failure during {}: {}. The output file may exist in a partial, corrupt state.",
                    stage, source
                )
            }
            EncodeError::AlreadyFinished => {
                write!(
                    f,
                    "This encoder already produced its stream. Create a new encoder for another GIF."
                )
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::SinkUnavailable { source, .. } | EncodeError::Io { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
