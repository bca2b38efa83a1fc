//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

use super::enums::MergeStrategy;
use crate::frame::{Resolution, Rgb};

/// Multi-threaded screen-to-GIF recorder
#[derive(Parser, Debug)]
#[command(name = "snapgif")]
#[command(version, about = "Record staggered captures and build a GIF89a", long_about = None)]
pub struct Args {
    /// Frames per second to record at [default: 24]
    #[arg(short, long)]
    pub fps: Option<u32>,

    /// Number of times to play the GIF: -1 plays once, 0 loops forever,
    /// n plays n times [default: 0]
    #[arg(short, long, allow_negative_numbers = true)]
    pub repeat: Option<i32>,

    /// Number of capture threads [default: 2]
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Acceptable frame-rate deviation: the recording fails when the
    /// achieved rate is further than this from --fps. 0 disables the check;
    /// a negative value warns instead of failing [default: -3]
    #[arg(short, long, allow_negative_numbers = true)]
    pub strict_fps: Option<f64>,

    /// Output resolution, formatted like WIDTHxHEIGHT [default: 1280x720]
    #[arg(long)]
    pub resolution: Option<Resolution>,

    /// Output file path [default: a timestamped GIF in your Downloads folder]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quantization sampling factor: 1 trains on every pixel, up to 30
    /// [default: 10]
    #[arg(long)]
    pub sample: Option<u32>,

    /// Color to render as transparent, formatted like RRGGBB
    #[arg(long)]
    pub transparent: Option<Rgb>,

    /// Disposal method (0-3) written into each frame's control block
    #[arg(long)]
    pub disposal: Option<u8>,

    /// Write one global color table instead of a table per frame
    #[arg(long)]
    pub global_color_table: bool,

    /// How worker frame buffers are merged [default: round-robin]
    #[arg(long)]
    pub merge: Option<MergeStrategy>,

    /// Stop recording after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
