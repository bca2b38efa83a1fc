//! Frame data model: truecolor rasters, capture timestamps, and resolutions.

use std::fmt;
use std::str::FromStr;

/// A single RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color from a `RRGGBB` hex string (optionally `#`-prefixed).
    pub fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(ColorParseError(s.to_string()));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| ColorParseError(s.to_string()))?;
        Ok(Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        })
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone)]
pub struct ColorParseError(String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid color '{}'. Colors should be formatted like RRGGBB (e.g. ff0000)",
            self.0
        )
    }
}

impl std::error::Error for ColorParseError {}

/// An owned truecolor pixel buffer.
///
/// Pixels are stored row-major, 3 bytes per pixel, in R, G, B channel order.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Raw pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Raster {
    /// Create a raster from raw RGB bytes.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Create a raster filled with a single color.
    pub fn solid(color: Rgb, width: u32, height: u32) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        3
    }

    /// Number of pixels in the raster.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Resample the raster to the given dimensions.
    ///
    /// Returns `self` unchanged when the dimensions already match. Resampling
    /// uses a triangle (bilinear) filter, which keeps output file size down
    /// without the ringing of sharper kernels.
    pub fn resize_to(self, width: u32, height: u32) -> Raster {
        if self.width == width && self.height == height {
            return self;
        }
        let image: image::RgbImage =
            image::ImageBuffer::from_raw(self.width, self.height, self.data)
                .expect("raster buffer length matches its dimensions");
        let resized =
            image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle);
        Raster {
            data: resized.into_raw(),
            width,
            height,
        }
    }
}

/// A captured frame: one raster tagged with the elapsed time since the
/// recording started.
///
/// Frames are immutable once created and move from capture worker to
/// scheduler to encoder by ownership transfer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub raster: Raster,
    /// Milliseconds since the shared recording-start instant
    pub captured_at_ms: u64,
}

impl Frame {
    pub fn new(raster: Raster, captured_at_ms: u64) -> Self {
        Self {
            raster,
            captured_at_ms,
        }
    }
}

/// An output resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    /// Parse a `WIDTHxHEIGHT` string (e.g. `1280x720`). Both dimensions must
    /// be positive integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width_str, height_str) = s
            .split_once('x')
            .ok_or_else(|| ResolutionParseError::MissingSeparator(s.to_string()))?;
        let width: u32 = width_str
            .trim()
            .parse()
            .map_err(|_| ResolutionParseError::NotAnInteger(s.to_string()))?;
        let height: u32 = height_str
            .trim()
            .parse()
            .map_err(|_| ResolutionParseError::NotAnInteger(s.to_string()))?;
        if width == 0 || height == 0 {
            return Err(ResolutionParseError::NotPositive(s.to_string()));
        }
        Ok(Self { width, height })
    }
}

/// Errors that can occur when parsing a resolution string
#[derive(Debug, Clone)]
pub enum ResolutionParseError {
    /// No 'x' separator between width and height
    MissingSeparator(String),
    /// Width or height is not an integer
    NotAnInteger(String),
    /// Width or height is zero
    NotPositive(String),
}

impl fmt::Display for ResolutionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionParseError::MissingSeparator(s) => {
                write!(
                    f,
                    "Invalid resolution '{}'. Resolutions should be formatted like WIDTHxHEIGHT",
                    s
                )
            }
            ResolutionParseError::NotAnInteger(s) => {
                write!(
                    f,
                    "Invalid resolution '{}'. Width and height should be integers separated by an 'x'",
                    s
                )
            }
            ResolutionParseError::NotPositive(s) => {
                write!(
                    f,
                    "Invalid resolution '{}'. Width and height should both be positive",
                    s
                )
            }
        }
    }
}

impl std::error::Error for ResolutionParseError {}
