//! Built-in capture sources.

use super::{CaptureError, CaptureSource};
use crate::frame::Raster;

/// A deterministic synthetic source producing a slowly drifting gradient.
///
/// Stands in for a platform screen grabber in the demo binary and in tests;
/// successive snapshots differ, so encoded output exercises the full
/// quantize/compress path.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    tick: u64,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }
}

impl CaptureSource for TestPatternSource {
    fn capture_snapshot(&mut self) -> Result<Raster, CaptureError> {
        let shift = (self.tick * 8) as u32;
        self.tick += 1;

        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x * 255 / self.width.max(1)) + shift) % 256;
                let g = (y * 255 / self.height.max(1)) % 256;
                let b = (x + y + shift) % 256;
                data.push(r as u8);
                data.push(g as u8);
                data.push(b as u8);
            }
        }
        Ok(Raster {
            data,
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_has_expected_dimensions() {
        let mut source = TestPatternSource::new(16, 9);
        let raster = source.capture_snapshot().unwrap();
        assert_eq!(raster.width, 16);
        assert_eq!(raster.height, 9);
        assert_eq!(raster.data.len(), 16 * 9 * 3);
    }

    #[test]
    fn test_pattern_drifts_between_snapshots() {
        let mut source = TestPatternSource::new(8, 8);
        let first = source.capture_snapshot().unwrap();
        let second = source.capture_snapshot().unwrap();
        assert_ne!(first.data, second.data);
    }
}
