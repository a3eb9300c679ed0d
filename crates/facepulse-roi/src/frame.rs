//! Owned RGBA frame buffer.

use crate::port::PixelSource;

/// Errors from frame construction.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("pixel buffer holds {got} bytes, expected {expected} for {width}x{height} RGBA")]
    PixelBufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

/// A single video frame: 8-bit RGBA, row-major.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl VideoFrame {
    /// Wrap an RGBA pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PixelBufferMismatch`] when the buffer
    /// length is not `4 * width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let expected = 4 * width as usize * height as usize;
        if pixels.len() != expected {
            return Err(FrameError::PixelBufferMismatch {
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame filled with one RGBA value.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(4 * width as usize * height as usize);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Raw pixel bytes, row-major RGBA.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Overwrite one pixel. Out-of-bounds coordinates are ignored.
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = 4 * (y as usize * self.width as usize + x as usize);
        self.pixels[offset..offset + 4].copy_from_slice(&rgba);
    }
}

impl PixelSource for VideoFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = 4 * (y as usize * self.width as usize + x as usize);
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_is_validated() {
        assert!(VideoFrame::new(4, 4, vec![0; 64]).is_ok());
        assert!(matches!(
            VideoFrame::new(4, 4, vec![0; 63]),
            Err(FrameError::PixelBufferMismatch { expected: 64, got: 63, .. }),
        ));
    }

    #[test]
    fn solid_frame_reads_back_uniformly() {
        let frame = VideoFrame::solid(3, 2, [10, 200, 30, 255]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.rgba(x, y), [10, 200, 30, 255]);
            }
        }
    }

    #[test]
    fn put_overwrites_a_single_pixel() {
        let mut frame = VideoFrame::solid(4, 4, [0, 0, 0, 255]);
        frame.put(2, 1, [1, 2, 3, 4]);
        assert_eq!(frame.rgba(2, 1), [1, 2, 3, 4]);
        assert_eq!(frame.rgba(1, 1), [0, 0, 0, 255]);
        // Out of bounds is a no-op
        frame.put(10, 10, [9, 9, 9, 9]);
    }
}
