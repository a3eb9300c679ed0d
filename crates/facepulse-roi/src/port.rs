//! Capability ports for the two external collaborators.
//!
//! The sampler is polymorphic over where pixels come from and where
//! landmarks come from; hosts plug in a camera-backed frame and a real
//! detector, tests plug in synthetic ones.

use crate::landmarks::FaceLandmarks;

/// Port over a readable RGBA pixel surface.
///
/// Callers only read coordinates inside `width() x height()`.
pub trait PixelSource {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// RGBA value at `(x, y)`; `x < width()`, `y < height()`.
    fn rgba(&self, x: u32, y: u32) -> [u8; 4];
}

/// Port over the face-landmark detector.
///
/// `Ok(None)` means the detector ran and saw no face (the pipeline
/// falls back to default regions); `Err` means the detector itself
/// failed or timed out (the pipeline skips the frame).
pub trait FaceSource {
    fn detect(
        &mut self,
        frame: &dyn PixelSource,
    ) -> Result<Option<FaceLandmarks>, FaceSourceError>;
}

/// Failure of the face-detection backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("face detection failed: {reason}")]
pub struct FaceSourceError {
    /// Human-readable description of what went wrong.
    pub reason: String,
}

impl FaceSourceError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
