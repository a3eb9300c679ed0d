//! # facepulse-roi
//!
//! Facial region-of-interest extraction for camera-based heart-rate
//! estimation: the frame model, landmark-driven region geometry, and
//! the weighted sampler that reduces a frame to one scalar per tick.
//!
//! The two external collaborators are abstracted as ports:
//! [`PixelSource`] for the rendered frame surface and [`FaceSource`]
//! for the landmark detector. The crate itself has no camera or
//! detector code.

pub mod frame;
pub mod landmarks;
pub mod port;
pub mod regions;
pub mod sampler;

pub use frame::{FrameError, VideoFrame};
pub use landmarks::{default_regions, landmark_regions, FaceLandmarks, Point, LANDMARK_COUNT};
pub use port::{FaceSource, FaceSourceError, PixelSource};
pub use regions::{Roi, RoiKind, RoiRect};
pub use sampler::{ChannelMeans, RoiSampler, RoiWeights, SamplerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for region-of-interest operations
pub type Result<T> = std::result::Result<T, RoiError>;

/// Unified error type for region-of-interest operations
#[derive(Debug, thiserror::Error)]
pub enum RoiError {
    /// Frame construction error
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Face detection backend failure
    #[error("face source error: {0}")]
    FaceSource(#[from] FaceSourceError),
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::frame::VideoFrame;
    pub use crate::landmarks::{default_regions, landmark_regions, FaceLandmarks};
    pub use crate::port::{FaceSource, PixelSource};
    pub use crate::regions::{Roi, RoiKind, RoiRect};
    pub use crate::sampler::{RoiSampler, SamplerConfig};
    pub use crate::{Result, RoiError};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn sub_errors_convert_into_roi_error() {
        let err: RoiError = VideoFrame::new(4, 4, vec![0; 3]).unwrap_err().into();
        assert!(matches!(err, RoiError::Frame(_)));

        let err: RoiError = FaceSourceError::new("model timed out").into();
        assert!(matches!(err, RoiError::FaceSource(_)));
        assert!(err.to_string().contains("model timed out"));
    }

    #[test]
    fn landmark_regions_sample_from_a_frame() {
        // End-to-end inside the crate: landmarks -> regions -> sample
        let frame = VideoFrame::solid(400, 400, [120, 160, 110, 255]);
        let points = (0..LANDMARK_COUNT)
            .map(|i| {
                Point::new(
                    120.0 + (i % 10) as f64 * 15.0,
                    120.0 + (i / 10) as f64 * 15.0,
                )
            })
            .collect();
        let landmarks = FaceLandmarks::new(points).unwrap();

        let rois = landmark_regions(&landmarks);
        let sample = RoiSampler::default_config().sample(&frame, &rois).unwrap();
        assert!((sample - 160.0).abs() < 1e-9);
    }
}
