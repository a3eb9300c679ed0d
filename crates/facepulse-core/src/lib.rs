//! # facepulse-core
//!
//! Camera-based heart-rate estimation (remote photoplethysmography).
//! Converts a stream of facial video frames into a stable
//! beats-per-minute reading by tracking the minute colour oscillations
//! that cardiac blood-volume pulses produce in facial skin.
//!
//! # Architecture
//!
//! Each 30 Hz tick runs five stages over one frame:
//!
//! 1. **ROI sampling** (`facepulse-roi`): reduce the facial regions to
//!    one weighted green-channel scalar.
//! 2. **Signal chain** (`facepulse-signal`): ring buffering, outlier
//!    clipping, IIR bandpass, motion-adaptive smoothing.
//! 3. **Spectral estimation** ([`SpectralEstimator`]): Hann-windowed
//!    FFT, peak selection with a significance gate, octave correction.
//! 4. **Calibration & smoothing** ([`BpmSmoother`]): withhold output
//!    during calibration, then show a delayed average that trades
//!    freshness for stability.
//! 5. **Quality scoring** (`facepulse-signal`): SNR, motion,
//!    stability, and band-energy metrics behind one display label.
//!
//! The host owns the timer, the camera, and the face detector; both
//! externals are reached through the ports in `facepulse-roi`.
//!
//! # Example
//!
//! ```
//! use facepulse_core::{DisplayOutput, FaceInput, Session};
//! use facepulse_roi::VideoFrame;
//!
//! let mut session = Session::with_defaults();
//! session.start(0);
//!
//! // One tick: no face found, so the centred fallback regions are used
//! let frame = VideoFrame::solid(160, 120, [120, 150, 110, 255]);
//! let output = session.advance(&frame, FaceInput::NoFace, 33);
//!
//! assert!(matches!(output.display, DisplayOutput::Calibrating { .. }));
//! ```

pub mod calibration;
pub mod config;
pub mod error;
pub mod estimator;
pub mod session;
pub mod types;

pub use calibration::{BpmSmoother, HeartRateRecord, SmootherConfig};
pub use config::{ConfigError, PipelineConfig, PipelineConfigBuilder};
pub use error::{CoreError, Result};
pub use estimator::{SpectralEstimator, SpectralPeak};
pub use session::Session;
pub use types::{DisplayOutput, FaceInput, SessionStats, TickOutput};

// Re-export the leaf-crate types that appear in this crate's API.
pub use facepulse_roi::{FaceLandmarks, FaceSource, PixelSource, VideoFrame};
pub use facepulse_signal::{QualityReport, SignalQuality};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::BpmSmoother;
    pub use crate::config::PipelineConfig;
    pub use crate::estimator::SpectralEstimator;
    pub use crate::session::Session;
    pub use crate::types::{DisplayOutput, FaceInput, TickOutput};
    pub use crate::{CoreError, Result};
}
