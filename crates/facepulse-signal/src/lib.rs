//! # facepulse-signal
//!
//! DSP primitives for camera-based heart-rate estimation (rPPG):
//! buffering, filtering, motion-artefact detection, and signal quality
//! scoring for a stream of per-frame facial intensity samples.
//!
//! # Features
//!
//! - **FFT kernel**: fixed-size forward/inverse transforms with plans
//!   built once at construction, plus window helpers
//! - **Signal chain**: ring-buffered outlier clipping, first-order IIR
//!   bandpass, and motion-adaptive smoothing
//! - **Motion detection**: variance-of-variances test over a dedicated
//!   sample window
//! - **Quality scoring**: SNR, stability, and in-band energy metrics
//!   combined into a display label
//!
//! # Example
//!
//! ```
//! use facepulse_signal::{QualityScorer, SignalChain};
//! use std::f64::consts::PI;
//!
//! let mut chain = SignalChain::default_config();
//! let scorer = QualityScorer::new(512, 30.0).unwrap();
//!
//! // 15 seconds of a clean 60 BPM pulse at 30 frames per second
//! for i in 0..450 {
//!     chain.push((2.0 * PI * 1.0 * i as f64 / 30.0).sin());
//! }
//!
//! let processed = chain.process().expect("enough samples buffered");
//! let report = scorer.score(&processed.samples, processed.motion_detected);
//! assert!(report.score > 0.5);
//! ```

pub mod chain;
pub mod fft;
pub mod filters;
pub mod motion;
pub mod quality;
pub mod ring;

pub use chain::{ChainConfig, FilterParams, ProcessedSignal, SignalChain};
pub use fft::{hann_window, magnitude, FftError, FftKernel};
pub use motion::{MotionConfig, MotionDetector};
pub use quality::{QualityReport, QualityScorer, SignalQuality, PASSBAND_HZ};
pub use ring::SampleRing;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for signal processing operations
pub type Result<T> = std::result::Result<T, SignalError>;

/// Unified error type for signal processing operations
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// FFT kernel construction or invocation error
    #[error("FFT error: {0}")]
    Fft(#[from] FftError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chain::{ChainConfig, ProcessedSignal, SignalChain};
    pub use crate::fft::FftKernel;
    pub use crate::motion::MotionDetector;
    pub use crate::quality::{QualityReport, QualityScorer, SignalQuality};
    pub use crate::ring::SampleRing;
    pub use crate::{Result, SignalError};
}
