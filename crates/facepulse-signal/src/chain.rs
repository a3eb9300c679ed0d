//! The streaming signal chain: buffering, outlier rejection, bandpass,
//! and motion-adaptive smoothing.
//!
//! Samples flow into two rings (the main processing buffer and the
//! motion window). Processing works on a snapshot copy so the rings
//! are never mutated mid-pipeline: outlier clipping against the raw
//! buffer statistics, a first-order IIR high-pass then low-pass, and a
//! trailing moving average whose width depends on the motion state.

use serde::{Deserialize, Serialize};

use crate::filters::{clip_outliers, high_pass, low_pass, moving_average};
use crate::motion::{MotionConfig, MotionDetector};
use crate::ring::SampleRing;
use crate::SignalError;

/// Outlier clipping threshold in standard deviations.
const OUTLIER_SIGMA: f64 = 2.0;

/// Configuration for the signal chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Input sample rate in Hz (nominally the camera frame rate).
    pub sample_rate: f64,
    /// Main buffer length in seconds.
    pub buffer_secs: f64,
    /// Motion window length in seconds, tunable independently of the
    /// main buffer.
    pub motion_window_secs: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sample_rate: 30.0,
            buffer_secs: 15.0,
            motion_window_secs: 15.0,
        }
    }
}

impl ChainConfig {
    /// Check the configuration for fatal construction errors.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidConfig`] for non-positive rates
    /// or window lengths.
    pub fn validate(&self) -> Result<(), SignalError> {
        if !(self.sample_rate > 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate,
            )));
        }
        for (name, value) in [
            ("buffer_secs", self.buffer_secs),
            ("motion_window_secs", self.motion_window_secs),
        ] {
            if !(value > 0.0) {
                return Err(SignalError::InvalidConfig(format!(
                    "{name} must be positive, got {value}",
                )));
            }
        }
        Ok(())
    }
}

/// First-order filter coefficients and smoothing width.
///
/// Two presets exist: nominal, and a more conservative set used while
/// motion artefacts are present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Low-pass coefficient.
    pub alpha_lp: f64,
    /// High-pass coefficient.
    pub alpha_hp: f64,
    /// Trailing moving-average width in samples.
    pub smoothing_window: usize,
}

impl FilterParams {
    /// Coefficients for clean-signal operation.
    #[must_use]
    pub fn nominal() -> Self {
        Self {
            alpha_lp: 0.15,
            alpha_hp: 0.98,
            smoothing_window: 5,
        }
    }

    /// Heavier smoothing for motion-contaminated input.
    #[must_use]
    pub fn motion() -> Self {
        Self {
            alpha_lp: 0.10,
            alpha_hp: 0.99,
            smoothing_window: 8,
        }
    }
}

/// A processed copy of the buffer, ready for spectral analysis.
#[derive(Debug, Clone)]
pub struct ProcessedSignal {
    /// Filtered samples, oldest first.
    pub samples: Vec<f64>,
    /// Whether the motion detector fired for this snapshot.
    pub motion_detected: bool,
}

/// Streaming signal chain over the pulse sample stream.
pub struct SignalChain {
    ring: SampleRing,
    motion: MotionDetector,
    params: FilterParams,
    min_samples: usize,
    config: ChainConfig,
}

impl SignalChain {
    /// Create a chain from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidConfig`] when the configuration
    /// fails validation.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(config: ChainConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let capacity = (config.sample_rate * config.buffer_secs) as usize;
        let motion = MotionDetector::new(&MotionConfig {
            sample_rate: config.sample_rate,
            window_secs: config.motion_window_secs,
            variance_ratio: MotionConfig::default().variance_ratio,
        });
        Ok(Self {
            ring: SampleRing::new(capacity),
            motion,
            params: FilterParams::nominal(),
            min_samples: (config.sample_rate as usize).max(1),
            config,
        })
    }

    /// Create with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        // The default configuration always validates.
        match Self::new(ChainConfig::default()) {
            Ok(chain) => chain,
            Err(_) => unreachable!("default chain configuration is valid"),
        }
    }

    /// Feed one sample into both rings.
    ///
    /// Non-finite samples are dropped; the ROI sampler already rejects
    /// them, so this only guards against misbehaving callers.
    pub fn push(&mut self, sample: f64) {
        if !sample.is_finite() {
            return;
        }
        self.ring.push(sample);
        self.motion.push(sample);
    }

    /// Produce a processed snapshot of the buffer.
    ///
    /// Re-evaluates the motion state and the adaptive parameters, then
    /// runs clipping, bandpass, and smoothing over a copy. Returns
    /// `None` until at least one second of samples has accumulated.
    pub fn process(&mut self) -> Option<ProcessedSignal> {
        let motion_detected = self.motion.detect();
        self.params = if motion_detected {
            FilterParams::motion()
        } else {
            FilterParams::nominal()
        };

        if self.ring.len() < self.min_samples {
            return None;
        }

        let snapshot = self.ring.snapshot();
        let clipped = clip_outliers(&snapshot, OUTLIER_SIGMA);
        let high = high_pass(&clipped, self.params.alpha_hp);
        let low = low_pass(&high, self.params.alpha_lp);
        let samples = moving_average(&low, self.params.smoothing_window);

        Some(ProcessedSignal {
            samples,
            motion_detected,
        })
    }

    /// Number of samples in the main buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the main buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Seconds spanned by the main buffer.
    #[must_use]
    pub fn age_secs(&self) -> f64 {
        self.ring.age_secs(self.config.sample_rate)
    }

    /// Filter parameters selected by the last processing request.
    #[must_use]
    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Chain configuration.
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Discard both rings and return to nominal parameters.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.motion.reset();
        self.params = FilterParams::nominal();
    }
}
