//! Pipeline configuration.

use facepulse_roi::{RoiWeights, SamplerConfig};
use serde::{Deserialize, Serialize};

/// Errors from configuration validation.
///
/// All of these are fatal at construction; a session is never started
/// with an invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FFT size {0} is not a power of two >= 2")]
    FftSize(usize),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("BPM acceptance range [{low}, {high}] is invalid")]
    BpmRange { low: f64, high: f64 },
}

/// Stable configuration surface of the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tick frequency in Hz; every window length scales with it.
    pub sample_rate: f64,
    /// Main sample ring length in seconds.
    pub buffer_secs: f64,
    /// Motion window length in seconds.
    pub motion_window_secs: f64,
    /// FFT length; must be a power of two.
    pub fft_size: usize,
    /// Time before any BPM is shown, in milliseconds.
    pub calibration_period_ms: u64,
    /// Temporal offset of the shown BPM, in milliseconds.
    pub display_delay_ms: u64,
    /// Peak-significance margin added to the 1.5 baseline.
    pub adaptive_threshold: f64,
    /// Acceptance range for the final BPM.
    pub bpm_range: (f64, f64),
    /// Capacity of the UI waveform ring.
    pub waveform_capacity: usize,
    /// ROI sampler configuration (brightness gate and weights).
    pub sampler: SamplerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 30.0,
            buffer_secs: 15.0,
            motion_window_secs: 15.0,
            fft_size: 512,
            calibration_period_ms: 15_000,
            display_delay_ms: 5_000,
            adaptive_threshold: 0.3,
            bpm_range: (40.0, 220.0),
            waveform_capacity: 150,
            sampler: SamplerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Check for fatal configuration errors.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        #[allow(clippy::cast_precision_loss)]
        let positives = [
            ("sample_rate", self.sample_rate),
            ("buffer_secs", self.buffer_secs),
            ("motion_window_secs", self.motion_window_secs),
            ("calibration_period_ms", self.calibration_period_ms as f64),
            ("waveform_capacity", self.waveform_capacity as f64),
        ];
        for (name, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.adaptive_threshold < 0.0 || !self.adaptive_threshold.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "adaptive_threshold",
                value: self.adaptive_threshold,
            });
        }
        let (low, high) = self.bpm_range;
        if !(low > 0.0) || !(high > low) {
            return Err(ConfigError::BpmRange { low, high });
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the tick frequency in Hz
    #[must_use]
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Set the main buffer length in seconds
    #[must_use]
    pub fn buffer_secs(mut self, secs: f64) -> Self {
        self.config.buffer_secs = secs;
        self
    }

    /// Set the motion window length in seconds
    #[must_use]
    pub fn motion_window_secs(mut self, secs: f64) -> Self {
        self.config.motion_window_secs = secs;
        self
    }

    /// Set the FFT length
    #[must_use]
    pub fn fft_size(mut self, size: usize) -> Self {
        self.config.fft_size = size;
        self
    }

    /// Set the calibration period in milliseconds
    #[must_use]
    pub fn calibration_period_ms(mut self, ms: u64) -> Self {
        self.config.calibration_period_ms = ms;
        self
    }

    /// Set the display delay in milliseconds
    #[must_use]
    pub fn display_delay_ms(mut self, ms: u64) -> Self {
        self.config.display_delay_ms = ms;
        self
    }

    /// Set the peak-significance margin
    #[must_use]
    pub fn adaptive_threshold(mut self, threshold: f64) -> Self {
        self.config.adaptive_threshold = threshold;
        self
    }

    /// Set the BPM acceptance range
    #[must_use]
    pub fn bpm_range(mut self, low: f64, high: f64) -> Self {
        self.config.bpm_range = (low, high);
        self
    }

    /// Set the waveform ring capacity
    #[must_use]
    pub fn waveform_capacity(mut self, capacity: usize) -> Self {
        self.config.waveform_capacity = capacity;
        self
    }

    /// Set the ROI combining weights
    #[must_use]
    pub fn roi_weights(mut self, weights: RoiWeights) -> Self {
        self.config.sampler.weights = weights;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
