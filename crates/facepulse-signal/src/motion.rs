//! Motion-artefact detection over a dedicated sample window.
//!
//! Subject or camera motion shows up as bursts whose per-second
//! variance is wildly uneven, while a clean pulse signal keeps it
//! steady. Motion is declared when the variance of consecutive
//! one-second window variances exceeds `variance_ratio` times their
//! mean.

use serde::{Deserialize, Serialize};

use crate::ring::SampleRing;

/// Configuration for the motion-artefact detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Input sample rate in Hz.
    pub sample_rate: f64,
    /// Length of the motion analysis window in seconds.
    pub window_secs: f64,
    /// Motion is declared when `var(v) > variance_ratio * mean(v)`
    /// over the per-second window variances `v`.
    pub variance_ratio: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 30.0,
            window_secs: 15.0,
            variance_ratio: 1.5,
        }
    }
}

/// Detector for motion artefacts in the pulse sample stream.
///
/// Keeps its own ring so the motion window can be tuned independently
/// of the main processing buffer.
#[derive(Debug, Clone)]
pub struct MotionDetector {
    ring: SampleRing,
    samples_per_window: usize,
    variance_ratio: f64,
}

impl MotionDetector {
    /// Create a detector from configuration.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(config: &MotionConfig) -> Self {
        let sample_rate = config.sample_rate.max(1.0);
        let capacity = (sample_rate * config.window_secs.max(1.0)) as usize;
        Self {
            ring: SampleRing::new(capacity),
            samples_per_window: (sample_rate as usize).max(1),
            variance_ratio: config.variance_ratio,
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(&MotionConfig::default())
    }

    /// Feed one sample into the motion window.
    pub fn push(&mut self, sample: f64) {
        self.ring.push(sample);
    }

    /// Mean and variance of the per-second window variances, when at
    /// least two full windows are available.
    #[must_use]
    pub fn variance_stats(&self) -> Option<(f64, f64)> {
        let snapshot = self.ring.snapshot();
        let variances = window_variances(&snapshot, self.samples_per_window);
        if variances.len() < 2 {
            return None;
        }
        Some(variance_spread(&variances))
    }

    /// Whether the current window looks motion-contaminated.
    #[must_use]
    pub fn detect(&self) -> bool {
        match self.variance_stats() {
            Some((v_mean, v_var)) => v_var > self.variance_ratio * v_mean,
            None => false,
        }
    }

    /// Number of samples in the motion window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the motion window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Discard the motion window contents.
    pub fn reset(&mut self) {
        self.ring.clear();
    }
}

/// Variance of each consecutive non-overlapping window of `window_len`
/// samples. Trailing samples that do not fill a window are ignored.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn window_variances(signal: &[f64], window_len: usize) -> Vec<f64> {
    if window_len == 0 {
        return Vec::new();
    }
    signal
        .chunks_exact(window_len)
        .map(|chunk| {
            let n = chunk.len() as f64;
            let mean = chunk.iter().sum::<f64>() / n;
            chunk.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n
        })
        .collect()
}

/// Mean and variance of a list of variances.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn variance_spread(variances: &[f64]) -> (f64, f64) {
    if variances.is_empty() {
        return (0.0, 0.0);
    }
    let n = variances.len() as f64;
    let mean = variances.iter().sum::<f64>() / n;
    let var = variances.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var)
}
