//! Signal quality scoring for the processed pulse waveform.
//!
//! Produces a score in `[0, 1]` from four sub-metrics (SNR, motion
//! state, variance stability, and in-band spectral energy) plus a
//! coarse label for the UI.

use serde::{Deserialize, Serialize};

use crate::fft::{hann_window, FftError, FftKernel};
use crate::motion::{variance_spread, window_variances};

/// Passband used for the spectral energy metric, in Hz (42-210 BPM).
pub const PASSBAND_HZ: (f64, f64) = (0.7, 3.5);

/// Coarse quality label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalQuality {
    /// Less than one second of samples buffered.
    Insufficient,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SignalQuality {
    /// Label for a composite score in `[0, 1]`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::Excellent
        } else if score > 0.5 {
            Self::Good
        } else if score > 0.3 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Insufficient => "insufficient",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        };
        write!(f, "{label}")
    }
}

/// Quality score with its sub-metric breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Composite score in `[0, 1]`.
    pub score: f64,
    /// Coarse label derived from the score.
    pub quality: SignalQuality,
    /// SNR sub-metric in `[0, 1]`.
    pub snr: f64,
    /// Motion sub-metric: 0.7 under motion, 1.0 otherwise.
    pub motion_factor: f64,
    /// Variance stability sub-metric in `[0, 1]`.
    pub stability: f64,
    /// Fraction of spectral energy inside the passband, doubled and
    /// capped at 1.
    pub band_energy_fraction: f64,
}

impl QualityReport {
    /// Report for a buffer with less than one second of samples.
    #[must_use]
    pub fn insufficient() -> Self {
        Self {
            score: 0.0,
            quality: SignalQuality::Insufficient,
            snr: 0.0,
            motion_factor: 1.0,
            stability: 0.0,
            band_energy_fraction: 0.0,
        }
    }
}

/// Scorer holding the FFT kernel and window for the spectral metric.
pub struct QualityScorer {
    fft: FftKernel,
    window: Vec<f64>,
    sample_rate: f64,
    min_samples: usize,
}

impl QualityScorer {
    /// Create a scorer.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::NotPowerOfTwo`] for an invalid FFT size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(fft_size: usize, sample_rate: f64) -> Result<Self, FftError> {
        Ok(Self {
            fft: FftKernel::new(fft_size)?,
            window: hann_window(fft_size),
            sample_rate: sample_rate.max(1.0),
            min_samples: (sample_rate.max(1.0) as usize).max(1),
        })
    }

    /// Score a processed buffer.
    ///
    /// Sub-metric weights: SNR 0.4, motion 0.2, stability 0.2, band
    /// energy 0.2.
    #[must_use]
    pub fn score(&self, processed: &[f64], motion_detected: bool) -> QualityReport {
        if processed.len() < self.min_samples {
            return QualityReport::insufficient();
        }

        let snr = self.snr_metric(processed);
        let motion_factor = if motion_detected { 0.7 } else { 1.0 };
        let stability = self.stability_metric(processed);
        let band_energy_fraction = self.band_energy_metric(processed);

        let score =
            0.4 * snr + 0.2 * motion_factor + 0.2 * stability + 0.2 * band_energy_fraction;

        QualityReport {
            score,
            quality: SignalQuality::from_score(score),
            snr,
            motion_factor,
            stability,
            band_energy_fraction,
        }
    }

    fn snr_metric(&self, processed: &[f64]) -> f64 {
        let (mean, std) = crate::filters::mean_std(processed);
        if std < 1e-12 {
            return 0.0;
        }
        (mean.abs() / std / 0.5).min(1.0)
    }

    /// Stability over two-second sub-windows: `v_mean / (v_mean +
    /// v_var)`, or 0.5 when fewer than two windows fit.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn stability_metric(&self, processed: &[f64]) -> f64 {
        let window_len = (self.sample_rate * 2.0) as usize;
        let variances = window_variances(processed, window_len.max(1));
        if variances.len() < 2 {
            return 0.5;
        }
        let (v_mean, v_var) = variance_spread(&variances);
        let denom = v_mean + v_var;
        if denom < 1e-15 {
            // Degenerate flat signal: perfectly stable.
            return 1.0;
        }
        v_mean / denom
    }

    fn band_energy_metric(&self, processed: &[f64]) -> f64 {
        let n = self.fft.size();
        let start = processed.len().saturating_sub(n);
        let tail = &processed[start..];

        let mut buffer = vec![0.0; n];
        buffer[..tail.len()].copy_from_slice(tail);
        for (value, w) in buffer.iter_mut().zip(self.window.iter()) {
            *value *= w;
        }

        let Ok(spectrum) = self.fft.real_magnitude(&buffer) else {
            return 0.0;
        };

        let mut total = 0.0;
        let mut in_band = 0.0;
        #[allow(clippy::cast_precision_loss)]
        for (bin, mag) in spectrum.iter().enumerate() {
            let energy = mag * mag;
            total += energy;
            let freq = bin as f64 * self.sample_rate / n as f64;
            if (PASSBAND_HZ.0..=PASSBAND_HZ.1).contains(&freq) {
                in_band += energy;
            }
        }
        if total < 1e-15 {
            return 0.0;
        }
        (2.0 * in_band / total).min(1.0)
    }
}
