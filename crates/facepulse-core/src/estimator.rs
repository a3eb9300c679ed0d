//! Spectral heart-rate estimation.
//!
//! Takes the processed sample buffer, computes a Hann-windowed
//! magnitude spectrum, and turns the dominant in-band peak into an
//! integer BPM. The selection is guarded by a significance gate,
//! octave disambiguation between a fundamental and its second
//! harmonic, and a range-based rescue for readings that land outside
//! plausible resting rates.

use facepulse_signal::{hann_window, FftError, FftKernel, PASSBAND_HZ};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Matching tolerance for octave candidates, in Hz.
const OCTAVE_TOLERANCE_HZ: f64 = 0.1;
/// Magnitude ratio a double-frequency candidate must reach.
const DOUBLE_MIN_RATIO: f64 = 0.7;
/// Magnitude ratio a half-frequency candidate must reach.
const HALF_MIN_RATIO: f64 = 0.5;
/// Neighbour offsets contributing to the sharpness score.
const SHARPNESS_SPAN: usize = 3;

/// A local maximum in the magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralPeak {
    /// Bin index in the magnitude array.
    pub bin: usize,
    /// Magnitude at the peak bin.
    pub magnitude: f64,
    /// Bin centre frequency in Hz.
    pub frequency_hz: f64,
    /// Mean prominence over the surrounding bins.
    pub sharpness: f64,
}

impl SpectralPeak {
    /// Ranking score: magnitude boosted by sharpness.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.magnitude * (1.0 + self.sharpness)
    }
}

/// Windowed-FFT heart-rate estimator.
pub struct SpectralEstimator {
    fft: FftKernel,
    window: Vec<f64>,
    sample_rate: f64,
    adaptive_threshold: f64,
    bpm_range: (f64, f64),
    min_samples: usize,
}

impl SpectralEstimator {
    /// Create an estimator.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::NotPowerOfTwo`] for an invalid FFT size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(
        fft_size: usize,
        sample_rate: f64,
        adaptive_threshold: f64,
        bpm_range: (f64, f64),
    ) -> Result<Self, FftError> {
        Ok(Self {
            fft: FftKernel::new(fft_size)?,
            window: hann_window(fft_size),
            sample_rate: sample_rate.max(1.0),
            adaptive_threshold,
            bpm_range,
            min_samples: ((sample_rate.max(1.0) * 3.0) as usize).max(1),
        })
    }

    /// Estimate the heart rate from a processed buffer.
    ///
    /// Returns `None` when less than three seconds of samples are
    /// available, when no peak clears the significance gate, or when
    /// the corrected reading falls outside the acceptance range.
    #[must_use]
    pub fn estimate(&self, samples: &[f64]) -> Option<u32> {
        if samples.len() < self.min_samples {
            return None;
        }

        let spectrum = self.magnitude_spectrum(samples)?;
        let peaks = self.detect_peaks(&spectrum);
        let best = *peaks.first()?;

        let band_mean = self.band_mean(&spectrum);
        let significance = band_mean * (1.5 + self.adaptive_threshold);
        if best.magnitude < significance {
            trace!(
                magnitude = best.magnitude,
                threshold = significance,
                "dominant peak below significance gate"
            );
            return None;
        }

        let selected = self.octave_correct(&peaks, best);
        if selected.bin != best.bin {
            debug!(
                from_hz = best.frequency_hz,
                to_hz = selected.frequency_hz,
                "octave correction applied"
            );
        }

        let bpm = rescue_range(60.0 * selected.frequency_hz).round();
        let (low, high) = self.bpm_range;
        if (low..=high).contains(&bpm) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = bpm as u32;
            Some(value)
        } else {
            None
        }
    }

    /// Hann-windowed magnitude spectrum of the last `fft_size`
    /// samples, zero-padded when the buffer is shorter.
    fn magnitude_spectrum(&self, samples: &[f64]) -> Option<Vec<f64>> {
        let n = self.fft.size();
        let start = samples.len().saturating_sub(n);
        let tail = &samples[start..];

        let mut buffer = vec![0.0; n];
        buffer[..tail.len()].copy_from_slice(tail);
        for (value, w) in buffer.iter_mut().zip(self.window.iter()) {
            *value *= w;
        }
        self.fft.real_magnitude(&buffer).ok()
    }

    /// Strict local maxima inside the passband, sorted by score
    /// descending. The sort is stable, so equal scores keep bin order.
    fn detect_peaks(&self, spectrum: &[f64]) -> Vec<SpectralPeak> {
        let mut peaks = Vec::new();
        for bin in 1..spectrum.len().saturating_sub(1) {
            let freq = self.bin_frequency(bin);
            if freq < PASSBAND_HZ.0 || freq > PASSBAND_HZ.1 {
                continue;
            }
            if spectrum[bin] <= spectrum[bin - 1] || spectrum[bin] <= spectrum[bin + 1] {
                continue;
            }
            peaks.push(SpectralPeak {
                bin,
                magnitude: spectrum[bin],
                frequency_hz: freq,
                sharpness: sharpness_at(spectrum, bin),
            });
        }
        peaks.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        peaks
    }

    /// Disambiguate a fundamental from its second harmonic.
    ///
    /// Prefers a strong peak at twice the dominant frequency; failing
    /// that, a half-frequency peak when the dominant reading is
    /// implausibly fast and the halved reading is plausible. Candidate
    /// lists are scanned in score order, so the choice is
    /// single-valued.
    fn octave_correct(&self, peaks: &[SpectralPeak], best: SpectralPeak) -> SpectralPeak {
        let double = peaks.iter().find(|p| {
            (p.frequency_hz - 2.0 * best.frequency_hz).abs() <= OCTAVE_TOLERANCE_HZ
                && p.magnitude >= DOUBLE_MIN_RATIO * best.magnitude
        });
        if let Some(&peak) = double {
            return peak;
        }

        let best_bpm = 60.0 * best.frequency_hz;
        let half_bpm = best_bpm / 2.0;
        if best_bpm > 120.0 && (50.0..=120.0).contains(&half_bpm) {
            let half = peaks.iter().find(|p| {
                (p.frequency_hz - best.frequency_hz / 2.0).abs() <= OCTAVE_TOLERANCE_HZ
                    && p.magnitude >= HALF_MIN_RATIO * best.magnitude
            });
            if let Some(&peak) = half {
                return peak;
            }
        }

        best
    }

    fn band_mean(&self, spectrum: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut count = 0_usize;
        for (bin, &mag) in spectrum.iter().enumerate() {
            let freq = self.bin_frequency(bin);
            if (PASSBAND_HZ.0..=PASSBAND_HZ.1).contains(&freq) {
                sum += mag;
                count += 1;
            }
        }
        if count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / count as f64;
        mean
    }

    #[allow(clippy::cast_precision_loss)]
    fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.fft.size() as f64
    }

    /// Minimum buffer length for an estimate, in samples.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }
}

/// Mean prominence of a bin over its `+-1..=3` neighbours, clipped to
/// the array bounds.
#[allow(clippy::cast_precision_loss)]
fn sharpness_at(spectrum: &[f64], bin: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0_usize;
    for k in 1..=SHARPNESS_SPAN {
        if bin >= k {
            sum += spectrum[bin] - spectrum[bin - k];
            count += 1;
        }
        if bin + k < spectrum.len() {
            sum += spectrum[bin] - spectrum[bin + k];
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Fold implausible readings back into range: very slow readings are
/// doubled, very fast ones halved, when the folded value is plausible.
fn rescue_range(bpm: f64) -> f64 {
    if (25.0..50.0).contains(&bpm) && (50.0..=200.0).contains(&(2.0 * bpm)) {
        2.0 * bpm
    } else if bpm > 150.0 && bpm <= 400.0 && (50.0..=150.0).contains(&(bpm / 2.0)) {
        bpm / 2.0
    } else {
        bpm
    }
}
