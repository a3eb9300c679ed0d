//! Fixed-size FFT kernel and window helpers.
//!
//! Wraps `rustfft` radix plans that are built exactly once at
//! construction, so a per-call invocation costs the transform itself
//! plus the output buffers. The transform size is validated up front:
//! a non-power-of-two size is a configuration error, not a runtime
//! condition.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Errors from FFT kernel construction and use.
#[derive(Debug, thiserror::Error)]
pub enum FftError {
    #[error("FFT size {size} is not a power of two >= 2")]
    NotPowerOfTwo {
        /// The rejected size.
        size: usize,
    },

    #[error("input length {got} does not match FFT size {expected}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Fixed-size forward/inverse FFT kernel.
///
/// Holds the forward and inverse plans for one transform size. Inputs
/// are paired real/imaginary arrays of exactly that size; the inverse
/// transform is scaled by `1/N` so that `inverse(forward(x)) == x` up
/// to floating-point error.
pub struct FftKernel {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FftKernel {
    /// Build the kernel for a given transform size.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::NotPowerOfTwo`] unless `size` is a power of
    /// two and at least 2.
    pub fn new(size: usize) -> Result<Self, FftError> {
        if size < 2 || !size.is_power_of_two() {
            return Err(FftError::NotPowerOfTwo { size });
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        })
    }

    /// Transform size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward DFT of paired real/imaginary arrays.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::LengthMismatch`] when either input does not
    /// match the kernel size.
    pub fn forward(&self, re: &[f64], im: &[f64]) -> Result<(Vec<f64>, Vec<f64>), FftError> {
        let mut buffer = self.pack(re, im)?;
        self.forward.process(&mut buffer);
        Ok(unpack(&buffer, 1.0))
    }

    /// Inverse DFT of paired real/imaginary arrays, scaled by `1/N`.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::LengthMismatch`] when either input does not
    /// match the kernel size.
    pub fn inverse(&self, re: &[f64], im: &[f64]) -> Result<(Vec<f64>, Vec<f64>), FftError> {
        let mut buffer = self.pack(re, im)?;
        self.inverse.process(&mut buffer);
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / self.size as f64;
        Ok(unpack(&buffer, scale))
    }

    /// Magnitude spectrum of a real signal, positive frequencies only.
    ///
    /// The input may be shorter than the transform size; it is
    /// zero-padded on the right. Returns `size / 2` magnitudes.
    ///
    /// # Errors
    ///
    /// Returns [`FftError::LengthMismatch`] when the input is longer
    /// than the transform size.
    pub fn real_magnitude(&self, input: &[f64]) -> Result<Vec<f64>, FftError> {
        if input.len() > self.size {
            return Err(FftError::LengthMismatch {
                expected: self.size,
                got: input.len(),
            });
        }
        let mut buffer: Vec<Complex64> = input
            .iter()
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        Ok(buffer[..self.size / 2].iter().map(|c| c.norm()).collect())
    }

    fn pack(&self, re: &[f64], im: &[f64]) -> Result<Vec<Complex64>, FftError> {
        for len in [re.len(), im.len()] {
            if len != self.size {
                return Err(FftError::LengthMismatch {
                    expected: self.size,
                    got: len,
                });
            }
        }
        Ok(re
            .iter()
            .zip(im.iter())
            .map(|(&r, &i)| Complex64::new(r, i))
            .collect())
    }
}

fn unpack(buffer: &[Complex64], scale: f64) -> (Vec<f64>, Vec<f64>) {
    let re = buffer.iter().map(|c| c.re * scale).collect();
    let im = buffer.iter().map(|c| c.im * scale).collect();
    (re, im)
}

/// Element-wise `sqrt(re^2 + im^2)` over paired spectra.
#[must_use]
pub fn magnitude(re: &[f64], im: &[f64]) -> Vec<f64> {
    re.iter().zip(im.iter()).map(|(&r, &i)| r.hypot(i)).collect()
}

/// Hann window of a given length: `0.5 * (1 - cos(2 pi i / (n - 1)))`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
        .collect()
}
