//! Causal filters for the pulse sample stream.
//!
//! Each filter takes a snapshot slice and returns a new buffer. The
//! statistics used by outlier clipping are those of the unfiltered
//! input, and clipping runs before the bandpass stages.

/// Population mean and standard deviation of a signal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_std(signal: &[f64]) -> (f64, f64) {
    if signal.is_empty() {
        return (0.0, 0.0);
    }
    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let variance = signal.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Replace samples farther than `n_sigma` standard deviations from the
/// mean with the mean itself. Single pass; the threshold is computed
/// from the input statistics, not updated as samples are replaced.
#[must_use]
pub fn clip_outliers(signal: &[f64], n_sigma: f64) -> Vec<f64> {
    let (mean, std) = mean_std(signal);
    let threshold = n_sigma * std;
    signal
        .iter()
        .map(|&x| if (x - mean).abs() > threshold { mean } else { x })
        .collect()
}

/// First-order IIR high-pass, seeded with the first sample:
/// `y[i] = alpha * (y[i-1] + x[i] - x[i-1])`.
#[must_use]
pub fn high_pass(signal: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(signal.len());
    let Some(&first) = signal.first() else {
        return out;
    };
    out.push(first);
    for i in 1..signal.len() {
        let y = alpha * (out[i - 1] + signal[i] - signal[i - 1]);
        out.push(y);
    }
    out
}

/// First-order IIR low-pass, seeded with the first sample:
/// `z[i] = alpha * x[i] + (1 - alpha) * z[i-1]`.
#[must_use]
pub fn low_pass(signal: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(signal.len());
    let Some(&first) = signal.first() else {
        return out;
    };
    out.push(first);
    for i in 1..signal.len() {
        let z = alpha * signal[i] + (1.0 - alpha) * out[i - 1];
        out.push(z);
    }
    out
}

/// Trailing moving average: each output is the mean of the last
/// `window` samples available at that position.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(signal.len());
    let mut sum = 0.0;
    for i in 0..signal.len() {
        sum += signal[i];
        if i >= window {
            sum -= signal[i - window];
        }
        let len = (i + 1).min(window) as f64;
        out.push(sum / len);
    }
    out
}
