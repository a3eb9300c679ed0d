//! Unified error type for the estimation core.

use facepulse_signal::{FftError, SignalError};

use crate::config::ConfigError;

/// Common result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced across the core's public boundary.
///
/// All of these are construction-time failures. A running session
/// never errors: transient per-frame conditions degrade to skipped
/// samples, and estimation unavailability is expressed as values, not
/// errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid pipeline configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Signal chain construction error
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),

    /// FFT kernel construction error
    #[error("FFT error: {0}")]
    Fft(#[from] FftError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_errors_convert() {
        let err: CoreError = ConfigError::FftSize(7).into();
        assert!(matches!(err, CoreError::Config(_)));

        let err: CoreError = FftError::NotPowerOfTwo { size: 7 }.into();
        assert!(matches!(err, CoreError::Fft(_)));

        let err: CoreError = SignalError::InvalidConfig("bad".into()).into();
        assert!(err.to_string().contains("bad"));
    }
}
