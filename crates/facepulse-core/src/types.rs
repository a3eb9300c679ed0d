//! Output and session domain types.

use facepulse_roi::FaceLandmarks;
use facepulse_signal::QualityReport;
use serde::{Deserialize, Serialize};

/// What the UI shows for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayOutput {
    /// Still inside the calibration period; `progress` is 0-100.
    Calibrating { progress: u8 },
    /// A stable, delayed heart-rate reading.
    Bpm(u32),
    /// No reading can be shown right now.
    Unavailable,
}

impl DisplayOutput {
    /// The numeric reading, if one is being shown.
    #[must_use]
    pub fn bpm(self) -> Option<u32> {
        match self {
            Self::Bpm(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a numeric reading is being shown.
    #[must_use]
    pub fn is_bpm(self) -> bool {
        matches!(self, Self::Bpm(_))
    }
}

impl std::fmt::Display for DisplayOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calibrating { progress } => write!(f, "calibrating {progress}%"),
            Self::Bpm(value) => write!(f, "{value}"),
            Self::Unavailable => write!(f, "—"),
        }
    }
}

/// Everything one tick hands to the UI adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    /// Display state for the BPM read-out.
    pub display: DisplayOutput,
    /// Signal quality score and label.
    pub quality: QualityReport,
    /// Newest processed waveform sample for the scope, when available.
    pub waveform: Option<f64>,
}

/// Face-detection outcome fed into a tick.
#[derive(Debug, Clone, Copy)]
pub enum FaceInput<'a> {
    /// The detector returned a landmark set.
    Landmarks(&'a FaceLandmarks),
    /// The detector ran but saw no face; default regions are used.
    NoFace,
    /// The detector failed or timed out; the frame is skipped.
    Failed,
}

/// Per-session counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Ticks processed.
    pub frames: u64,
    /// Ticks that produced a sample.
    pub samples: u64,
    /// Ticks skipped for lack of a sample.
    pub skipped: u64,
    /// Raw spectral estimates recorded.
    pub estimates: u64,
}
