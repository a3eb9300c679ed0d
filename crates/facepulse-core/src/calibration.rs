//! Calibration gating and delayed display smoothing.
//!
//! Raw spectral estimates are noisy frame to frame. The smoother
//! withholds output during an initial calibration period, then shows a
//! reading that trails the clock by a fixed delay and is averaged over
//! the records around that delayed target time. Freshness is traded
//! for a number that does not jitter.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::types::DisplayOutput;

/// One raw heart-rate estimate with its arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateRecord {
    /// Estimated BPM.
    pub bpm: f64,
    /// Arrival time in session-clock milliseconds.
    pub timestamp_ms: u64,
}

/// Configuration for the calibration and display stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmootherConfig {
    /// Time before any BPM is shown, in milliseconds.
    pub calibration_period_ms: u64,
    /// Temporal offset of the shown BPM, in milliseconds.
    pub display_delay_ms: u64,
    /// How far from the delayed target a record may sit and still
    /// count, in milliseconds.
    pub match_tolerance_ms: u64,
    /// Maximum standard deviation of the matched records before the
    /// reading is withheld, in BPM.
    pub max_deviation_bpm: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            calibration_period_ms: 15_000,
            display_delay_ms: 5_000,
            match_tolerance_ms: 2_000,
            max_deviation_bpm: 15.0,
        }
    }
}

/// Calibration gate and delayed-average display smoother.
///
/// Pure over its history and the supplied clock: `display` has no side
/// effects, and `now` is assumed monotonic within a session.
#[derive(Debug, Clone)]
pub struct BpmSmoother {
    config: SmootherConfig,
    calibration_start: Option<u64>,
    history: VecDeque<HeartRateRecord>,
}

impl BpmSmoother {
    /// Create a smoother from configuration.
    #[must_use]
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            calibration_start: None,
            history: VecDeque::new(),
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(SmootherConfig::default())
    }

    /// Begin a session: stamp the calibration start and clear history.
    pub fn start(&mut self, now_ms: u64) {
        self.calibration_start = Some(now_ms);
        self.history.clear();
        debug!(now_ms, "calibration started");
    }

    /// End the session. History is kept; a restart clears it.
    pub fn stop(&mut self) {
        self.calibration_start = None;
    }

    /// Whether a session is active and still calibrating.
    #[must_use]
    pub fn is_calibrating(&self, now_ms: u64) -> bool {
        self.calibration_start.is_some_and(|start| {
            now_ms.saturating_sub(start) < self.config.calibration_period_ms
        })
    }

    /// Append a raw estimate and prune records that have aged out of
    /// the smoothing horizon.
    pub fn record(&mut self, bpm: f64, now_ms: u64) {
        self.history.push_back(HeartRateRecord {
            bpm,
            timestamp_ms: now_ms,
        });
        let horizon = self.config.calibration_period_ms + self.config.display_delay_ms;
        let cutoff = now_ms.saturating_sub(horizon);
        while let Some(front) = self.history.front() {
            if front.timestamp_ms < cutoff {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// The value shown to the user at `now_ms`.
    #[must_use]
    pub fn display(&self, now_ms: u64) -> DisplayOutput {
        let Some(start) = self.calibration_start else {
            return DisplayOutput::Unavailable;
        };

        let elapsed = now_ms.saturating_sub(start);
        if elapsed < self.config.calibration_period_ms {
            #[allow(clippy::cast_possible_truncation)]
            let progress = (100 * elapsed / self.config.calibration_period_ms) as u8;
            return DisplayOutput::Calibrating { progress };
        }

        let target = now_ms.saturating_sub(self.config.display_delay_ms);

        let nearest = self
            .history
            .iter()
            .map(|r| r.timestamp_ms.abs_diff(target))
            .min();
        match nearest {
            Some(distance) if distance <= self.config.match_tolerance_ms => {}
            _ => return DisplayOutput::Unavailable,
        }

        let matched: Vec<f64> = self
            .history
            .iter()
            .filter(|r| r.timestamp_ms.abs_diff(target) < self.config.match_tolerance_ms)
            .map(|r| r.bpm)
            .collect();
        if matched.is_empty() {
            return DisplayOutput::Unavailable;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = matched.len() as f64;
        let mean = matched.iter().sum::<f64>() / n;
        let variance = matched.iter().map(|b| (b - mean) * (b - mean)).sum::<f64>() / n;
        if variance.sqrt() > self.config.max_deviation_bpm {
            return DisplayOutput::Unavailable;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let shown = mean.round() as u32;
        DisplayOutput::Bpm(shown)
    }

    /// Number of records currently held.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Smoother configuration.
    #[must_use]
    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }
}
