//! Per-tick session orchestration.
//!
//! A [`Session`] owns every pipeline stage and exposes one tick
//! function: sample the face regions, feed the signal chain, estimate,
//! smooth, and report. The host owns the timer and the camera; the
//! session is driven at a nominal 30 Hz and never blocks. Missed ticks
//! are simply not processed; there is no catch-up.

use tracing::{debug, trace};

use facepulse_roi::{
    default_regions, landmark_regions, FaceSource, PixelSource, RoiSampler,
};
use facepulse_signal::{
    ChainConfig, QualityReport, QualityScorer, SampleRing, SignalChain,
};

use crate::calibration::{BpmSmoother, SmootherConfig};
use crate::config::PipelineConfig;
use crate::error::CoreError;
use crate::estimator::SpectralEstimator;
use crate::types::{DisplayOutput, FaceInput, SessionStats, TickOutput};

/// One user-initiated detection session and its pipeline state.
pub struct Session {
    config: PipelineConfig,
    chain: SignalChain,
    sampler: RoiSampler,
    estimator: SpectralEstimator,
    quality: QualityScorer,
    smoother: BpmSmoother,
    waveform: SampleRing,
    stats: SessionStats,
    detecting: bool,
}

impl Session {
    /// Build a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] (or a component construction
    /// error) when the configuration is invalid. A session is never
    /// started with a bad configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let chain = SignalChain::new(ChainConfig {
            sample_rate: config.sample_rate,
            buffer_secs: config.buffer_secs,
            motion_window_secs: config.motion_window_secs,
        })?;
        let estimator = SpectralEstimator::new(
            config.fft_size,
            config.sample_rate,
            config.adaptive_threshold,
            config.bpm_range,
        )?;
        let quality = QualityScorer::new(config.fft_size, config.sample_rate)?;
        let smoother = BpmSmoother::new(SmootherConfig {
            calibration_period_ms: config.calibration_period_ms,
            display_delay_ms: config.display_delay_ms,
            ..SmootherConfig::default()
        });

        Ok(Self {
            sampler: RoiSampler::new(config.sampler.clone()),
            waveform: SampleRing::new(config.waveform_capacity),
            chain,
            estimator,
            quality,
            smoother,
            stats: SessionStats::default(),
            detecting: false,
            config,
        })
    }

    /// Build a session with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        match Self::new(PipelineConfig::default()) {
            Ok(session) => session,
            Err(_) => unreachable!("default pipeline configuration is valid"),
        }
    }

    /// Start detecting: clear all buffers and begin calibration.
    pub fn start(&mut self, now_ms: u64) {
        self.chain.clear();
        self.waveform.clear();
        self.stats = SessionStats::default();
        self.smoother.start(now_ms);
        self.detecting = true;
        debug!(now_ms, "detection session started");
    }

    /// Stop detecting. Buffers are kept; a restart clears them.
    pub fn stop(&mut self) {
        self.detecting = false;
        self.smoother.stop();
        debug!(
            frames = self.stats.frames,
            estimates = self.stats.estimates,
            "detection session stopped"
        );
    }

    /// Whether a detection session is active.
    #[must_use]
    pub fn is_detecting(&self) -> bool {
        self.detecting
    }

    /// Run one tick with an already-resolved face observation.
    ///
    /// Total: every failure mode degrades to a skipped sample or an
    /// unavailable display, never an error.
    pub fn advance(
        &mut self,
        frame: &dyn PixelSource,
        face: FaceInput<'_>,
        now_ms: u64,
    ) -> TickOutput {
        self.stats.frames += 1;

        let regions = match face {
            FaceInput::Landmarks(landmarks) => Some(landmark_regions(landmarks)),
            FaceInput::NoFace => Some(default_regions(frame.width(), frame.height())),
            FaceInput::Failed => None,
        };
        let sample = regions
            .as_deref()
            .and_then(|rois| self.sampler.sample(frame, rois));

        match sample {
            Some(value) => {
                self.chain.push(value);
                self.stats.samples += 1;
            }
            None => {
                self.stats.skipped += 1;
                trace!(now_ms, "tick skipped: no sample");
            }
        }

        let processed = self.chain.process();

        if self.detecting {
            if let Some(p) = &processed {
                if let Some(bpm) = self.estimator.estimate(&p.samples) {
                    self.smoother.record(f64::from(bpm), now_ms);
                    self.stats.estimates += 1;
                    trace!(bpm, now_ms, "raw spectral estimate");
                }
            }
        }

        let (quality, waveform) = match &processed {
            Some(p) => (
                self.quality.score(&p.samples, p.motion_detected),
                p.samples.last().copied(),
            ),
            None => (QualityReport::insufficient(), None),
        };
        if let Some(value) = waveform {
            self.waveform.push(value);
        }

        let display = if self.detecting {
            self.smoother.display(now_ms)
        } else {
            DisplayOutput::Unavailable
        };

        TickOutput {
            display,
            quality,
            waveform,
        }
    }

    /// Run one tick, resolving the face observation through a
    /// [`FaceSource`] port first.
    ///
    /// A detector error is logged and degrades the tick to a skipped
    /// sample, matching the contract of [`FaceInput::Failed`].
    pub fn tick(
        &mut self,
        frame: &dyn PixelSource,
        face_source: &mut dyn FaceSource,
        now_ms: u64,
    ) -> TickOutput {
        match face_source.detect(frame) {
            Ok(Some(landmarks)) => self.advance(frame, FaceInput::Landmarks(&landmarks), now_ms),
            Ok(None) => self.advance(frame, FaceInput::NoFace, now_ms),
            Err(err) => {
                debug!(reason = %err, "face detection failed; skipping frame");
                self.advance(frame, FaceInput::Failed, now_ms)
            }
        }
    }

    /// Snapshot of the UI waveform ring, oldest first.
    #[must_use]
    pub fn waveform(&self) -> Vec<f64> {
        self.waveform.snapshot()
    }

    /// Session counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Number of samples currently buffered.
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.chain.len()
    }

    /// Pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facepulse_roi::{FaceLandmarks, FaceSourceError, Point, VideoFrame, LANDMARK_COUNT};
    use std::f64::consts::PI;

    const SKIN: [u8; 4] = [120, 150, 110, 255];

    fn skin_frame() -> VideoFrame {
        VideoFrame::solid(120, 120, SKIN)
    }

    /// Frame whose green channel oscillates like a pulse.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn pulse_frame(tick: usize, freq: f64) -> VideoFrame {
        let green = 150.0 + 40.0 * (2.0 * PI * freq * tick as f64 / 30.0).sin();
        VideoFrame::solid(120, 120, [120, green.round() as u8, 110, 255])
    }

    struct NeverSees;
    impl FaceSource for NeverSees {
        fn detect(
            &mut self,
            _frame: &dyn PixelSource,
        ) -> Result<Option<FaceLandmarks>, FaceSourceError> {
            Ok(None)
        }
    }

    struct AlwaysFails;
    impl FaceSource for AlwaysFails {
        fn detect(
            &mut self,
            _frame: &dyn PixelSource,
        ) -> Result<Option<FaceLandmarks>, FaceSourceError> {
            Err(FaceSourceError::new("model timed out"))
        }
    }

    struct FixedLandmarks(FaceLandmarks);
    impl FaceSource for FixedLandmarks {
        fn detect(
            &mut self,
            _frame: &dyn PixelSource,
        ) -> Result<Option<FaceLandmarks>, FaceSourceError> {
            Ok(Some(self.0.clone()))
        }
    }

    fn centred_landmarks() -> FaceLandmarks {
        let points = (0..LANDMARK_COUNT)
            .map(|i| Point::new(30.0 + (i % 10) as f64 * 6.0, 30.0 + (i / 10) as f64 * 6.0))
            .collect();
        FaceLandmarks::new(points).unwrap()
    }

    #[test]
    fn invalid_config_never_starts() {
        let config = PipelineConfig::builder().fft_size(500).build();
        assert!(matches!(Session::new(config), Err(CoreError::Config(_))));
    }

    #[test]
    fn first_tick_is_calibrating() {
        let mut session = Session::with_defaults();
        session.start(0);
        let out = session.advance(&skin_frame(), FaceInput::NoFace, 33);
        assert!(matches!(out.display, DisplayOutput::Calibrating { progress: 0 }));
        assert_eq!(session.stats().samples, 1);
    }

    #[test]
    fn failed_detection_skips_the_frame() {
        let mut session = Session::with_defaults();
        session.start(0);
        session.advance(&skin_frame(), FaceInput::Failed, 33);
        let stats = session.stats();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.samples, 0);
        assert_eq!(session.buffered_samples(), 0);
    }

    #[test]
    fn tick_maps_detector_outcomes() {
        let mut session = Session::with_defaults();
        session.start(0);

        session.tick(&skin_frame(), &mut NeverSees, 33);
        assert_eq!(session.stats().samples, 1);

        session.tick(&skin_frame(), &mut AlwaysFails, 66);
        assert_eq!(session.stats().skipped, 1);

        session.tick(&skin_frame(), &mut FixedLandmarks(centred_landmarks()), 99);
        assert_eq!(session.stats().samples, 2);
    }

    #[test]
    fn not_detecting_shows_unavailable() {
        let mut session = Session::with_defaults();
        let out = session.advance(&skin_frame(), FaceInput::NoFace, 33);
        assert_eq!(out.display, DisplayOutput::Unavailable);
    }

    #[test]
    fn waveform_ring_is_bounded() {
        let mut session = Session::with_defaults();
        session.start(0);
        for tick in 0..400_usize {
            let now = (tick as u64) * 33;
            session.advance(&pulse_frame(tick, 1.0), FaceInput::NoFace, now);
        }
        let waveform = session.waveform();
        assert_eq!(waveform.len(), 150);
    }

    #[test]
    fn restart_clears_buffers_and_stats() {
        let mut session = Session::with_defaults();
        session.start(0);
        for tick in 0..120_usize {
            session.advance(&pulse_frame(tick, 1.0), FaceInput::NoFace, (tick as u64) * 33);
        }
        assert!(session.buffered_samples() > 0);

        session.stop();
        assert!(!session.is_detecting());
        // Buffers survive a stop
        assert!(session.buffered_samples() > 0);

        session.start(60_000);
        assert_eq!(session.buffered_samples(), 0);
        assert_eq!(session.stats().frames, 0);
        assert!(session.waveform().is_empty());
    }
}
