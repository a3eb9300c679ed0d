//! End-to-end scenarios over the full pipeline: synthetic frames in,
//! display readings out.

use std::f64::consts::PI;

use facepulse_core::{
    DisplayOutput, FaceInput, PipelineConfig, Session, SignalQuality, SpectralEstimator,
};
use facepulse_roi::VideoFrame;
use facepulse_signal::SignalChain;

const TICK_MS: u64 = 33;

/// Uniform frame whose green channel carries a pulse at `freq` Hz.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pulse_frame(tick: usize, freq: f64) -> VideoFrame {
    let green = 150.0 + 40.0 * (2.0 * PI * freq * tick as f64 / 30.0).sin();
    VideoFrame::solid(120, 120, [110, green.round() as u8, 100, 255])
}

/// Frame below the background brightness gate everywhere.
fn dark_frame() -> VideoFrame {
    VideoFrame::solid(120, 120, [10, 10, 10, 255])
}

/// Drive a session with pulse frames for `ticks` ticks, starting the
/// clock at tick `start_tick`.
fn drive(session: &mut Session, freq: f64, start_tick: usize, ticks: usize) -> DisplayOutput {
    let mut last = DisplayOutput::Unavailable;
    for tick in start_tick..start_tick + ticks {
        let now = (tick as u64) * TICK_MS;
        last = session
            .advance(&pulse_frame(tick, freq), FaceInput::NoFace, now)
            .display;
    }
    last
}

#[test]
fn pure_one_hertz_reads_sixty_after_calibration() {
    let mut session = Session::with_defaults();
    session.start(0);

    let display = drive(&mut session, 1.0, 0, 600);
    let bpm = display.bpm().expect("calibrated session should show a BPM");
    assert!((59..=61).contains(&bpm), "expected ~60 BPM, got {bpm}");
}

#[test]
fn pure_two_hertz_reads_one_twenty_not_sixty() {
    let mut session = Session::with_defaults();
    session.start(0);

    let display = drive(&mut session, 2.0, 0, 600);
    let bpm = display.bpm().expect("calibrated session should show a BPM");
    assert!(
        (119..=121).contains(&bpm),
        "octave correction must not halve 120 BPM, got {bpm}",
    );
}

#[test]
fn subharmonic_trap_reads_eighty_four_never_forty_two() {
    // 0.7 Hz fundamental with a strong 1.4 Hz component: the reading
    // must land on 84 BPM, whether via peak selection, the doubling
    // rule, or the low-range rescue.
    let mut chain = SignalChain::default_config();
    let estimator = SpectralEstimator::new(512, 30.0, 0.3, (40.0, 220.0)).unwrap();

    for i in 0..600 {
        let t = i as f64 / 30.0;
        chain.push((2.0 * PI * 0.7 * t).sin() + 0.8 * (2.0 * PI * 1.4 * t).sin());
    }
    let processed = chain.process().unwrap();
    let bpm = estimator.estimate(&processed.samples).unwrap();
    assert_eq!(bpm, 84, "subharmonic trap emitted {bpm}");
}

#[test]
fn white_noise_never_yields_an_out_of_range_reading() {
    // Noise ticks must be total: every outcome is either "no
    // estimate" or a value inside the acceptance range.
    let estimator = SpectralEstimator::new(512, 30.0, 0.3, (40.0, 220.0)).unwrap();
    let mut state = 0x9e37_79b9_7f4a_7c15_u64;
    let mut gauss = || {
        // Sum of uniforms is close enough to Gaussian here
        let mut sum = 0.0;
        for _ in 0..12 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            sum += state as f64 / u64::MAX as f64;
        }
        sum - 6.0
    };

    for _trial in 0..30 {
        let mut chain = SignalChain::default_config();
        for _ in 0..600 {
            chain.push(gauss());
        }
        let processed = chain.process().unwrap();
        if let Some(bpm) = estimator.estimate(&processed.samples) {
            assert!(
                (40..=220).contains(&bpm),
                "noise produced out-of-range reading {bpm}",
            );
        }
    }
}

#[test]
fn step_change_moves_the_display_with_a_lag() {
    let mut session = Session::with_defaults();
    session.start(0);

    // 15 s at 1 Hz (60 BPM)
    drive(&mut session, 1.0, 0, 450);

    // 3 s into the second segment the display still shows the old
    // rate: the shown value trails the clock by the display delay.
    let display = drive(&mut session, 1.5, 450, 96);
    let bpm = display.bpm().expect("display should be numeric at t=18s");
    assert!((55..=65).contains(&bpm), "expected old rate ~60, got {bpm}");

    // By 34 s the delayed window is fully inside the 1.5 Hz segment.
    let display = drive(&mut session, 1.5, 546, 485);
    let bpm = display.bpm().expect("display should be numeric at t=34s");
    assert!((85..=95).contains(&bpm), "expected new rate ~90, got {bpm}");
}

#[test]
fn dark_frames_produce_no_samples_and_no_estimate() {
    let mut session = Session::with_defaults();
    session.start(0);

    let mut last_quality = SignalQuality::Poor;
    for tick in 0..600_usize {
        let out = session.advance(&dark_frame(), FaceInput::NoFace, (tick as u64) * TICK_MS);
        last_quality = out.quality.quality;
        assert!(out.waveform.is_none());
    }

    let stats = session.stats();
    assert_eq!(stats.samples, 0);
    assert_eq!(stats.skipped, 600);
    assert_eq!(stats.estimates, 0);
    assert_eq!(session.buffered_samples(), 0);
    assert_eq!(last_quality, SignalQuality::Insufficient);

    // Past the calibration period with an empty history: unavailable
    let out = session.advance(&dark_frame(), FaceInput::NoFace, 20_000);
    assert_eq!(out.display, DisplayOutput::Unavailable);
}

#[test]
fn quality_of_a_clean_pulse_is_at_least_good() {
    let mut session = Session::with_defaults();
    session.start(0);

    let mut last_score = 0.0;
    for tick in 0..450_usize {
        let out = session.advance(&pulse_frame(tick, 1.2), FaceInput::NoFace, (tick as u64) * TICK_MS);
        last_score = out.quality.score;
    }
    assert!(
        last_score > 0.5,
        "clean pulse ended with quality {last_score}",
    );
}

#[test]
fn custom_configuration_flows_through_the_session() {
    let config = PipelineConfig::builder()
        .calibration_period_ms(3_000)
        .display_delay_ms(1_000)
        .build();
    let mut session = Session::new(config).unwrap();
    session.start(0);

    // With a 3 s calibration period the display turns numeric early
    let mut shown = None;
    for tick in 0..300_usize {
        let out = session.advance(&pulse_frame(tick, 1.0), FaceInput::NoFace, (tick as u64) * TICK_MS);
        if let Some(bpm) = out.display.bpm() {
            shown = Some((tick, bpm));
            break;
        }
    }
    let (tick, bpm) = shown.expect("short calibration should surface a BPM");
    assert!(tick < 150, "BPM appeared only at tick {tick}");
    assert!((55..=65).contains(&bpm));
}
