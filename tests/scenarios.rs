//! End-to-end scenarios driving the LFO the way a host would.

use saavy_tremolo::{LfoState, LfoWaveform, ShaperWaveform, TremoloLfo};

fn prepared(sample_rate: f64) -> TremoloLfo {
    let mut lfo = TremoloLfo::default();
    lfo.prepare(sample_rate).unwrap();
    lfo
}

fn zero_crossings(values: &[f32], centre: f32) -> usize {
    let mut crossings = 0;
    let mut last_sign = 0i8;
    for &v in values {
        let sign = if v > centre {
            1
        } else if v < centre {
            -1
        } else {
            0
        };
        if sign != 0 {
            if last_sign != 0 && sign != last_sign {
                crossings += 1;
            }
            last_sign = sign;
        }
    }
    crossings
}

fn pearson(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_b = b.iter().map(|&x| x as f64).sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[test]
fn steady_sine_tremolo_crosses_midline_twice_per_cycle() {
    let mut lfo = prepared(44_100.0);
    lfo.set_waveform(LfoWaveform::Sine);
    lfo.set_rate(5.0).unwrap();
    lfo.set_depth(1.0).unwrap();
    lfo.update_active(true, true);

    let gains: Vec<f32> = (0..44_100).map(|_| lfo.next_sample()).collect();
    let crossings = zero_crossings(&gains, 0.5);

    assert!(
        (9..=11).contains(&crossings),
        "expected 10 ± 1 crossings, got {}",
        crossings
    );
}

#[test]
fn sync_switch_at_120_bpm() {
    let mut lfo = prepared(48_000.0);
    lfo.set_bpm(120.0).unwrap();

    lfo.set_sync(true, 1.0).unwrap();
    assert_eq!(lfo.effective_rate(), 2.0);

    lfo.set_sync(true, 4.0).unwrap();
    assert_eq!(lfo.effective_rate(), 6.0);
}

#[test]
fn stop_during_cycle_finishes_then_fades() {
    let mut lfo = prepared(44_100.0);
    lfo.set_rate(2.0).unwrap();
    lfo.set_depth(0.8).unwrap();
    lfo.update_active(true, true);

    for _ in 0..22_050 {
        lfo.next_sample();
    }

    lfo.update_active(false, true);
    assert_eq!(lfo.state(), LfoState::WaitingForReset);

    // keep modulating until the cycle boundary
    let mut waited = 0;
    let boundary_phase = loop {
        let phase = lfo.phase();
        let g = lfo.next_sample();
        assert!((0.0..=1.0).contains(&g));
        match lfo.state() {
            LfoState::WaitingForReset => waited += 1,
            LfoState::ResetTransition => break phase,
            other => panic!("unexpected state {:?}", other),
        }
        assert!(waited < 44_100, "never reached the cycle boundary");
    };
    assert!(
        boundary_phase >= 0.99 || boundary_phase < 0.01,
        "fade started at phase {}",
        boundary_phase
    );

    // cosine fade: count every call from entry through exit
    let mut fade_samples = 1;
    while lfo.state() == LfoState::ResetTransition {
        let g = lfo.next_sample();
        assert!((0.0..=1.0).contains(&g));
        fade_samples += 1;
        assert!(fade_samples < 10_000, "fade never finished");
    }
    assert!(
        (2204..=2206).contains(&fade_samples),
        "fade took {} samples",
        fade_samples
    );

    assert_eq!(lfo.state(), LfoState::Idle);
    assert_eq!(lfo.phase(), 0.0);
    for _ in 0..1_000 {
        assert_eq!(lfo.next_sample(), 0.8);
    }
}

#[test]
fn waveshape_fades_out_after_disable() {
    let mut lfo = prepared(48_000.0);
    lfo.update_active(true, true);
    lfo.set_waveshape(3.0, 0.5, ShaperWaveform::Square, true)
        .unwrap();

    for _ in 0..4_800 {
        lfo.next_sample();
    }
    assert!(lfo.waveshaper().last_output().abs() > 0.4);

    lfo.set_waveshape(3.0, 0.5, ShaperWaveform::Square, false)
        .unwrap();

    let trace: Vec<f32> = (0..500)
        .map(|_| {
            lfo.next_sample();
            lfo.waveshaper().last_output().abs()
        })
        .collect();

    for pair in trace.windows(2) {
        assert!(pair[1] <= pair[0], "shaping grew: {} → {}", pair[0], pair[1]);
    }
    assert!(trace[460] < 1e-4, "still {} at sample 460", trace[460]);
    assert_eq!(trace[499], 0.0);
}

#[test]
fn opposite_phase_offsets_anti_correlate() {
    let make = |degrees: f64| {
        let mut lfo = TremoloLfo::new(44_100.0)
            .with_waveform(LfoWaveform::Sine)
            .with_rate(1.0)
            .with_depth(1.0)
            .with_phase_offset(degrees);
        lfo.update_active(true, true);
        lfo
    };
    let mut a = make(0.0);
    let mut b = make(180.0);

    let ga: Vec<f32> = (0..1_000).map(|_| a.next_sample()).collect();
    let gb: Vec<f32> = (0..1_000).map(|_| b.next_sample()).collect();

    let r = pearson(&ga, &gb);
    assert!(r <= -0.8, "correlation {}", r);
}

#[test]
fn hard_square_at_high_rate_stays_bounded() {
    let mut lfo = prepared(44_100.0);
    lfo.set_rate(22.0).unwrap();
    lfo.set_depth(1.0).unwrap();
    lfo.set_waveform(LfoWaveform::Square);
    lfo.update_active(true, true);

    for i in 0..44_100 {
        let g = lfo.next_sample();
        assert!(g.is_finite(), "non-finite output at {}", i);
        assert!((0.0..=1.0).contains(&g), "output {} at {}", g, i);
    }
}
