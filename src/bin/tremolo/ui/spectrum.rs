//! Output spectrum widget
//!
//! FFT of the processed signal, shown on a log-frequency axis. Tremolo
//! shows up as sidebands around each chord partial, spaced by the LFO rate.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use saavy_tremolo::dsp::mix::amplitude_to_db;
use std::sync::Arc;

/// Number of log-spaced points drawn
const SPECTRUM_POINTS: usize = 64;
const MIN_FREQ: f64 = 40.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// Sum of the window, for normalizing to full-scale sine = 0 dB
    window_gain: f32,
    /// (log10 frequency, FFT bin) per drawn point
    points: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f64) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        // Hann window
        let denom = fft_len.saturating_sub(1).max(1) as f32;
        let window: Vec<f32> = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();
        let window_gain = window.iter().sum::<f32>().max(1e-6);

        let nyquist = (sample_rate / 2.0).min(20_000.0);
        let last_bin = (fft_len / 2).saturating_sub(1);
        let points: Vec<(f64, usize)> = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
                let freq = MIN_FREQ * (nyquist / MIN_FREQ).powf(t);
                let bin = ((freq * fft_len as f64 / sample_rate).round() as usize).min(last_bin);
                (freq.log10(), bin)
            })
            .collect();

        let spectrum = points.iter().map(|&(x, _)| (x, FLOOR_DB)).collect();

        Self {
            window,
            window_gain,
            points,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            spectrum,
        }
    }

    /// Analyze the most recent `fft_len` samples. Shorter input is ignored.
    pub fn update(&mut self, samples: &[f32]) {
        let n = self.window.len();
        if samples.len() < n {
            return;
        }
        let recent = &samples[samples.len() - n..];

        for ((slot, &s), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for ((x, bin), (px, db)) in self.points.iter().zip(self.spectrum.iter_mut()) {
            let amplitude = 2.0 * self.scratch[*bin].norm() / self.window_gain;
            *px = *x;
            *db = (amplitude_to_db(amplitude) as f64).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Output spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (min_x, max_x) = spectrum
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let (min_x, max_x) = if min_x < max_x { (min_x, max_x) } else { (0.0, 1.0) };

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["40 Hz", "1 kHz", "20 kHz"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0 dB"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
