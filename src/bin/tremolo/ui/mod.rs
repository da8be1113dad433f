//! TUI module for the tremolo demo
//!
//! Shows the gain the engine applies, the output spectrum, and the current
//! parameters. Keys change parameters through the engine's control handle.

mod panel;
mod scope;
mod spectrum;
pub mod state;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use saavy_tremolo::{
    dsp::sync::NoteDivision,
    engine::control::{ControlError, ControlHandle},
    params::rate_to_normalized,
    LfoWaveform, ShaperWaveform,
};
use std::collections::VecDeque;
use std::time::Duration;

pub use state::{DemoMessage, EngineStatus};

use panel::{render_panel, AudioStats};
use scope::render_scope;
use spectrum::{render_spectrum, SpectrumAnalyzer};

/// Seconds of gain history on the scope
const SCOPE_SECONDS: f64 = 2.0;
/// Scope points kept after decimation
const SCOPE_POINTS: usize = 1024;
const FFT_LEN: usize = 2048;

const RATE_STEP: f64 = 0.02;
const DEPTH_STEP: f32 = 0.05;
const OFFSET_STEP: f64 = 45.0;

pub struct UiApp {
    handle: ControlHandle,
    demo_tx: Producer<DemoMessage>,
    gain_rx: Consumer<f32>,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,

    status: EngineStatus,
    /// Decimated gain history
    gains: VecDeque<f32>,
    /// Input samples per scope point
    decimation: usize,
    decimation_phase: usize,
    audio: VecDeque<f32>,
    audio_linear: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: ControlHandle,
        demo_tx: Producer<DemoMessage>,
        gain_rx: Consumer<f32>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        sample_rate: f64,
    ) -> Self {
        let decimation = ((SCOPE_SECONDS * sample_rate) as usize / SCOPE_POINTS).max(1);
        Self {
            handle,
            demo_tx,
            gain_rx,
            audio_rx,
            status_rx,
            status: EngineStatus::new(),
            gains: VecDeque::from(vec![0.0; SCOPE_POINTS]),
            decimation,
            decimation_phase: 0,
            audio: VecDeque::from(vec![0.0; FFT_LEN]),
            audio_linear: Vec::with_capacity(FFT_LEN),
            spectrum: SpectrumAnalyzer::new(FFT_LEN, sample_rate),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Err(err) = self.handle_key(key.code) {
                            log::debug!("key {:?}: {}", key.code, err);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        while let Ok(g) = self.gain_rx.pop() {
            self.decimation_phase += 1;
            if self.decimation_phase >= self.decimation {
                self.decimation_phase = 0;
                self.gains.pop_front();
                self.gains.push_back(g);
            }
        }

        let mut fresh = false;
        while let Ok(s) = self.audio_rx.pop() {
            self.audio.pop_front();
            self.audio.push_back(s);
            fresh = true;
        }
        if fresh {
            self.audio_linear.clear();
            self.audio_linear.extend(self.audio.iter());
            self.spectrum.update(&self.audio_linear);
        }

        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    /// Invalid values are still sent (clamped); the panel shows last_error.
    fn handle_key(&mut self, key: KeyCode) -> Result<(), ControlError> {
        let params = *self.handle.params();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Up | KeyCode::Down => {
                let step = if key == KeyCode::Up { RATE_STEP } else { -RATE_STEP };
                let u = rate_to_normalized(params.rate as f64) + step;
                self.handle.set_rate_normalized(u.clamp(0.0, 1.0))
            }
            KeyCode::Right | KeyCode::Left => {
                let step = if key == KeyCode::Right { DEPTH_STEP } else { -DEPTH_STEP };
                self.handle.set_depth((params.depth + step).clamp(0.0, 1.0))
            }
            KeyCode::Char('m') => self.handle.set_mix((params.mix - 0.1).max(0.0)),
            KeyCode::Char('M') => self.handle.set_mix((params.mix + 0.1).min(1.0)),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                let count = LfoWaveform::ALL.len();
                let index = params.waveform.index();
                let next = if key == KeyCode::Char('w') {
                    (index + 1) % count
                } else {
                    (index + count - 1) % count
                };
                self.handle.set_waveform_index(next)
            }
            KeyCode::Char('s') => self.handle.set_sync(!params.sync, params.division),
            KeyCode::Char('d') => {
                let count = NoteDivision::ALL.len();
                let next = NoteDivision::from_index((params.division.index() + 1) % count)
                    .unwrap_or_default();
                self.handle.set_sync(params.sync, next)
            }
            KeyCode::Char('o') => {
                let next = params.phase_offset + OFFSET_STEP;
                self.handle
                    .set_phase_offset(if next > 360.0 { -360.0 } else { next })
            }
            KeyCode::Char('h') => {
                let shaper = params.waveshaper;
                self.handle.set_waveshape(
                    shaper.rate,
                    shaper.depth,
                    shaper.waveform,
                    !shaper.enabled,
                )
            }
            KeyCode::Char('H') => {
                let shaper = params.waveshaper;
                let count = ShaperWaveform::ALL.len();
                let next = ShaperWaveform::from_index((shaper.waveform.index() + 1) % count)
                    .unwrap_or_default();
                self.handle
                    .set_waveshape(shaper.rate, shaper.depth, next, shaper.enabled)
            }
            KeyCode::Char('b') => self.handle.set_bypass(!params.bypass),
            KeyCode::Char('r') => self.handle.reset_phase(),
            KeyCode::Char(' ') => {
                let _ = self.demo_tx.push(DemoMessage::SetGate(!self.status.gate));
                Ok(())
            }
            KeyCode::Char('p') => {
                let _ = self
                    .demo_tx
                    .push(DemoMessage::SetPlaying(!self.status.is_playing));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(13), // Parameter panel
                Constraint::Min(8),     // Scope + spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let graphs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let stats = AudioStats::from_buffer(&self.audio_linear);
        render_panel(
            frame,
            rows[0],
            self.handle.params(),
            &self.status,
            &stats,
            self.handle.last_error(),
        );

        let (front, back) = self.gains.as_slices();
        let gains: Vec<f32> = front.iter().chain(back.iter()).copied().collect();
        render_scope(frame, graphs[0], &gains, SCOPE_SECONDS);
        render_spectrum(frame, graphs[1], self.spectrum.data());

        let help = Paragraph::new(
            " [Q] Quit  [↑↓] Rate  [←→] Depth  [m/M] Mix  [w/W] Wave  [s] Sync  [d] Div  \
             [o] Offset  [h/H] Shaper  [b] Bypass  [r] Reset  [Space] Chord  [p] Play",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[2]);
    }
}
