//! TremoloDemo - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::f64::consts::TAU;

use saavy_tremolo::{
    engine::control,
    Transport, TremoloEngine, TremoloParams, MAX_BLOCK_SIZE,
};

use super::ui::{DemoMessage, EngineStatus, UiApp};

/// A minor triad, A3 C4 E4.
const CHORD_HZ: [f64; 3] = [220.0, 261.63, 329.63];
const CHORD_LEVEL: f32 = 0.15;

/// Capacity of the audio → UI sample rings.
const VIS_RING_SIZE: usize = 16_384;

/// Main application builder
pub struct TremoloDemo {
    bpm: f64,
    params: TremoloParams,
}

impl TremoloDemo {
    pub fn new() -> Self {
        Self {
            bpm: 120.0,
            params: TremoloParams::default(),
        }
    }

    /// Tempo of the simulated host transport
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Starting parameter preset
    pub fn params(mut self, params: TremoloParams) -> Self {
        self.params = params;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        if channels == 0 {
            return Err(eyre!("output device reports zero channels"));
        }

        let params = TremoloParams {
            bpm: self.bpm,
            ..self.params
        };

        // UI → audio
        let (handle, param_rx) = control::channel(256);
        let handle = handle.with_params(params);
        let (demo_tx, mut demo_rx) = RingBuffer::<DemoMessage>::new(64);

        // audio → UI
        let (mut gain_tx, gain_rx) = RingBuffer::<f32>::new(VIS_RING_SIZE);
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_RING_SIZE);
        let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(64);

        let mut engine = TremoloEngine::new(sample_rate)
            .with_params(&params)
            .with_receiver(param_rx);
        engine
            .prepare(sample_rate)
            .wrap_err("unsupported output sample rate")?;

        let mut chord = Chord::new(sample_rate);
        let mut clock = HostClock::new(self.bpm, sample_rate);
        let mut gate = true;
        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(msg) = demo_rx.pop() {
                    match msg {
                        DemoMessage::SetGate(on) => gate = on,
                        DemoMessage::SetPlaying(on) => clock.playing = on,
                    }
                }

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let (l, r) = (&mut left[..frames], &mut right[..frames]);

                    for (sl, sr) in l.iter_mut().zip(r.iter_mut()) {
                        let s = if gate { chord.next() } else { 0.0 };
                        *sl = s;
                        *sr = s;
                    }

                    engine.process_block(l, r, clock.transport());
                    clock.advance(frames);

                    for &g in engine.gain_trace() {
                        let _ = gain_tx.push(g);
                    }
                    for &s in l.iter() {
                        let _ = audio_tx.push(s);
                    }

                    let out_off = frames_written * channels;
                    for (i, (&sl, &sr)) in l.iter().zip(r.iter()).enumerate() {
                        let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if ch % 2 == 0 { sl } else { sr };
                        }
                    }

                    frames_written += frames;
                }

                let lfo = engine.lfo();
                let _ = status_tx.push(EngineStatus {
                    state: lfo.state(),
                    phase: lfo.phase(),
                    effective_rate: lfo.effective_rate(),
                    oversampling: lfo.oversampling_factor(),
                    shaper_output: lfo.waveshaper().last_output(),
                    gain: lfo.last_output(),
                    beat: clock.beat,
                    is_playing: clock.playing,
                    gate,
                    bypass: engine.is_bypassed(),
                });
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let mut ui = UiApp::new(handle, demo_tx, gain_rx, audio_rx, status_rx, sample_rate);
        let result = ui.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for TremoloDemo {
    fn default() -> Self {
        Self::new()
    }
}

/// Sine chord used as the carrier
struct Chord {
    phases: [f64; 3],
    increments: [f64; 3],
}

impl Chord {
    fn new(sample_rate: f64) -> Self {
        Self {
            phases: [0.0; 3],
            increments: CHORD_HZ.map(|hz| hz / sample_rate),
        }
    }

    fn next(&mut self) -> f32 {
        let mut sum = 0.0;
        for (phase, inc) in self.phases.iter_mut().zip(self.increments.iter()) {
            sum += (TAU * *phase).sin();
            *phase = (*phase + inc).fract();
        }
        sum as f32 * CHORD_LEVEL
    }
}

/// Simulated host transport
struct HostClock {
    bpm: f64,
    sample_rate: f64,
    beat: f64,
    playing: bool,
}

impl HostClock {
    fn new(bpm: f64, sample_rate: f64) -> Self {
        Self {
            bpm,
            sample_rate,
            beat: 0.0,
            playing: true,
        }
    }

    fn transport(&self) -> Transport {
        let transport = if self.playing {
            Transport::playing()
        } else {
            Transport::stopped()
        };
        transport.with_bpm(self.bpm).with_beat_position(self.beat)
    }

    fn advance(&mut self, frames: usize) {
        if self.playing {
            self.beat += frames as f64 / self.sample_rate * self.bpm / 60.0;
        }
    }
}
