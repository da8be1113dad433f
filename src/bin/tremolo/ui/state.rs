//! Shared state types for UI communication
//!
//! Everything here is Copy so it can cross the audio thread boundary
//! through rtrb without allocating.

use saavy_tremolo::LfoState;

/// Commands sent from UI thread to the demo's audio callback
#[derive(Clone, Copy, Debug)]
pub enum DemoMessage {
    /// Play or silence the test chord
    SetGate(bool),
    /// Start or stop the simulated host transport
    SetPlaying(bool),
}

/// Snapshot of the engine, sent once per audio callback
#[derive(Clone, Copy, Debug)]
pub struct EngineStatus {
    pub state: LfoState,
    pub phase: f64,
    pub effective_rate: f64,
    pub oversampling: usize,
    pub shaper_output: f32,
    pub gain: f32,
    pub beat: f64,
    pub is_playing: bool,
    pub gate: bool,
    pub bypass: bool,
}

impl EngineStatus {
    pub fn new() -> Self {
        Self {
            state: LfoState::Idle,
            phase: 0.0,
            effective_rate: 0.0,
            oversampling: 2,
            shaper_output: 0.0,
            gain: 0.0,
            beat: 0.0,
            is_playing: true,
            gate: true,
            bypass: false,
        }
    }
}
