//! tremolo - terminal demo of the tempo-aware tremolo
//!
//! Run with: cargo run --bin tremolo

mod app;
mod ui;

use app::TremoloDemo;
use saavy_tremolo::{LfoWaveform, TremoloParams};
use simple_logger::SimpleLogger;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init()?;

    let preset = TremoloParams {
        rate: 4.0,
        depth: 0.7,
        waveform: LfoWaveform::FenderStyle,
        ..TremoloParams::default()
    };

    TremoloDemo::new().bpm(120.0).params(preset).run()
}
