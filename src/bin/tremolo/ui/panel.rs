//! Parameter panel - current settings, LFO status and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_tremolo::{dsp::lfo::period_from_frequency, LfoState, TremoloError, TremoloParams};

use super::EngineStatus;

/// Output level statistics
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = saavy_tremolo::dsp::mix::peak(buffer);
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn state_label(state: LfoState) -> (&'static str, Color) {
    match state {
        LfoState::Idle => ("idle", Color::DarkGray),
        LfoState::Running => ("running", Color::Green),
        LfoState::WaitingForReset => ("finishing cycle", Color::Yellow),
        LfoState::ResetTransition => ("fading out", Color::Magenta),
    }
}

fn row(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render_panel(
    frame: &mut Frame,
    area: Rect,
    params: &TremoloParams,
    status: &EngineStatus,
    stats: &AudioStats,
    last_error: Option<TremoloError>,
) {
    let block = Block::default()
        .title(" tremolo ")
        .borders(Borders::ALL);

    let rate = if params.sync {
        format!("{} @ {:.0} BPM", params.division.label(), params.bpm)
    } else {
        format!("{:.2} Hz", params.rate)
    };
    let (state, state_color) = state_label(status.state);
    let shaper = &params.waveshaper;
    let shaper_text = if shaper.enabled {
        format!(
            "{} {:.2} Hz depth {:.2}  ({:+.2})",
            shaper.waveform.name(),
            shaper.rate,
            shaper.depth,
            status.shaper_output
        )
    } else {
        format!("off ({:+.3})", status.shaper_output)
    };

    let lines = vec![
        row("rate", rate, Color::Cyan),
        row(
            "effective",
            format!(
                "{:.3} Hz  period {:.0} ms  K={}",
                status.effective_rate,
                period_from_frequency(status.effective_rate.max(1e-6)) * 1000.0,
                status.oversampling
            ),
            Color::White,
        ),
        row("depth", format!("{:.2}", params.depth), Color::Cyan),
        row("mix", format!("{:.2}", params.mix), Color::Cyan),
        row("waveform", params.waveform.name().to_string(), Color::Cyan),
        row("offset", format!("{:+.0}°", params.phase_offset), Color::Cyan),
        row("shaper", shaper_text, Color::Cyan),
        row(
            "lfo",
            format!("{}  φ={:.3}  g={:.3}", state, status.phase, status.gain),
            state_color,
        ),
        row(
            "host",
            format!(
                "{}  beat {:.2}  chord {}{}",
                if status.is_playing { "▶ playing" } else { "⏸ stopped" },
                status.beat,
                if status.gate { "on" } else { "off" },
                if status.bypass { "  BYPASS" } else { "" }
            ),
            if status.is_playing { Color::Green } else { Color::Yellow },
        ),
        row(
            "output",
            format!("peak {:.2}  rms {:.2}", stats.peak, stats.rms),
            Color::Magenta,
        ),
        row(
            "error",
            last_error.map_or_else(|| "none".to_string(), |err| err.to_string()),
            if last_error.is_some() { Color::Red } else { Color::DarkGray },
        ),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
