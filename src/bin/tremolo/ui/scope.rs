//! Gain oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render the most recent tremolo gain samples (0..1)
pub fn render_scope(frame: &mut Frame, area: Rect, gains: &[f32], window_seconds: f64) {
    let block = Block::default()
        .title(format!(" Gain ({:.1} s) ", window_seconds))
        .borders(Borders::ALL);

    let len = gains.len().max(1) as f64;
    let data: Vec<(f64, f64)> = gains
        .iter()
        .enumerate()
        .map(|(i, &g)| (i as f64 / len, g as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .labels(vec!["0", "0.5", "1"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
