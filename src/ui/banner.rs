// Banner rendering module
//
// Renders the top banner with ASCII art logo and global network stats.

use crate::app::{AppState, LoadState};
use crate::theme::{interpolate_color, load_state_color, AVAX_RED, SLATE_GREY, SNOW_WHITE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use std::time::Duration;

const LOGO: [&str; 5] = [
    "     /\\      ",
    "    /  \\     ",
    "   / /\\ \\    ",
    "  / ____ \\   ",
    " /_/    \\_\\  ",
];

/// Human-readable age of the last successful refresh
pub fn format_age(age: Option<Duration>) -> String {
    match age {
        None => "never".to_string(),
        Some(age) if age.as_secs() < 60 => format!("{}s ago", age.as_secs()),
        Some(age) if age.as_secs() < 3600 => format!("{}m ago", age.as_secs() / 60),
        Some(age) => format!("{}h ago", age.as_secs() / 3600),
    }
}

pub fn render_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let state = app.load_state();
    let age = app.poller().last_success().map(|t| t.elapsed());

    let stats_text = format!(
        "   [TPS: {:.2}] [Chains: {}] [Updated: {}]",
        app.total_tps(),
        app.chain_count(),
        format_age(age),
    );
    let mut state_text = match state {
        LoadState::Stale { .. } => format!("   [{} - showing last good data]", state.label()),
        _ => format!("   [{}]", state.label()),
    };
    if app.poller().is_in_flight() {
        state_text.push_str(" [refreshing...]");
    }

    let side: [Vec<Span>; 5] = [
        vec![],
        vec![Span::styled(
            "   >>> Avalanche Network Topology <<<",
            Style::default().fg(AVAX_RED).add_modifier(Modifier::BOLD),
        )],
        vec![Span::styled(
            format!("   {}", app.poller().source_description()),
            Style::default().fg(SLATE_GREY),
        )],
        vec![Span::styled(stats_text, Style::default().fg(SNOW_WHITE))],
        vec![Span::styled(
            state_text,
            Style::default()
                .fg(load_state_color(state))
                .add_modifier(Modifier::BOLD),
        )],
    ];

    // Logo fades from red at the peak to slate at the base
    let banner_text: Vec<Line> = LOGO
        .iter()
        .zip(side)
        .enumerate()
        .map(|(row, (art, extra))| {
            let color = interpolate_color((232, 65, 66), (150, 60, 70), row as f32 / 4.0);
            let mut spans = vec![Span::styled(
                *art,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            spans.extend(extra);
            Line::from(spans)
        })
        .collect();

    let banner = Paragraph::new(banner_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(AVAX_RED)),
        )
        .alignment(Alignment::Left);

    f.render_widget(banner, area);
}
