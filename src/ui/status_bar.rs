// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts, toggle indicators
// and the data load state.

use crate::app::{AppState, InputMode, LoadState};
use crate::theme::{load_state_color, AMBER, AVAX_RED, GLACIER_BLUE, ICE_TEAL, SLATE_GREY, SNOW_WHITE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// One key hint; lower priority numbers survive narrow terminals
struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
    color: Color,
}

static NORMAL_HINTS: [Hint; 9] = [
    Hint { priority: 1, key: "Q:", desc: "Quit | ", color: AVAX_RED },
    Hint { priority: 1, key: "↑↓:", desc: "Chains | ", color: GLACIER_BLUE },
    Hint { priority: 1, key: "Enter:", desc: "Detail | ", color: GLACIER_BLUE },
    Hint { priority: 1, key: "R:", desc: "Refresh | ", color: GLACIER_BLUE },
    Hint { priority: 2, key: "B:", desc: "Burst | ", color: GLACIER_BLUE },
    Hint { priority: 2, key: "A:", desc: "Anim | ", color: GLACIER_BLUE },
    Hint { priority: 2, key: "t:", desc: "Labels | ", color: GLACIER_BLUE },
    Hint { priority: 3, key: "S:", desc: "Sort | ", color: GLACIER_BLUE },
    Hint { priority: 3, key: "/:", desc: "Filter | ", color: GLACIER_BLUE },
];

static FILTER_HINTS: [Hint; 3] = [
    Hint { priority: 1, key: "Enter:", desc: "Apply | ", color: GLACIER_BLUE },
    Hint { priority: 1, key: "Esc:", desc: "Clear | ", color: AVAX_RED },
    Hint { priority: 1, key: "Bksp:", desc: "Delete | ", color: GLACIER_BLUE },
];

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let hints: &[Hint] = match app.input_mode {
        InputMode::Normal => &NORMAL_HINTS,
        InputMode::Filter => &FILTER_HINTS,
    };

    // Keep room for the indicators on the right
    let indicators = build_toggle_indicators(app);
    let indicator_width: usize = indicators.iter().map(|s| s.width()).sum();
    let available_width = (area.width as usize)
        .saturating_sub(4)
        .saturating_sub(indicator_width + 1);

    let mut spans = vec![Span::styled(" ◆ ", Style::default().fg(AVAX_RED))];
    let mut current_length = 3;

    // Process hints by priority
    for priority in 1..=3 {
        for hint in hints.iter().filter(|h| h.priority == priority) {
            let hint_length = hint.key.chars().count() + hint.desc.len();
            if current_length + hint_length <= available_width {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(hint.color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
                current_length += hint_length;
            }
        }
    }

    spans.push(Span::raw(" "));
    spans.extend(indicators);

    let border_color = match app.load_state() {
        LoadState::Failed { .. } => AVAX_RED,
        _ => GLACIER_BLUE,
    };

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(border_color)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

fn toggle_span(key: &'static str, on: bool) -> Vec<Span<'static>> {
    vec![
        Span::styled(key, Style::default().fg(SNOW_WHITE)),
        Span::styled(
            if on { "ON" } else { "OFF" },
            Style::default()
                .fg(if on { ICE_TEAL } else { SLATE_GREY })
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("] ", Style::default().fg(SNOW_WHITE)),
    ]
}

/// Build toggle status indicator spans for the status bar
/// Shows [A:ON/OFF] [t:ON/OFF], the particle count and the load state
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    spans.extend(toggle_span("[A:", app.settings.animations_enabled));
    spans.extend(toggle_span("[t:", app.settings.labels_enabled));

    let system = app.animation().system();
    spans.push(Span::styled(
        format!("[P:{}/{}] ", system.len(), system.capacity()),
        Style::default().fg(if app.animation_reduced { AMBER } else { SNOW_WHITE }),
    ));

    let state = app.load_state();
    spans.push(Span::styled(
        format!("[{}]", state.label()),
        Style::default()
            .fg(load_state_color(state))
            .add_modifier(Modifier::BOLD),
    ));

    spans
}
