// Chain list rendering module
//
// Renders the scrollable list of chains, sorted and filtered the way
// AppState::visible_chains returns them.

use crate::app::{AppState, InputMode};
use crate::theme::{activity_color, AMBER, GLACIER_BLUE, SLATE_GREY, SNOW_WHITE};
use crate::topology::sanitize_activity;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

/// Selected row background
const HIGHLIGHT_BG: Color = Color::Rgb(40, 48, 66);

/// Compact TPS figure for a narrow column
pub fn format_tps(tps: f64) -> String {
    if tps >= 1000.0 {
        format!("{:.1}k", tps / 1000.0)
    } else if tps >= 10.0 {
        format!("{:.0}", tps)
    } else {
        format!("{:.2}", tps)
    }
}

pub fn render_chain_list(f: &mut Frame, area: Rect, app: &mut AppState) {
    let max_tps = app.topology().max_activity();
    let hub_id = app.topology().layout.hub().map(str::to_string);
    let selected = app.selection.selected.clone();

    let items: Vec<ListItem> = app
        .visible_chains()
        .iter()
        .enumerate()
        .map(|(idx, chain)| {
            let tps = sanitize_activity(chain.tps_value());
            let ratio = if max_tps > 0.0 { tps / max_tps } else { 0.0 };
            let is_hub = hub_id.as_deref() == Some(chain.chain_id.as_str());
            let is_open = selected.as_deref() == Some(chain.chain_id.as_str());

            let marker = if is_hub { "◆" } else { "•" };
            let mut name_style = Style::default().fg(SNOW_WHITE);
            if is_open {
                name_style = name_style.fg(GLACIER_BLUE).add_modifier(Modifier::BOLD);
            }

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:2}.", idx + 1), Style::default().fg(SLATE_GREY)),
                Span::styled(format!(" {} ", marker), Style::default().fg(activity_color(ratio))),
                Span::styled(chain.display_name().to_string(), name_style),
                Span::styled(
                    format!("  {} tps", format_tps(tps)),
                    Style::default().fg(activity_color(ratio)),
                ),
                Span::styled(
                    chain
                        .validator_count()
                        .map(|n| format!("  {} val", n))
                        .unwrap_or_default(),
                    Style::default().fg(SLATE_GREY),
                ),
            ]))
        })
        .collect();

    let count = items.len();
    let mut title = vec![Span::styled(
        format!("━ Chains ({}) · sort: {} ", count, app.sort_mode.label()),
        Style::default().fg(GLACIER_BLUE).add_modifier(Modifier::BOLD),
    )];
    match app.input_mode {
        InputMode::Filter => title.push(Span::styled(
            format!("/{}_ ", app.filter),
            Style::default().fg(AMBER).add_modifier(Modifier::BOLD),
        )),
        InputMode::Normal if !app.filter.is_empty() => title.push(Span::styled(
            format!("[filter: {}] ", app.filter),
            Style::default().fg(AMBER),
        )),
        InputMode::Normal => {}
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(GLACIER_BLUE)),
        )
        .highlight_style(Style::default().bg(HIGHLIGHT_BG));

    f.render_stateful_widget(list, area, &mut app.chain_list_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tps() {
        assert_eq!(format_tps(0.0), "0.00");
        assert_eq!(format_tps(3.14159), "3.14");
        assert_eq!(format_tps(42.4), "42");
        assert_eq!(format_tps(1530.0), "1.5k");
    }
}
