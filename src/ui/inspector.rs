// Chain inspector rendering module
//
// Renders the detail panel for the chain opened with Enter (or the one
// under the list cursor), plus a network overview when nothing is focused.

use crate::api::ChainInfo;
use crate::app::AppState;
use crate::theme::{activity_color, load_state_color, AVAX_RED, GLACIER_BLUE, SLATE_GREY, SNOW_WHITE};
use crate::topology::{sanitize_activity, Topology};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

// ============================================================================
// Chain Inspector View Model
// ============================================================================

/// View model for the inspector panel
///
/// Contains all data needed to render the inspector, extracted from AppState.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDetailView {
    pub title: String,
    pub chain_id: Option<String>,
    pub tps: f64,
    /// Fraction of total network TPS, in [0, 1]
    pub share: f64,
    /// Ring index and angle in degrees; None for the hub or unplaced chains
    pub placement: Option<(usize, f64)>,
    pub validators: Option<u64>,
    pub sampled_at: Option<i64>,
    pub logo_uri: Option<String>,
    pub role: &'static str,
    /// Whether the detail was opened with Enter (vs. just hovered)
    pub pinned: bool,
}

/// Build the view for the focused chain, if any
///
/// The pinned (Enter) selection wins over the hovered one.
pub fn build_chain_detail_view(app: &AppState) -> Option<ChainDetailView> {
    let (id, pinned) = match (&app.selection.selected, &app.selection.hovered) {
        (Some(id), _) => (id, true),
        (None, Some(id)) => (id, false),
        (None, None) => return None,
    };
    let chain = app.chain(id)?;
    Some(chain_view(chain, app.topology(), app.total_tps(), pinned))
}

fn chain_view(
    chain: &ChainInfo,
    topology: &Topology,
    total_tps: f64,
    pinned: bool,
) -> ChainDetailView {
    let tps = sanitize_activity(chain.tps_value());
    let position = topology.layout.get(&chain.chain_id);
    let role = match position {
        Some(pos) if pos.ring.is_none() => "hub",
        Some(_) => "satellite",
        None => "not placed",
    };
    let placement =
        position.and_then(|pos| pos.ring.map(|ring| (ring, pos.angle.to_degrees())));

    ChainDetailView {
        title: chain.display_name().to_string(),
        chain_id: Some(chain.chain_id.clone()),
        tps,
        share: if total_tps > 0.0 {
            (tps / total_tps).clamp(0.0, 1.0)
        } else {
            0.0
        },
        placement,
        validators: chain.validator_count(),
        sampled_at: chain.tps.as_ref().and_then(|s| s.timestamp),
        logo_uri: chain.chain_logo_uri.clone(),
        role,
        pinned,
    }
}

/// Text bar for a share in [0, 1]
fn share_bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn field(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<11}", label)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render_inspector(f: &mut Frame, area: Rect, app: &AppState) {
    let view = build_chain_detail_view(app);

    let lines = match &view {
        Some(view) => {
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw("  CHAIN: "),
                    Span::styled(
                        view.title.clone(),
                        Style::default().fg(AVAX_RED).add_modifier(Modifier::BOLD),
                    ),
                ]),
                field(
                    "id:",
                    view.chain_id.clone().unwrap_or_default(),
                    SLATE_GREY,
                ),
                field("role:", view.role.to_string(), SNOW_WHITE),
            ];
            if let Some((ring, angle)) = view.placement {
                lines.push(field(
                    "placement:",
                    format!("ring {} at {:.0}°", ring + 1, angle),
                    SLATE_GREY,
                ));
            }
            lines.extend([
                field(
                    "tps:",
                    format!("{:.3}", view.tps),
                    activity_color(view.share),
                ),
                field(
                    "share:",
                    format!("{} {:.0}%", share_bar(view.share, 12), view.share * 100.0),
                    activity_color(view.share),
                ),
                field(
                    "validators:",
                    view.validators
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                    SNOW_WHITE,
                ),
            ]);
            if let Some(ts) = view.sampled_at {
                lines.push(field("sampled:", format!("unix {}", ts), SLATE_GREY));
            }
            if let Some(logo) = &view.logo_uri {
                lines.push(field("logo:", logo.clone(), SLATE_GREY));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                if view.pinned {
                    "  Esc to close"
                } else {
                    "  Enter to pin"
                },
                Style::default()
                    .fg(SLATE_GREY)
                    .add_modifier(Modifier::ITALIC),
            )));
            lines
        }
        None => {
            let state = app.load_state();
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw("  NETWORK: "),
                    Span::styled(
                        format!("{} chains", app.chain_count()),
                        Style::default().fg(AVAX_RED).add_modifier(Modifier::BOLD),
                    ),
                ]),
                field("total tps:", format!("{:.2}", app.total_tps()), SNOW_WHITE),
                field("source:", app.poller().source_description(), SLATE_GREY),
                field("state:", state.label().to_string(), load_state_color(state)),
            ];
            if let Some(message) = state.error_message() {
                lines.push(field("error:", message.to_string(), load_state_color(state)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  ↑↓ to pick a chain",
                Style::default()
                    .fg(SLATE_GREY)
                    .add_modifier(Modifier::ITALIC),
            )));
            lines
        }
    };

    let pinned = view.as_ref().is_some_and(|v| v.pinned);
    let title = if pinned {
        "━ Chain Detail (pinned) "
    } else {
        "━ Chain Detail "
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(vec![Span::styled(
                    title,
                    Style::default().fg(GLACIER_BLUE).add_modifier(Modifier::BOLD),
                )])
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if pinned { GLACIER_BLUE } else { SLATE_GREY })),
        );

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::testing::chain;
    use crate::random::SequenceRandom;
    use crate::topology::{nodes_from_chains, LayoutConfig};

    fn topology(chains: &[ChainInfo]) -> Topology {
        Topology::build(
            nodes_from_chains(chains),
            200.0,
            200.0,
            &LayoutConfig::default(),
            &mut SequenceRandom::constant(0.5),
        )
    }

    #[test]
    fn test_chain_view_hub_and_satellite() {
        let chains = vec![chain("c", 15.0), chain("x", 5.0)];
        let topo = topology(&chains);

        let hub = chain_view(&chains[0], &topo, 20.0, true);
        assert_eq!(hub.role, "hub");
        assert_eq!(hub.share, 0.75);
        assert_eq!(hub.placement, None);
        assert_eq!(hub.validators, Some(10));
        assert_eq!(hub.sampled_at, Some(1_700_000_000));
        assert!(hub.pinned);

        let sat = chain_view(&chains[1], &topo, 20.0, false);
        assert_eq!(sat.role, "satellite");
        assert_eq!(sat.share, 0.25);
        assert_eq!(sat.placement.map(|(ring, _)| ring), Some(0));
        assert_eq!(sat.title, "x chain");
    }

    #[test]
    fn test_chain_view_not_placed() {
        let chains = vec![chain("c", 20.0)];
        let topo = topology(&chains);
        let other = chain("gone", 1.0);
        let view = chain_view(&other, &topo, 0.0, false);
        assert_eq!(view.role, "not placed");
        assert_eq!(view.share, 0.0);
    }

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(0.0, 4), "░░░░");
        assert_eq!(share_bar(0.5, 4), "██░░");
        assert_eq!(share_bar(2.0, 4), "████");
    }
}
