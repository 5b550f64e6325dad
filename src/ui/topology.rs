// Topology (network map) rendering module
//
// Renders the radial hub/satellite canvas: ring guides, edges, chain nodes,
// labels, and the particles in flight. Everything drawn here comes from
// the Scene built by topology::build_scene.

use crate::app::config::{BRAILLE_DOTS_X, BRAILLE_DOTS_Y};
use crate::app::{AppState, LoadState};
use crate::theme::{AMBER, AVAX_RED, GLACIER_BLUE, SLATE_GREY, SNOW_WHITE};
use crate::topology::Scene;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};

/// Angular step between ring guide dots, in degrees
const RING_DOT_STEP_DEG: usize = 10;

/// Ring guide color, dimmed further for outer rings
const RING_RGB: (f32, f32, f32) = (90.0, 98.0, 120.0);

/// Particles at or above this size are drawn as small circles
const LARGE_PARTICLE_SIZE: f64 = 1.8;

/// Flip a layout point (y grows downward) into canvas space (y grows upward)
pub fn to_canvas(height: f64, (x, y): (f64, f64)) -> (f64, f64) {
    (x, height - y)
}

/// Dotted ring guide points that fall inside the canvas
pub fn ring_points(center: (f64, f64), radius: f64, width: f64, height: f64) -> Vec<(f64, f64)> {
    (0..360)
        .step_by(RING_DOT_STEP_DEG)
        .map(|deg| {
            let angle = (deg as f64).to_radians();
            (
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
            )
        })
        .filter(|(x, y)| *x >= 0.0 && *x <= width && *y >= 0.0 && *y <= height)
        .collect()
}

/// Message shown over the canvas instead of (or on top of) the graph
pub fn overlay_message(state: &LoadState, has_nodes: bool) -> Option<(String, Color)> {
    match state {
        LoadState::Loading if !has_nodes => Some(("Loading chain topology...".to_string(), GLACIER_BLUE)),
        LoadState::Failed { message } => Some((
            format!("Failed to load chains: {}  (r to retry)", message),
            AVAX_RED,
        )),
        _ if !has_nodes => Some(("No chains reported by the API".to_string(), SLATE_GREY)),
        _ => None,
    }
}

/// Canvas size in braille dots for a canvas widget occupying `inner`
pub fn viewport_for(inner: Rect) -> (f64, f64) {
    (
        inner.width as f64 * BRAILLE_DOTS_X,
        inner.height as f64 * BRAILLE_DOTS_Y,
    )
}

pub fn render_topology(f: &mut Frame, area: Rect, app: &mut AppState) {
    // Split: summary line + canvas
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let canvas_block = Block::default()
        .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(AVAX_RED));

    // Layout works in dots so circles stay round on the braille grid
    let (width, height) = viewport_for(canvas_block.inner(chunks[1]));
    app.set_viewport(width, height);

    let scene = app.scene();
    let topology = app.topology();
    let hub_name = topology
        .hub()
        .map(|n| n.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let reduced = if app.animation_reduced { " (reduced)" } else { "" };

    let summary = Paragraph::new(Line::from(vec![
        Span::styled(" ◆ ", Style::default().fg(AVAX_RED)),
        Span::styled(
            format!(
                "Chains: {} | Hub: {} | Rings: {} | Particles: {}{}",
                topology.nodes.len(),
                hub_name,
                scene.rings.len(),
                scene.particles.len(),
                reduced,
            ),
            Style::default().fg(SNOW_WHITE),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(AVAX_RED))
            .title(vec![Span::styled(
                "━ Avalanche Network Topology ━",
                Style::default().fg(AVAX_RED).add_modifier(Modifier::BOLD),
            )]),
    );
    f.render_widget(summary, chunks[0]);

    // Capture values for closure
    let overlay = overlay_message(app.load_state(), !scene.nodes.is_empty());
    let labels_enabled = app.settings.labels_enabled;
    let animations_enabled = app.settings.animations_enabled;

    let canvas = Canvas::default()
        .block(canvas_block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width.max(1.0)])
        .y_bounds([0.0, height.max(1.0)])
        .paint(move |ctx| {
            draw_scene(ctx, &scene, labels_enabled, animations_enabled);

            if let Some((message, color)) = &overlay {
                // Roughly center the text; one cell is BRAILLE_DOTS_X dots wide
                let offset = message.chars().count() as f64 / 2.0 * BRAILLE_DOTS_X;
                ctx.print(
                    (width / 2.0 - offset).max(0.0),
                    height / 2.0,
                    Span::styled(
                        message.clone(),
                        Style::default().fg(*color).add_modifier(Modifier::ITALIC),
                    ),
                );
            }
        });

    f.render_widget(canvas, chunks[1]);
}

fn draw_scene(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    scene: &Scene,
    labels_enabled: bool,
    animations_enabled: bool,
) {
    let h = scene.height;
    let center = to_canvas(h, scene.center);

    // Ring guides first (behind everything else)
    for (ring_idx, radius) in scene.rings.iter().enumerate() {
        let fade = (1.0 - ring_idx as f32 * 0.15).max(0.4);
        let color = Color::Rgb(
            (RING_RGB.0 * fade) as u8,
            (RING_RGB.1 * fade) as u8,
            (RING_RGB.2 * fade) as u8,
        );
        let points = ring_points(center, *radius, scene.width, scene.height);
        ctx.draw(&Points {
            coords: &points,
            color,
        });
    }

    for edge in &scene.edges {
        let (x1, y1) = to_canvas(h, edge.from);
        let (x2, y2) = to_canvas(h, edge.to);
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: if edge.highlighted { GLACIER_BLUE } else { SLATE_GREY },
        });
    }

    if animations_enabled {
        for dot in &scene.particles {
            let (x, y) = to_canvas(h, (dot.x, dot.y));
            if dot.size >= LARGE_PARTICLE_SIZE {
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: dot.size / 2.0,
                    color: dot.color,
                });
            } else {
                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color: dot.color,
                });
            }
        }
    }

    // Particles and lines above; nodes and text on a fresh layer
    ctx.layer();

    for node in &scene.nodes {
        let (x, y) = to_canvas(h, (node.x, node.y));
        let color = if node.selected || node.hovered {
            GLACIER_BLUE
        } else {
            node.color
        };
        ctx.draw(&Circle {
            x,
            y,
            radius: node.radius,
            color,
        });
        if node.is_hub {
            ctx.draw(&Circle {
                x,
                y,
                radius: node.radius + 2.0,
                color: AVAX_RED,
            });
        }

        if labels_enabled || node.selected || node.hovered {
            let mut style = Style::default().fg(if node.selected { GLACIER_BLUE } else { SNOW_WHITE });
            if node.selected || node.is_hub {
                style = style.add_modifier(Modifier::BOLD);
            }
            ctx.print(
                x + node.radius + BRAILLE_DOTS_X,
                y,
                Span::styled(node.label.clone(), style),
            );
        }
    }

    if scene.nodes.len() == 1 {
        ctx.print(
            center.0,
            center.1 - BRAILLE_DOTS_Y * 2.0,
            Span::styled("single chain, no satellites", Style::default().fg(AMBER)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_canvas_flips_y() {
        assert_eq!(to_canvas(100.0, (10.0, 0.0)), (10.0, 100.0));
        assert_eq!(to_canvas(100.0, (10.0, 100.0)), (10.0, 0.0));
        assert_eq!(to_canvas(100.0, (50.0, 50.0)), (50.0, 50.0));
    }

    #[test]
    fn test_ring_points_inside_canvas() {
        let points = ring_points((50.0, 50.0), 20.0, 100.0, 100.0);
        assert_eq!(points.len(), 36);

        // Ring poking out of a narrow canvas loses its outer dots
        let clipped = ring_points((20.0, 50.0), 30.0, 40.0, 100.0);
        assert!(clipped.len() < 36);
        assert!(clipped.iter().all(|(x, _)| *x >= 0.0 && *x <= 40.0));
    }

    #[test]
    fn test_overlay_message() {
        assert!(overlay_message(&LoadState::Loading, false).is_some());
        assert!(overlay_message(&LoadState::Loading, true).is_none());
        assert!(overlay_message(&LoadState::Ready, true).is_none());
        assert!(overlay_message(&LoadState::Ready, false).is_some());

        let (message, color) = overlay_message(
            &LoadState::Failed {
                message: "timeout".to_string(),
            },
            false,
        )
        .unwrap();
        assert!(message.contains("timeout"));
        assert!(message.contains("r to retry"));
        assert_eq!(color, AVAX_RED);
    }

    #[test]
    fn test_viewport_for_uses_braille_resolution() {
        assert_eq!(viewport_for(Rect::new(0, 0, 50, 20)), (100.0, 80.0));
        assert_eq!(viewport_for(Rect::new(0, 0, 0, 0)), (0.0, 0.0));
    }
}
