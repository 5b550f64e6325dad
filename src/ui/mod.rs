// UI rendering module
//
// This module contains all UI rendering components for the topology view.
// The main draw() function orchestrates rendering of all UI panels.

mod banner;
mod chains;
mod inspector;
mod status_bar;
mod topology;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use banner::render_banner;
use chains::render_chain_list;
use inspector::render_inspector;
use status_bar::render_status_bar;
use topology::render_topology;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let size = f.area();

    // Main layout: banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Banner
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    // Banner
    render_banner(f, chunks[0], app);

    // Body: topology canvas + right panels
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Topology
            Constraint::Percentage(35), // Right panels
        ])
        .split(chunks[1]);

    render_topology(f, body_chunks[0], app);

    // Right side: chain list + detail
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Chain list
            Constraint::Percentage(45), // Inspector
        ])
        .split(body_chunks[1]);

    render_chain_list(f, right_chunks[0], app);
    render_inspector(f, right_chunks[1], app);

    // Status bar
    render_status_bar(f, chunks[2], app);
}
