// Theme module - Color constants and theme re-exports
//
// This module provides the color palette for the topology dashboard.
// Node colors grade from a cold slate (idle chain) to Avalanche red
// (busiest chain); particles use a separate bright palette so they stay
// visible on top of edges.

pub mod default;

use ratatui::style::Color;

/// Primary accent color - borders, titles, the hub node
/// RGB: (232, 65, 66)
pub const AVAX_RED: Color = Color::Rgb(232, 65, 66);

/// Secondary accent - selection highlight, refresh indicators
/// RGB: (125, 207, 255)
pub const GLACIER_BLUE: Color = Color::Rgb(125, 207, 255);

/// Healthy/fresh indicator
/// RGB: (115, 218, 202)
pub const ICE_TEAL: Color = Color::Rgb(115, 218, 202);

/// Warning indicator - stale data, slow frames
/// RGB: (255, 184, 108)
pub const AMBER: Color = Color::Rgb(255, 184, 108);

/// General text
/// RGB: (220, 224, 232)
pub const SNOW_WHITE: Color = Color::Rgb(220, 224, 232);

/// Idle nodes, edges, secondary text
/// RGB: (110, 118, 140)
pub const SLATE_GREY: Color = Color::Rgb(110, 118, 140);

/// Endpoints of the node activity gradient
pub const IDLE_RGB: (u8, u8, u8) = (110, 118, 140);
pub const BUSY_RGB: (u8, u8, u8) = (232, 65, 66);

/// Colors a particle can be spawned with
pub const PARTICLE_PALETTE: [Color; 4] = [
    Color::Rgb(255, 255, 255),
    Color::Rgb(125, 207, 255),
    Color::Rgb(255, 120, 120),
    Color::Rgb(115, 218, 202),
];

// Re-export theme functions for convenient access
pub use default::*;
