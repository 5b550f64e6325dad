// Theme functions
//
// Color helpers shared by the render layer and the panels.

use ratatui::style::Color;

use super::{AMBER, AVAX_RED, BUSY_RGB, GLACIER_BLUE, ICE_TEAL, IDLE_RGB, SLATE_GREY};
use crate::app::LoadState;

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
///
/// # Returns
/// Interpolated Color::Rgb value
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Node color for an activity ratio (activity / max activity)
///
/// Zero or malformed ratios give the neutral idle color.
pub fn activity_color(ratio: f64) -> Color {
    interpolate_color(IDLE_RGB, BUSY_RGB, ratio as f32)
}

/// Accent color for the data load state shown in banner and status bar
pub fn load_state_color(state: &LoadState) -> Color {
    match state {
        LoadState::Loading => GLACIER_BLUE,
        LoadState::Ready => ICE_TEAL,
        LoadState::Stale { .. } => AMBER,
        LoadState::Failed { .. } => AVAX_RED,
        LoadState::Stopped => SLATE_GREY,
    }
}
