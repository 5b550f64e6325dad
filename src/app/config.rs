// Application configuration types
//
// This module contains configuration structs and enums for:
// - Metrics polling
// - UI frame pacing and slow-frame detection
// - Display toggles
// - Chain list sorting and filtering

use crate::topology::{LayoutConfig, ParticleConfig};
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Metrics API used when none is given on the command line
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Chain list refresh interval (15 minutes)
pub const DEFAULT_REFRESH_SECS: u64 = 900;

/// Lower bound for the refresh interval; protects the API from hammering
pub const MIN_REFRESH_SECS: u64 = 5;

/// Default UI frame interval in milliseconds (~30 fps)
pub const DEFAULT_FRAME_MS: u64 = 33;

/// Frame interval bounds in milliseconds
///
/// The upper bound stays below the particle stepper's long-frame guard and
/// the slow-frame threshold, otherwise every frame would be skipped.
pub const MIN_FRAME_MS: u64 = 16;
pub const MAX_FRAME_MS: u64 = 66;

/// How long startup waits for the first snapshot before drawing
pub const STARTUP_GRACE: Duration = Duration::from_millis(750);

/// Frame time threshold for auto-reducing animation complexity (100ms)
/// If frame time consistently exceeds this, the particle cap is halved
pub const FRAME_TIME_THRESHOLD_MS: u128 = 100;

/// Number of consecutive slow frames before triggering complexity reduction
pub const SLOW_FRAME_COUNT_THRESHOLD: u32 = 5;

/// Braille canvas resolution per terminal cell
pub const BRAILLE_DOTS_X: f64 = 2.0;
pub const BRAILLE_DOTS_Y: f64 = 4.0;

/// Longest accepted chain-name filter
pub const MAX_FILTER_LEN: usize = 32;

// ============================================================================
// Enums
// ============================================================================

/// Chain list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Highest TPS first (default)
    #[default]
    Activity,
    /// Alphabetical by display name
    Name,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            Self::Activity => Self::Name,
            Self::Name => Self::Activity,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Activity => "TPS",
            Self::Name => "name",
        }
    }
}

/// Where key presses go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a chain-name filter after '/'
    Filter,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Visual toggles for the topology panel
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    /// Particle animation (toggle with 'a')
    pub animations_enabled: bool,

    /// Chain name labels next to nodes (toggle with 't')
    pub labels_enabled: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            labels_enabled: true,
        }
    }
}

/// Polling and frame pacing
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Chain list / TPS refresh interval
    pub refresh_every: Duration,

    /// UI frame interval in milliseconds
    pub frame_ms: u64,
}

impl RefreshConfig {
    /// Build a config, clamping both values into their allowed ranges
    pub fn new(refresh_secs: u64, frame_ms: u64) -> Self {
        Self {
            refresh_every: Duration::from_secs(refresh_secs.max(MIN_REFRESH_SECS)),
            frame_ms: frame_ms.clamp(MIN_FRAME_MS, MAX_FRAME_MS),
        }
    }

    /// Get UI frame interval as Duration
    pub fn ui_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_SECS, DEFAULT_FRAME_MS)
    }
}

/// Everything the app needs that isn't runtime state
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub refresh: RefreshConfig,
    pub layout: LayoutConfig,
    pub particles: ParticleConfig,
    /// Fixed seed for jitter and spawning; None uses OS entropy
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh: RefreshConfig::default(),
            layout: LayoutConfig::default(),
            particles: ParticleConfig::default(),
            seed: None,
        }
    }
}
