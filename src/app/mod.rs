// Application state management
//
// This module contains the main AppState struct and re-exports
// configuration types from the config submodule. AppState owns every piece
// of mutable state (topology, particles, poller, scheduler, random source)
// so separate instances never share anything.

pub mod config;
pub mod event;

// Re-export config types for convenience
pub use config::{AppConfig, DisplaySettings, InputMode, SortMode};
pub use crate::poller::LoadState;

use crate::api::{ChainInfo, MetricsSource, NetworkTps};
use crate::poller::{PollEvent, Poller};
use crate::random::RandomSource;
use crate::scheduler::{Scheduler, Wake};
use crate::topology::{
    build_scene, compute_positions, nodes_from_chains, sanitize_activity, AnimationLoop, Scene,
    Selection, Topology,
};
use config::{FRAME_TIME_THRESHOLD_MS, MAX_FILTER_LEN, SLOW_FRAME_COUNT_THRESHOLD};
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Static configuration
    pub config: AppConfig,

    /// Display toggles (animations, labels)
    pub settings: DisplaySettings,

    /// Chain list ordering
    pub sort_mode: SortMode,

    /// Where key presses go
    pub input_mode: InputMode,

    /// Case-insensitive chain-name filter
    pub filter: String,

    /// List state for the chain list (enables scrolling)
    pub chain_list_state: ListState,

    /// Hovered (list cursor) and selected (detail view) chain
    pub selection: Selection,

    /// Raw chain list from the last successful fetch
    chains: Vec<ChainInfo>,

    /// Aggregate network figures from the last successful fetch
    network: NetworkTps,

    /// Nodes and their layout; replaced as one value
    topology: Topology,

    /// Canvas size the layout was computed for
    viewport: (f64, f64),

    poller: Poller,
    animation: AnimationLoop,
    scheduler: Box<dyn Scheduler>,
    rng: Box<dyn RandomSource>,

    /// Set once teardown() ran; no further state changes happen
    torn_down: bool,

    /// Frame time tracking for performance monitoring
    last_frame_time: Instant,

    /// Counter for consecutive slow frames (frame time > 100ms)
    slow_frame_count: u32,

    /// Whether the particle cap has been auto-reduced due to slow frames
    pub animation_reduced: bool,
}

impl AppState {
    /// Create a new AppState; call `mount()` to start polling and animating
    pub fn new(
        config: AppConfig,
        source: Arc<dyn MetricsSource>,
        scheduler: Box<dyn Scheduler>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let poller = Poller::new(source, config.refresh.refresh_every);
        let animation = AnimationLoop::new(config.particles);

        Self {
            running: true,
            settings: DisplaySettings::default(),
            sort_mode: SortMode::default(),
            input_mode: InputMode::default(),
            filter: String::new(),
            chain_list_state: ListState::default(),
            selection: Selection::default(),
            chains: Vec::new(),
            network: NetworkTps::default(),
            topology: Topology::default(),
            viewport: (0.0, 0.0),
            poller,
            animation,
            scheduler,
            rng,
            torn_down: false,
            last_frame_time: Instant::now(),
            slow_frame_count: 0,
            animation_reduced: false,
            config,
        }
    }

    /// Start polling and the animation loop
    pub fn mount(&mut self) {
        if self.torn_down {
            return;
        }
        self.poller.mount(self.scheduler.as_mut());
        if self.settings.animations_enabled {
            self.animation.start(self.scheduler.as_mut());
        }
    }

    /// Stop the animation loop and polling; late results are discarded
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.animation.stop(self.scheduler.as_mut());
        self.poller.teardown(self.scheduler.as_mut());
        self.torn_down = true;
        tracing::info!("Topology view torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Run everything that came due: fetch results, frames, interval ticks
    pub fn on_tick(&mut self) {
        if self.torn_down {
            return;
        }

        for event in self.poller.drain() {
            self.apply_poll_event(event);
        }

        for wake in self.scheduler.poll() {
            match wake {
                Wake::Frame { id, at } => {
                    self.animation.on_frame(
                        id,
                        at,
                        &self.topology,
                        self.rng.as_mut(),
                        self.scheduler.as_mut(),
                    );
                }
                Wake::Interval { id, .. } => {
                    if self.poller.on_interval(id) {
                        tracing::debug!("Scheduled metrics refresh started");
                    }
                }
            }
        }
    }

    /// Block up to `timeout` for a fetch result and apply it
    ///
    /// Returns whether anything was applied.
    pub fn wait_for_poll(&mut self, timeout: Duration) -> bool {
        if self.torn_down {
            return false;
        }
        match self.poller.wait(timeout) {
            Some(event) => {
                self.apply_poll_event(event);
                true
            }
            None => false,
        }
    }

    fn apply_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Updated(snapshot) => {
                self.chains = snapshot.chains;
                self.network = snapshot.network;
                self.rebuild_topology();
                self.reconcile_selection();
            }
            // Poller already recorded the state; the previous data stays
            PollEvent::LoadFailed(_) | PollEvent::RefreshFailed(_) => {}
        }
    }

    /// Replace nodes wholesale from the current chain list and re-layout
    fn rebuild_topology(&mut self) {
        let nodes = nodes_from_chains(&self.chains);
        let (width, height) = self.viewport;
        self.topology = Topology::build(nodes, width, height, &self.config.layout, self.rng.as_mut());
        tracing::debug!(
            nodes = self.topology.nodes.len(),
            rings = self.topology.layout.ring_count(),
            hub = self.topology.layout.hub().unwrap_or("-"),
            "Topology rebuilt"
        );
    }

    /// Report the canvas size; re-layouts when it changed
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let (w, h) = self.viewport;
        if (w - width).abs() < 0.5 && (h - height).abs() < 0.5 {
            return;
        }
        self.viewport = (width, height);
        self.topology.layout = compute_positions(
            &self.topology.nodes,
            width,
            height,
            &self.config.layout,
            self.rng.as_mut(),
        );
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn load_state(&self) -> &LoadState {
        self.poller.state()
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn chains(&self) -> &[ChainInfo] {
        &self.chains
    }

    pub fn chain(&self, id: &str) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.chain_id == id)
    }

    /// Network TPS from the API, falling back to the sum over chains
    pub fn total_tps(&self) -> f64 {
        match self.network.total_tps {
            Some(tps) if tps.is_finite() && tps >= 0.0 => tps,
            _ => self
                .chains
                .iter()
                .map(|c| sanitize_activity(c.tps_value()))
                .sum(),
        }
    }

    /// Chain count from the API, falling back to the list length
    pub fn chain_count(&self) -> u64 {
        self.network
            .chain_count
            .unwrap_or(self.chains.len() as u64)
    }

    /// Drawable primitives for the topology canvas
    pub fn scene(&self) -> Scene {
        build_scene(
            &self.topology.nodes,
            &self.topology.layout,
            self.animation.system().particles(),
            &self.selection,
        )
    }

    // ------------------------------------------------------------------
    // Chain list
    // ------------------------------------------------------------------

    /// Chains after filtering and sorting, as shown in the list
    pub fn visible_chains(&self) -> Vec<&ChainInfo> {
        let needle = self.filter.to_lowercase();
        let mut visible: Vec<&ChainInfo> = self
            .chains
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || c.display_name().to_lowercase().contains(&needle)
                    || c.chain_id.to_lowercase().contains(&needle)
            })
            .collect();

        match self.sort_mode {
            SortMode::Activity => visible.sort_by(|a, b| {
                sanitize_activity(b.tps_value()).total_cmp(&sanitize_activity(a.tps_value()))
            }),
            SortMode::Name => visible.sort_by(|a, b| {
                a.display_name()
                    .to_lowercase()
                    .cmp(&b.display_name().to_lowercase())
            }),
        }
        visible
    }

    /// Move list cursor up (decrease index)
    pub fn select_previous_chain(&mut self) {
        let len = self.visible_chains().len();
        if len == 0 {
            self.set_cursor(None);
            return;
        }
        let idx = match self.chain_list_state.selected() {
            None => len - 1,
            Some(idx) => idx.min(len - 1).saturating_sub(1),
        };
        self.set_cursor(Some(idx));
    }

    /// Move list cursor down (increase index)
    pub fn select_next_chain(&mut self) {
        let len = self.visible_chains().len();
        if len == 0 {
            self.set_cursor(None);
            return;
        }
        let idx = match self.chain_list_state.selected() {
            None => 0,
            Some(idx) => (idx + 1).min(len - 1),
        };
        self.set_cursor(Some(idx));
    }

    fn set_cursor(&mut self, idx: Option<usize>) {
        self.chain_list_state.select(idx);
        self.selection.hovered = idx.and_then(|i| {
            self.visible_chains()
                .get(i)
                .map(|c| c.chain_id.clone())
        });
    }

    /// Open the detail view for the chain under the cursor
    pub fn open_selected_chain(&mut self) -> Option<String> {
        let id = self.selection.hovered.clone()?;
        tracing::debug!(chain_id = %id, "Opening chain detail");
        self.selection.selected = Some(id.clone());
        Some(id)
    }

    /// Close the detail view; returns whether one was open
    pub fn close_detail(&mut self) -> bool {
        self.selection.selected.take().is_some()
    }

    /// Re-point the cursor after the list changed; drop vanished chains
    fn reconcile_selection(&mut self) {
        if let Some(id) = &self.selection.selected {
            if self.chain(id).is_none() {
                self.selection.selected = None;
            }
        }

        let idx = self.selection.hovered.as_deref().and_then(|id| {
            self.visible_chains()
                .iter()
                .position(|c| c.chain_id == id)
        });
        self.set_cursor(idx);
    }

    pub fn cycle_sort(&mut self) {
        self.sort_mode = self.sort_mode.next();
        self.reconcile_selection();
    }

    pub fn begin_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    /// Leave filter mode, keeping the filter text
    pub fn end_filter(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Leave filter mode and clear the filter
    pub fn cancel_filter(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter.clear();
        self.reconcile_selection();
    }

    pub fn push_filter_char(&mut self, c: char) {
        if c.is_control() || self.filter.chars().count() >= MAX_FILTER_LEN {
            return;
        }
        self.filter.push(c);
        self.reconcile_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.reconcile_selection();
    }

    // ------------------------------------------------------------------
    // Animation controls
    // ------------------------------------------------------------------

    /// Inject a burst of particles; returns how many were created
    pub fn trigger_burst(&mut self) -> usize {
        if self.torn_down || !self.settings.animations_enabled {
            return 0;
        }
        self.animation
            .system_mut()
            .burst(&self.topology, self.rng.as_mut())
    }

    /// Turn particle animation on or off
    pub fn toggle_animations(&mut self) {
        self.settings.animations_enabled = !self.settings.animations_enabled;
        if self.torn_down {
            return;
        }
        if self.settings.animations_enabled {
            self.animation.start(self.scheduler.as_mut());
        } else {
            self.animation.stop(self.scheduler.as_mut());
            self.animation.system_mut().clear();
        }
        // Reset animation reduction when user manually toggles animations
        // This allows the system to try full animation complexity again
        self.reset_animation_reduction();
    }

    pub fn toggle_labels(&mut self) {
        self.settings.labels_enabled = !self.settings.labels_enabled;
    }

    /// Retry a failed load, or refresh now
    pub fn retry(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let started = self.poller.retry();
        if started {
            tracing::info!("Manual metrics refresh requested");
        }
        started
    }

    /// Update frame time tracking and auto-reduce animation complexity if needed
    ///
    /// This method should be called at the start of each frame render.
    /// If frame time consistently exceeds FRAME_TIME_THRESHOLD_MS (100ms),
    /// the particle cap is halved until animations are toggled.
    pub fn update_frame_time(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_millis();
        self.last_frame_time = now;
        self.record_frame_time(frame_time);
    }

    fn record_frame_time(&mut self, frame_time: u128) {
        if frame_time > FRAME_TIME_THRESHOLD_MS {
            self.slow_frame_count += 1;

            if self.slow_frame_count >= SLOW_FRAME_COUNT_THRESHOLD && !self.animation_reduced {
                self.animation_reduced = true;
                self.animation.system_mut().set_reduced(true);
                tracing::info!(
                    frame_time_ms = frame_time as u64,
                    slow_frame_count = self.slow_frame_count,
                    "Auto-reducing particle count due to slow frame times"
                );
            }
        } else if !self.animation_reduced {
            self.slow_frame_count = 0;
        }
    }

    /// Reset animation complexity reduction
    pub fn reset_animation_reduction(&mut self) {
        self.animation_reduced = false;
        self.slow_frame_count = 0;
        self.animation.system_mut().set_reduced(false);
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.teardown();
    }
}
