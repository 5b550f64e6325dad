// Particle ("bullet") animation
//
// Particles travel along hub <-> satellite edges to suggest cross-chain
// message traffic. ParticleSystem is the per-frame state transition;
// AnimationLoop drives it from scheduler frames and owns the frame clock.

use super::Topology;
use crate::random::RandomSource;
use crate::scheduler::{FrameId, Scheduler};
use crate::theme::PARTICLE_PALETTE;
use ratatui::style::Color;
use std::time::Instant;

/// Maximum concurrently active particles
pub const MAX_PARTICLES: usize = 25;

/// Chance of a spawn attempt succeeding on a frame with spare capacity
///
/// The max-count cap is what actually limits the rate; this only adds a
/// little irregularity.
pub const SPAWN_PROBABILITY: f64 = 0.94;

/// Frames longer than this are treated as a clock reset (tab/terminal was
/// suspended) instead of advancing physics
pub const MAX_FRAME_DT_MS: f64 = 100.0;

/// Progress per millisecond per unit of speed
pub const SPEED_SCALE: f64 = 0.0006;

/// Satellites covered by one manual burst (two particles each)
pub const BURST_SATELLITES: usize = 8;

/// Travel direction along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Hub to satellite
    Outbound,
    /// Satellite to hub
    Inbound,
}

/// A particle in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub source: String,
    pub destination: String,
    /// Fraction of the edge travelled, `[0, 1)` while alive
    pub progress: f64,
    pub speed: f64,
    pub size: f64,
    pub color: Color,
    pub direction: Direction,
}

/// Tunables for spawning and stepping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    pub max_particles: usize,
    pub spawn_probability: f64,
    pub max_frame_dt_ms: f64,
    pub speed_scale: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub burst_satellites: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            spawn_probability: SPAWN_PROBABILITY,
            max_frame_dt_ms: MAX_FRAME_DT_MS,
            speed_scale: SPEED_SCALE,
            min_speed: 0.6,
            max_speed: 1.4,
            min_size: 1.0,
            max_size: 2.5,
            burst_satellites: BURST_SATELLITES,
        }
    }
}

/// What a single step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Frame was ignored by the large-dt guard
    pub skipped: bool,
    pub completed: usize,
    pub spawned: usize,
}

impl StepOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Active particles plus the id counter
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    next_id: u64,
    config: ParticleConfig,
    /// Halve the cap while frames are slow
    reduced: bool,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 1,
            config,
            reduced: false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Current particle cap, never above `config.max_particles`
    pub fn capacity(&self) -> usize {
        if self.reduced {
            (self.config.max_particles / 2).max(1)
        } else {
            self.config.max_particles
        }
    }

    /// Switch the reduced cap on or off, dropping the oldest overflow
    pub fn set_reduced(&mut self, reduced: bool) {
        self.reduced = reduced;
        let cap = self.capacity();
        if self.particles.len() > cap {
            let overflow = self.particles.len() - cap;
            self.particles.drain(..overflow);
        }
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance all particles by `dt_ms` and maybe spawn one
    ///
    /// A `dt_ms` above `max_frame_dt_ms`, negative, or non-finite skips
    /// the frame entirely.
    pub fn step(
        &mut self,
        dt_ms: f64,
        topology: &Topology,
        rng: &mut dyn RandomSource,
    ) -> StepOutcome {
        if !dt_ms.is_finite() || dt_ms < 0.0 || dt_ms > self.config.max_frame_dt_ms {
            return StepOutcome::skipped();
        }

        let delta = dt_ms * self.config.speed_scale;
        for particle in &mut self.particles {
            particle.progress += particle.speed * delta;
        }

        let before = self.particles.len();
        self.particles.retain(|p| p.progress < 1.0);
        let completed = before - self.particles.len();

        let mut spawned = 0;
        if self.particles.len() < self.capacity() && rng.chance(self.config.spawn_probability) {
            if let Some(particle) = self.spawn_random(topology, rng) {
                self.particles.push(particle);
                spawned = 1;
            }
        }

        StepOutcome {
            skipped: false,
            completed,
            spawned,
        }
    }

    /// Inject outbound and inbound particles for the first
    /// `burst_satellites` satellites, bypassing the spawn probability
    ///
    /// Stops early at the particle cap. Returns how many were created.
    pub fn burst(&mut self, topology: &Topology, rng: &mut dyn RandomSource) -> usize {
        let Some(hub) = topology.layout.hub() else {
            return 0;
        };

        let mut created = 0;
        'satellites: for satellite in topology
            .satellites()
            .iter()
            .take(self.config.burst_satellites)
        {
            for direction in [Direction::Outbound, Direction::Inbound] {
                if self.particles.len() >= self.capacity() {
                    break 'satellites;
                }
                let particle = self.make_particle(hub, satellite, direction, rng);
                self.particles.push(particle);
                created += 1;
            }
        }

        if created > 0 {
            tracing::debug!(created, active = self.particles.len(), "Particle burst");
        }
        created
    }

    fn spawn_random(&mut self, topology: &Topology, rng: &mut dyn RandomSource) -> Option<Particle> {
        let hub = topology.layout.hub()?;
        let satellites = topology.satellites();
        if satellites.is_empty() {
            return None;
        }
        let satellite = &satellites[rng.index(satellites.len())];
        let direction = if rng.chance(0.5) {
            Direction::Outbound
        } else {
            Direction::Inbound
        };
        Some(self.make_particle(hub, satellite, direction, rng))
    }

    fn make_particle(
        &mut self,
        hub: &str,
        satellite: &str,
        direction: Direction,
        rng: &mut dyn RandomSource,
    ) -> Particle {
        let (source, destination) = match direction {
            Direction::Outbound => (hub, satellite),
            Direction::Inbound => (satellite, hub),
        };
        let id = self.next_id;
        self.next_id += 1;

        Particle {
            id,
            source: source.to_string(),
            destination: destination.to_string(),
            progress: 0.0,
            speed: rng.range_f64(self.config.min_speed, self.config.max_speed),
            size: rng.range_f64(self.config.min_size, self.config.max_size),
            color: PARTICLE_PALETTE[rng.index(PARTICLE_PALETTE.len())],
            direction,
        }
    }
}

/// Frame-driven wrapper around a ParticleSystem
///
/// Holds at most one pending frame. Frames whose id doesn't match the
/// pending one (cancelled or stale) are ignored.
#[derive(Debug)]
pub struct AnimationLoop {
    system: ParticleSystem,
    pending: Option<FrameId>,
    last_frame: Option<Instant>,
}

impl AnimationLoop {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            system: ParticleSystem::new(config),
            pending: None,
            last_frame: None,
        }
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem {
        &mut self.system
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Request the first frame; no-op if already running
    pub fn start(&mut self, scheduler: &mut dyn Scheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule_frame());
        }
    }

    /// Cancel the pending frame and reset the frame clock
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel_frame(id);
        }
        self.last_frame = None;
    }

    /// Handle a frame wakeup
    ///
    /// Returns None when the frame isn't ours. The first frame after a
    /// start only primes the clock.
    pub fn on_frame(
        &mut self,
        id: FrameId,
        at: Instant,
        topology: &Topology,
        rng: &mut dyn RandomSource,
        scheduler: &mut dyn Scheduler,
    ) -> Option<StepOutcome> {
        if self.pending != Some(id) {
            return None;
        }

        let outcome = match self.last_frame {
            Some(prev) => {
                let dt_ms = at.saturating_duration_since(prev).as_secs_f64() * 1000.0;
                let outcome = self.system.step(dt_ms, topology, rng);
                if outcome.skipped {
                    tracing::debug!(dt_ms, "Skipped long animation frame");
                }
                outcome
            }
            None => StepOutcome::skipped(),
        };

        self.last_frame = Some(at);
        self.pending = Some(scheduler.schedule_frame());
        Some(outcome)
    }
}
