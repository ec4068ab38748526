//! Spawn director: a rate-limited, gated polling loop.
//!
//! The director only decides *what* to spawn and *where*. Acquiring a pool
//! slot and generating the monster is the simulation's job.

use bevy::math::Vec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{DEFAULT_MAX_CONCURRENT, DEFAULT_SPAWN_INTERVAL_SECS};
use crate::content::{ContentRegistry, VariantId};
use crate::error::ConfigError;
use crate::stats::GradeDistribution;

/// Spawner configuration surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub floor: u32,
    pub max_concurrent: usize,
    pub spawn_interval_secs: f32,
    pub grade: GradeDistribution,
    /// World positions to spawn at; the origin when empty
    pub spawn_points: Vec<[f32; 3]>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            floor: 1,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            spawn_interval_secs: DEFAULT_SPAWN_INTERVAL_SECS,
            grade: GradeDistribution::default(),
            spawn_points: Vec::new(),
        }
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spawn_interval_secs.is_finite() && self.spawn_interval_secs > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "spawn_interval_secs",
                value: self.spawn_interval_secs,
            });
        }
        self.grade.validate()
    }
}

/// Predicate that can hold spawning, e.g. while no players are on the floor
pub trait SpawnGate: Send + Sync {
    fn allows(&self, floor: u32) -> bool;
}

impl<F> SpawnGate for F
where
    F: Fn(u32) -> bool + Send + Sync,
{
    fn allows(&self, floor: u32) -> bool {
        self(floor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub variant: VariantId,
    pub floor: u32,
    pub position: Vec3,
}

/// Output of one director tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnTick {
    pub requests: Vec<SpawnRequest>,
    /// Elapsed intervals that could not spawn (gated, full or nothing eligible)
    pub skipped: u32,
}

pub struct SpawnDirector {
    config: SpawnerConfig,
    accumulator: f32,
    paused: bool,
    gate: Option<Box<dyn SpawnGate>>,
}

impl std::fmt::Debug for SpawnDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnDirector")
            .field("config", &self.config)
            .field("accumulator", &self.accumulator)
            .field("paused", &self.paused)
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl SpawnDirector {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            paused: false,
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: impl SpawnGate + 'static) -> Self {
        self.gate = Some(Box::new(gate));
        self
    }

    pub fn set_gate(&mut self, gate: Option<Box<dyn SpawnGate>>) {
        self.gate = gate;
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Stop accumulating; the current accumulator is kept for `resume`
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by `dt` seconds with `alive` monsters currently on the floor.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        alive: usize,
        registry: &ContentRegistry,
        rng: &mut R,
    ) -> SpawnTick {
        let mut out = SpawnTick::default();
        if self.paused || !(dt.is_finite() && dt > 0.0) {
            return out;
        }

        let interval = self.config.spawn_interval_secs;
        self.accumulator += dt;

        let gated = self
            .gate
            .as_ref()
            .is_some_and(|g| !g.allows(self.config.floor));
        if gated {
            self.hold(interval, &mut out);
            trace!(floor = self.config.floor, "Spawning gated");
            return out;
        }

        let candidates = registry.variants_for_floor(self.config.floor);
        let weights = WeightedIndex::new(candidates.iter().map(|v| v.spawn_weight)).ok();

        let mut alive = alive;
        while self.accumulator >= interval {
            let Some(weights) = weights.as_ref() else {
                self.hold(interval, &mut out);
                break;
            };
            if alive >= self.config.max_concurrent {
                self.hold(interval, &mut out);
                break;
            }
            self.accumulator -= interval;
            let variant = &candidates[weights.sample(rng)];
            out.requests.push(SpawnRequest {
                variant: variant.id.clone(),
                floor: self.config.floor,
                position: self.pick_position(rng),
            });
            alive += 1;
        }
        out
    }

    // Blocked: keep at most one interval banked so resuming spawns one, not a burst.
    fn hold(&mut self, interval: f32, out: &mut SpawnTick) {
        if self.accumulator >= interval {
            out.skipped += 1;
        }
        self.accumulator = self.accumulator.min(interval);
    }

    fn pick_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.config
            .spawn_points
            .choose(rng)
            .map(|p| Vec3::from_array(*p))
            .unwrap_or(Vec3::ZERO)
    }
}
