use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_POOL_CAPACITY, EVENT_QUEUE_LIMIT, POOL_RETURN_DELAY_SECS, SKILL_CHECK_INTERVAL_SECS,
};
use crate::content::{ContentRegistry, ContentRegistryBuilder};
use crate::error::ConfigError;
use crate::spawner::SpawnerConfig;

/// Which side of the network this simulation runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRole {
    /// Authoritative: applies damage, spawns, pays rewards
    #[default]
    Server,
    /// Mirrors state; every mutating request is rejected
    Replica,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world_seed: u64,
    pub tick_rate: u32,
    pub role: NetRole,
    pub pool_capacity: usize,
    pub pool_prewarm: usize,
    pub return_delay_secs: f32,
    pub skill_check_interval_secs: f32,
    /// Cap on each undrained event queue (deaths, skill activations)
    pub event_queue_limit: usize,
    pub spawner: SpawnerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_seed: 42,
            tick_rate: 20,
            role: NetRole::Server,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            pool_prewarm: 0,
            return_delay_secs: POOL_RETURN_DELAY_SECS,
            skill_check_interval_secs: SKILL_CHECK_INTERVAL_SECS,
            event_queue_limit: EVENT_QUEUE_LIMIT,
            spawner: SpawnerConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::NonPositive {
                name: "tick_rate",
                value: 0.0,
            });
        }
        if !(self.skill_check_interval_secs.is_finite() && self.skill_check_interval_secs > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "skill_check_interval_secs",
                value: self.skill_check_interval_secs,
            });
        }
        if !(self.return_delay_secs.is_finite() && self.return_delay_secs >= 0.0) {
            return Err(ConfigError::Negative {
                name: "return_delay_secs",
                value: self.return_delay_secs,
            });
        }
        if self.event_queue_limit == 0 {
            return Err(ConfigError::NonPositive {
                name: "event_queue_limit",
                value: 0.0,
            });
        }
        if self.pool_capacity < self.spawner.max_concurrent {
            return Err(ConfigError::CapacityBelowConcurrency {
                capacity: self.pool_capacity,
                max_concurrent: self.spawner.max_concurrent,
            });
        }
        self.spawner.validate()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registry builder whose grade bounds match the spawner's distribution
    pub fn registry_builder(&self) -> ContentRegistryBuilder {
        ContentRegistry::builder().with_grade_bounds(self.spawner.grade.min, self.spawner.grade.max)
    }

    /// Seconds per fixed simulation step
    pub fn tick_interval_secs(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
