use std::collections::VecDeque;
use std::sync::Arc;

use bevy::math::Vec3;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{NetRole, SimulationConfig};
use crate::collaborators::Collaborators;
use crate::combat::{self, AttackKind, AttackRoll, DamageOutcome, DamageType, DodgePolicy, IgnoreReason};
use crate::content::{ContentRegistry, VariantId};
use crate::death::{run_death_sequence, DeathContext, DeathReport};
use crate::error::{ConfigError, SpawnError};
use crate::ledger::AttackerId;
use crate::monster::{self, AiView, LifecyclePhase, MonsterEntity, MonsterHandle};
use crate::pool::EntityPool;
use crate::scheduler::{DueTimer, TimerAction, TimerQueue};
use crate::skills::{run_skill_check, SkillActivation};
use crate::spawner::SpawnDirector;

/// Running counters for dashboards and soak runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub spawns: u64,
    pub kills: u64,
    pub evictions: u64,
    pub skipped_spawns: u64,
    pub rewards_granted: u64,
    pub rewards_rejected: u64,
    pub drops_emitted: u64,
    pub stale_timers: u64,
    pub returned_to_pool: u64,
    pub skill_activations: u64,
    /// Deaths or activations dropped because nobody drained the queues
    pub dropped_events: u64,
}

enum GradeChoice {
    Rolled,
    Fixed(f32),
}

/// The single authority that owns every monster on one floor.
///
/// Deaths and skill activations queue up until drained. `MonsterSimPlugin`
/// drains both every frame; a caller driving `tick` directly must call
/// [`Self::drain_deaths`] and [`Self::drain_skill_activations`] itself.
/// Past `event_queue_limit` the oldest entry is dropped and counted in
/// [`SimulationStats::dropped_events`].
pub struct MonsterSimulation {
    config: SimulationConfig,
    registry: Arc<ContentRegistry>,
    pool: EntityPool,
    timers: TimerQueue,
    director: SpawnDirector,
    rng: Xoshiro256PlusPlus,
    collaborators: Collaborators,
    clock: f64,
    dodge_policy: DodgePolicy,
    stats: SimulationStats,
    activations: VecDeque<SkillActivation>,
    deaths: VecDeque<DeathReport>,
}

impl MonsterSimulation {
    pub fn new(
        config: SimulationConfig,
        registry: Arc<ContentRegistry>,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = registry.grade_bounds();
        let grades = &config.spawner.grade;
        if bounds.min != grades.min || bounds.max != grades.max {
            return Err(ConfigError::GradeRangeMismatch {
                config_min: grades.min,
                config_max: grades.max,
                content_min: bounds.min,
                content_max: bounds.max,
            });
        }
        info!(
            seed = config.world_seed,
            floor = config.spawner.floor,
            capacity = config.pool_capacity,
            role = ?config.role,
            "Monster simulation created"
        );
        Ok(Self {
            pool: EntityPool::with_prewarm(config.pool_capacity, config.pool_prewarm),
            timers: TimerQueue::new(),
            director: SpawnDirector::new(config.spawner.clone()),
            rng: Xoshiro256PlusPlus::seed_from_u64(config.world_seed),
            collaborators,
            clock: 0.0,
            dodge_policy: DodgePolicy::Rolled,
            stats: SimulationStats::default(),
            activations: VecDeque::new(),
            deaths: VecDeque::new(),
            registry,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ContentRegistry> {
        &self.registry
    }

    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn director(&self) -> &SpawnDirector {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut SpawnDirector {
        &mut self.director
    }

    pub fn is_authority(&self) -> bool {
        self.config.role == NetRole::Server
    }

    /// Force every dodge roll (test seam)
    pub fn set_dodge_policy(&mut self, policy: DodgePolicy) {
        self.dodge_policy = policy;
    }

    /// Restart the RNG stream from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    }

    // =====================================================
    // Spawning
    // =====================================================

    /// Spawn `variant` on the configured floor with a rolled grade
    pub fn spawn(&mut self, variant: &VariantId, position: Vec3) -> Result<MonsterHandle, SpawnError> {
        let floor = self.config.spawner.floor;
        self.spawn_with(variant, floor, position, GradeChoice::Rolled)
    }

    /// Spawn with a fixed grade (clamped to the configured distribution bounds)
    pub fn spawn_at_grade(
        &mut self,
        variant: &VariantId,
        position: Vec3,
        grade: f32,
    ) -> Result<MonsterHandle, SpawnError> {
        let floor = self.config.spawner.floor;
        self.spawn_with(variant, floor, position, GradeChoice::Fixed(grade))
    }

    fn spawn_with(
        &mut self,
        variant_id: &VariantId,
        floor: u32,
        position: Vec3,
        grade: GradeChoice,
    ) -> Result<MonsterHandle, SpawnError> {
        if !self.is_authority() {
            return Err(SpawnError::NotAuthority);
        }
        let variant = self
            .registry
            .variant(variant_id)
            .cloned()
            .ok_or_else(|| SpawnError::UnknownVariant(variant_id.clone()))?;
        if !variant.floors.contains(floor) {
            return Err(SpawnError::WrongFloor {
                variant: variant_id.clone(),
                floor,
            });
        }

        let acquired = self.pool.acquire(&mut self.timers)?;
        if acquired.evicted.is_some() {
            self.stats.evictions += 1;
        }
        let handle = acquired.handle;

        let distribution = self.config.spawner.grade;
        let generated = match grade {
            GradeChoice::Rolled => monster::generate(&mut self.rng, &self.registry, &variant, &distribution),
            GradeChoice::Fixed(g) => {
                let g = g.clamp(distribution.min, distribution.max);
                monster::generate_at_grade(&mut self.rng, &self.registry, &variant, g)
            }
        };
        let generated = match generated {
            Ok(generated) => generated,
            Err(err) => {
                self.pool.release(handle, &mut self.timers);
                return Err(err);
            }
        };

        let now = self.clock;
        let skill_deadline = now + self.config.skill_check_interval_secs as f64;
        let capacity = self.pool.capacity();
        let Some(entity) = self.pool.get_mut(handle) else {
            return Err(SpawnError::PoolExhausted { capacity });
        };
        let grade = generated.grade;
        entity.activate(generated, floor, position, now);
        entity.skill_timer = Some(self.timers.schedule(skill_deadline, TimerAction::SkillCheck(handle)));

        self.stats.spawns += 1;
        debug!(%handle, variant = %variant_id, grade, "Monster spawned");
        Ok(handle)
    }

    // =====================================================
    // Combat
    // =====================================================

    /// Apply one damage request from `attacker`.
    pub fn apply_damage(
        &mut self,
        target: MonsterHandle,
        amount: f32,
        damage_type: DamageType,
        attacker: Option<AttackerId>,
    ) -> DamageOutcome {
        if !self.is_authority() {
            return DamageOutcome::Ignored(IgnoreReason::NotAuthority);
        }
        let now = self.clock;
        let Some(entity) = self.pool.get_mut(target) else {
            return DamageOutcome::Ignored(IgnoreReason::UnknownTarget);
        };

        let outcome = combat::apply_damage(
            entity,
            amount,
            damage_type,
            attacker,
            self.dodge_policy,
            now,
            &mut self.rng,
        );

        if outcome.is_kill() {
            let ctx = DeathContext {
                timers: &mut self.timers,
                collaborators: &self.collaborators,
                return_delay_secs: self.config.return_delay_secs,
                now,
            };
            if let Some(report) = run_death_sequence(entity, ctx, &mut self.rng) {
                self.stats.kills += 1;
                self.stats.rewards_granted += report.rewarded.len() as u64;
                self.stats.rewards_rejected += report.rejected.len() as u64;
                self.stats.drops_emitted += report.drop_count() as u64;
                let limit = self.config.event_queue_limit;
                if push_capped(&mut self.deaths, report, limit) {
                    note_dropped_event(&mut self.stats, limit);
                }
            }
        }
        outcome
    }

    /// Outgoing hit from `handle`, for the AI collaborator to deliver
    pub fn roll_attack(&mut self, handle: MonsterHandle, kind: AttackKind) -> Option<AttackRoll> {
        let entity = self.pool.get(handle)?;
        entity.roll_attack(kind, &mut self.rng)
    }

    // =====================================================
    // Tick
    // =====================================================

    /// Advance the clock by `dt` seconds: run the spawn director, then fire due timers.
    pub fn tick(&mut self, dt: f32) {
        if !(dt.is_finite() && dt >= 0.0) {
            warn!(dt, "Ignoring invalid tick delta");
            return;
        }
        self.clock += dt as f64;

        if self.is_authority() {
            self.run_director(dt);
        }

        for due in self.timers.pop_due(self.clock) {
            self.fire(due);
        }
    }

    fn run_director(&mut self, dt: f32) {
        let alive = self.pool.alive_count();
        let tick = self.director.tick(dt, alive, &self.registry, &mut self.rng);
        self.stats.skipped_spawns += tick.skipped as u64;
        for request in tick.requests {
            if let Err(err) = self.spawn_with(&request.variant, request.floor, request.position, GradeChoice::Rolled) {
                self.stats.skipped_spawns += 1;
                warn!(variant = %request.variant, error = %err, "Spawn request failed");
            }
        }
    }

    fn fire(&mut self, due: DueTimer) {
        let now = self.clock;
        let interval = self.config.skill_check_interval_secs as f64;
        let handle = due.action.handle();

        let Some(entity) = self.pool.get_mut(handle) else {
            self.stats.stale_timers += 1;
            return;
        };

        match due.action {
            TimerAction::SkillCheck(_) => {
                if entity.skill_timer != Some(due.id) {
                    self.stats.stale_timers += 1;
                    return;
                }
                entity.skill_timer = None;
                let fired = run_skill_check(entity, now);
                self.stats.skill_activations += fired.len() as u64;
                let limit = self.config.event_queue_limit;
                for activation in fired {
                    if push_capped(&mut self.activations, activation, limit) {
                        note_dropped_event(&mut self.stats, limit);
                    }
                }
                if entity.is_alive() && entity.phase == LifecyclePhase::Active {
                    entity.skill_timer =
                        Some(self.timers.schedule(now + interval, TimerAction::SkillCheck(handle)));
                }
            }
            TimerAction::ReturnToPool(_) => {
                if entity.return_timer != Some(due.id) {
                    self.stats.stale_timers += 1;
                    return;
                }
                entity.return_timer = None;
                if self.pool.release(handle, &mut self.timers) {
                    self.stats.returned_to_pool += 1;
                }
            }
        }
    }

    // =====================================================
    // Queries
    // =====================================================

    pub fn monster(&self, handle: MonsterHandle) -> Option<&MonsterEntity> {
        self.pool.get(handle)
    }

    pub fn ai_view(&self, handle: MonsterHandle) -> Option<AiView> {
        self.pool.get(handle).map(MonsterEntity::ai_view)
    }

    /// Handles of monsters that are alive and targetable
    pub fn alive_handles(&self) -> Vec<MonsterHandle> {
        self.pool
            .iter_in_use()
            .filter(|e| e.is_alive() && e.phase() == LifecyclePhase::Active)
            .map(MonsterEntity::handle)
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.pool.alive_count()
    }

    /// Skill activations queued since the last drain, oldest first
    pub fn drain_skill_activations(&mut self) -> Vec<SkillActivation> {
        self.activations.drain(..).collect()
    }

    /// Death reports queued since the last drain, oldest first
    pub fn drain_deaths(&mut self) -> Vec<DeathReport> {
        self.deaths.drain(..).collect()
    }
}

/// Push `item`, dropping the front when `queue` already holds `limit` entries.
/// Returns whether an entry was dropped.
fn push_capped<T>(queue: &mut VecDeque<T>, item: T, limit: usize) -> bool {
    let dropped = queue.len() >= limit && queue.pop_front().is_some();
    queue.push_back(item);
    dropped
}

fn note_dropped_event(stats: &mut SimulationStats, limit: usize) {
    stats.dropped_events += 1;
    if stats.dropped_events == 1 {
        warn!(limit, "Event queue full, dropping oldest; drain_deaths and drain_skill_activations must be called");
    }
}

impl std::fmt::Debug for MonsterSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonsterSimulation")
            .field("clock", &self.clock)
            .field("in_use", &self.pool.in_use_count())
            .field("stats", &self.stats)
            .finish()
    }
}
