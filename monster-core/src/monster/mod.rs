//! Monster entity: the mutable aggregate one pool slot holds per lifetime.
//!
//! Lifecycle: `Pooled -> Acquiring -> Active -> DeadPendingReturn -> Pooled`.
//! Life state is tracked separately (`Alive -> Dead`, never back within a
//! lifetime) so the resolver can compare-and-set on it.

use std::fmt;
use std::sync::Arc;

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackKind, AttackRoll, CombatStats};
use crate::content::{RaceDefinition, VariantDefinition};
use crate::ledger::ParticipantLedger;
use crate::scheduler::{TimerId, TimerQueue};
use crate::skills::SkillInstance;
use crate::stats::StatBlock;

pub mod ai;
pub mod factory;

pub use ai::AiView;
pub use factory::{generate, generate_at_grade, GeneratedMonster};

/// Pool slot plus the generation it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterHandle {
    pub slot: u32,
    pub generation: u32,
}

impl MonsterHandle {
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

impl fmt::Display for MonsterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monster#{}:{}", self.slot, self.generation)
    }
}

/// Identity of one lifetime, used to key reward claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KillId(pub u64);

impl fmt::Display for KillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kill#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecyclePhase {
    Pooled,
    Acquiring,
    Active,
    DeadPendingReturn,
}

#[derive(Debug, Clone)]
pub struct MonsterEntity {
    pub(crate) handle: MonsterHandle,
    pub(crate) serial: u64,
    pub(crate) phase: LifecyclePhase,
    pub(crate) life: LifeState,
    pub(crate) race: Option<Arc<RaceDefinition>>,
    pub(crate) variant: Option<Arc<VariantDefinition>>,
    pub(crate) floor: u32,
    pub(crate) position: Vec3,
    pub(crate) grade: f32,
    pub(crate) stats: StatBlock,
    pub(crate) skills: Vec<SkillInstance>,
    pub(crate) combat: CombatStats,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) mp: f32,
    pub(crate) max_mp: f32,
    pub(crate) ledger: ParticipantLedger,
    pub(crate) hit_detection: bool,
    pub(crate) ai_enabled: bool,
    pub(crate) skill_timer: Option<TimerId>,
    pub(crate) return_timer: Option<TimerId>,
    pub(crate) spawned_at: f64,
    pub(crate) died_at: Option<f64>,
}

impl MonsterEntity {
    /// Empty instance parked in `slot`
    pub fn pooled(slot: u32) -> Self {
        Self {
            handle: MonsterHandle::new(slot, 0),
            serial: 0,
            phase: LifecyclePhase::Pooled,
            // sentinel: a pooled instance is not a living target
            life: LifeState::Dead,
            race: None,
            variant: None,
            floor: 0,
            position: Vec3::ZERO,
            grade: 0.0,
            stats: StatBlock::ZERO,
            skills: Vec::new(),
            combat: CombatStats::default(),
            hp: 0.0,
            max_hp: 0.0,
            mp: 0.0,
            max_mp: 0.0,
            ledger: ParticipantLedger::new(),
            hit_detection: false,
            ai_enabled: false,
            skill_timer: None,
            return_timer: None,
            spawned_at: 0.0,
            died_at: None,
        }
    }

    /// Wipe every trace of the previous lifetime and cancel its timers.
    ///
    /// Keeps the handle; the pool bumps the generation on the next acquire.
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        for id in [self.skill_timer.take(), self.return_timer.take()]
            .into_iter()
            .flatten()
        {
            timers.cancel(id);
        }
        let handle = self.handle;
        let serial = self.serial;
        let mut skills = std::mem::take(&mut self.skills);
        skills.clear();
        *self = Self::pooled(handle.slot);
        self.handle = handle;
        self.serial = serial;
        // keep the allocation for the next lifetime
        self.skills = skills;
    }

    /// Start a new lifetime: new generation and serial, phase `Acquiring`
    pub(crate) fn begin_acquire(&mut self, serial: u64) -> MonsterHandle {
        self.handle.generation = self.handle.generation.wrapping_add(1);
        self.serial = serial;
        self.phase = LifecyclePhase::Acquiring;
        self.handle
    }

    /// Move a freshly generated monster into this slot and make it targetable
    pub fn activate(&mut self, generated: GeneratedMonster, floor: u32, position: Vec3, now: f64) {
        let GeneratedMonster {
            race,
            variant,
            grade,
            stats,
            skills,
            combat,
        } = generated;
        self.race = Some(race);
        self.variant = Some(variant);
        self.floor = floor;
        self.position = position;
        self.grade = grade;
        self.stats = stats;
        self.skills.clear();
        self.skills.extend(skills);
        self.max_hp = combat.max_hp;
        self.hp = combat.max_hp;
        self.max_mp = combat.max_mp;
        self.mp = combat.max_mp;
        self.combat = combat;
        self.ledger.clear();
        self.life = LifeState::Alive;
        self.phase = LifecyclePhase::Active;
        self.hit_detection = true;
        self.ai_enabled = true;
        self.spawned_at = now;
        self.died_at = None;
    }

    /// `Alive -> Dead`. Returns `true` only for the call that flips the state.
    pub fn mark_dead(&mut self, now: f64) -> bool {
        if self.life != LifeState::Alive {
            return false;
        }
        self.life = LifeState::Dead;
        self.hit_detection = false;
        self.ai_enabled = false;
        self.died_at = Some(now);
        true
    }

    pub fn handle(&self) -> MonsterHandle {
        self.handle
    }

    pub fn kill_id(&self) -> KillId {
        KillId(self.serial)
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn life_state(&self) -> LifeState {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn is_targetable(&self) -> bool {
        self.hit_detection
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn race(&self) -> Option<&Arc<RaceDefinition>> {
        self.race.as_ref()
    }

    pub fn variant(&self) -> Option<&Arc<VariantDefinition>> {
        self.variant.as_ref()
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn grade(&self) -> f32 {
        self.grade
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn skills(&self) -> &[SkillInstance] {
        &self.skills
    }

    pub fn combat(&self) -> &CombatStats {
        &self.combat
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Clamped to `[0, max_hp]`
    pub fn set_hp(&mut self, hp: f32) {
        self.hp = hp.clamp(0.0, self.max_hp.max(0.0));
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn mp(&self) -> f32 {
        self.mp
    }

    pub fn max_mp(&self) -> f32 {
        self.max_mp
    }

    pub fn ledger(&self) -> &ParticipantLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ParticipantLedger {
        &mut self.ledger
    }

    pub fn skill_timer(&self) -> Option<TimerId> {
        self.skill_timer
    }

    pub fn return_timer(&self) -> Option<TimerId> {
        self.return_timer
    }

    pub fn spawned_at(&self) -> f64 {
        self.spawned_at
    }

    pub fn died_at(&self) -> Option<f64> {
        self.died_at
    }

    /// Outgoing hit for the AI collaborator; `None` once dead
    pub fn roll_attack<R: Rng + ?Sized>(&self, kind: AttackKind, rng: &mut R) -> Option<AttackRoll> {
        if !self.is_alive() {
            return None;
        }
        Some(self.combat.roll_attack(kind, rng))
    }

    pub fn ai_view(&self) -> AiView {
        AiView::of(self)
    }
}

#[cfg(test)]
pub(crate) fn test_monster(max_hp: f32, stats: StatBlock) -> MonsterEntity {
    let mut monster = MonsterEntity::pooled(0);
    monster.begin_acquire(1);
    monster.stats = stats;
    monster.max_hp = max_hp;
    monster.hp = max_hp;
    monster.combat.max_hp = max_hp;
    monster.life = LifeState::Alive;
    monster.phase = LifecyclePhase::Active;
    monster.hit_detection = true;
    monster.ai_enabled = true;
    monster
}
