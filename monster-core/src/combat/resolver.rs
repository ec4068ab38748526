//! Authoritative damage application and the `Alive -> Dead` transition.
//!
//! Ordering: mitigate, dodge, floor at `MIN_DAMAGE`, subtract, record the
//! attacker, then flip to dead on the first zero crossing. The flip is the
//! only place a `Killed` outcome is produced, so the death sequence that
//! follows it runs at most once per lifetime.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::constants::{DEFENSE_CONSTANT, DODGE_CHANCE_PER_AGILITY, MIN_DAMAGE};
use crate::ledger::AttackerId;
use crate::monster::{LifeState, LifecyclePhase, MonsterEntity};
use crate::stats::StatBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
    /// Bypasses mitigation entirely
    True,
}

/// How the dodge check is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DodgePolicy {
    #[default]
    Rolled,
    Always,
    Never,
}

/// Why a damage request changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    AlreadyDead,
    NotTargetable,
    InvalidAmount,
    NotAuthority,
    UnknownTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    Ignored(IgnoreReason),
    Dodged,
    Hit { dealt: f32, remaining_hp: f32 },
    Killed { dealt: f32 },
}

impl DamageOutcome {
    /// HP actually removed by this request
    pub fn hp_change(&self) -> f32 {
        match self {
            DamageOutcome::Hit { dealt, .. } | DamageOutcome::Killed { dealt } => *dealt,
            _ => 0.0,
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

/// Fraction of damage removed by `defense`: 0 at 0, approaching 1 as defense grows
pub fn mitigation_ratio(defense: f32) -> f32 {
    let defense = if defense.is_finite() {
        defense.max(0.0)
    } else if defense > 0.0 {
        return 1.0 - f32::EPSILON;
    } else {
        0.0
    };
    (defense / (defense + DEFENSE_CONSTANT)).min(1.0 - f32::EPSILON)
}

/// Damage after defense for the given type
pub fn mitigate(amount: f32, damage_type: DamageType, stats: &StatBlock) -> f32 {
    match damage_type {
        DamageType::Physical => amount * (1.0 - mitigation_ratio(stats.physical_defense)),
        DamageType::Magical => amount * (1.0 - mitigation_ratio(stats.magic_defense)),
        DamageType::True => amount,
    }
}

pub fn dodge_chance(agility: f32) -> f32 {
    (agility * DODGE_CHANCE_PER_AGILITY).clamp(0.0, 1.0)
}

fn dodged<R: Rng + ?Sized>(policy: DodgePolicy, agility: f32, rng: &mut R) -> bool {
    match policy {
        DodgePolicy::Always => true,
        DodgePolicy::Never => false,
        DodgePolicy::Rolled => {
            let chance = dodge_chance(agility);
            chance > 0.0 && rng.gen::<f32>() < chance
        }
    }
}

/// Apply one damage request to `entity`.
pub fn apply_damage<R: Rng + ?Sized>(
    entity: &mut MonsterEntity,
    amount: f32,
    damage_type: DamageType,
    attacker: Option<AttackerId>,
    policy: DodgePolicy,
    now: f64,
    rng: &mut R,
) -> DamageOutcome {
    if entity.life_state() == LifeState::Dead {
        trace!(handle = %entity.handle(), "Damage to dead monster ignored");
        return DamageOutcome::Ignored(IgnoreReason::AlreadyDead);
    }
    if entity.phase() != LifecyclePhase::Active || !entity.is_targetable() {
        return DamageOutcome::Ignored(IgnoreReason::NotTargetable);
    }
    if !amount.is_finite() || amount <= 0.0 {
        return DamageOutcome::Ignored(IgnoreReason::InvalidAmount);
    }

    let mitigated = mitigate(amount, damage_type, entity.stats());

    if dodged(policy, entity.stats().agility, rng) {
        debug!(handle = %entity.handle(), ?attacker, "Attack dodged");
        return DamageOutcome::Dodged;
    }

    let final_damage = mitigated.max(MIN_DAMAGE);
    let before = entity.hp();
    let after = (before - final_damage).max(0.0);
    entity.set_hp(after);
    let dealt = before - after;

    if let Some(attacker) = attacker {
        entity.ledger_mut().record(attacker, final_damage);
    }

    if after <= 0.0 && entity.mark_dead(now) {
        debug!(
            handle = %entity.handle(),
            ?attacker,
            participants = entity.ledger().participant_count(),
            "Monster killed"
        );
        return DamageOutcome::Killed { dealt };
    }

    DamageOutcome::Hit {
        dealt,
        remaining_hp: after,
    }
}
