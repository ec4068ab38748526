//! Death sequence: reward attribution, drops, and the delayed pool return.
//!
//! Runs once per lifetime, right after the resolver flips the entity to dead.
//! Rewards pass two gates in order: the entity's own rewarded set, then the
//! global reward collaborator keyed by the lifetime's kill id.

use bevy::math::Vec3;
use rand::Rng;
use tracing::{info, warn};

use crate::collaborators::{Collaborators, ItemDrop, RewardClaim, Severity};
use crate::ledger::AttackerId;
use crate::loot::{roll_drops, roll_soul};
use crate::monster::{KillId, LifeState, LifecyclePhase, MonsterEntity, MonsterHandle};
use crate::scheduler::{TimerAction, TimerQueue};
use crate::stats::scale_reward;

/// What the death sequence needs from its owner
pub struct DeathContext<'a> {
    pub timers: &'a mut TimerQueue,
    pub collaborators: &'a Collaborators,
    pub return_delay_secs: f32,
    pub now: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeathReport {
    pub handle: MonsterHandle,
    pub kill: KillId,
    pub position: Vec3,
    pub rewarded: Vec<RewardClaim>,
    /// Participants whose claim the global ledger refused
    pub rejected: Vec<AttackerId>,
    pub drops: Vec<ItemDrop>,
    pub soul: Option<ItemDrop>,
    pub return_at: f64,
}

impl DeathReport {
    /// Drops plus soul, as emitted to the item-drop collaborator
    pub fn drop_count(&self) -> usize {
        self.drops.len() + usize::from(self.soul.is_some())
    }
}

/// Run the death sequence for a freshly killed `entity`.
///
/// Returns `None` when the entity is not in the just-died state, so a repeated
/// call never re-rewards or re-drops.
pub fn run_death_sequence<R: Rng + ?Sized>(
    entity: &mut MonsterEntity,
    ctx: DeathContext<'_>,
    rng: &mut R,
) -> Option<DeathReport> {
    if entity.life != LifeState::Dead || entity.phase != LifecyclePhase::Active {
        return None;
    }

    // hit detection and AI went off with the state flip; stop skill checks too
    if let Some(timer) = entity.skill_timer.take() {
        ctx.timers.cancel(timer);
    }

    let kill = entity.kill_id();
    let handle = entity.handle;
    let position = entity.position;
    let grade = entity.grade;

    let mut rewarded = Vec::new();
    let mut rejected = Vec::new();
    let mut drops = Vec::new();
    let mut soul = None;

    if let (Some(race), Some(variant)) = (entity.race.clone(), entity.variant.clone()) {
        let experience = scale_reward(race.base_experience, grade);
        let currency = scale_reward(race.base_currency, grade);
        let participants: Vec<AttackerId> = entity.ledger.participants().collect();

        for attacker in participants {
            if !entity.ledger.try_mark_rewarded(attacker) {
                continue;
            }
            let claim = RewardClaim {
                kill,
                attacker,
                experience,
                currency,
            };
            if ctx.collaborators.rewards.claim(claim) {
                ctx.collaborators.notifier.notify(
                    attacker,
                    &format!("Defeated {}: +{experience} exp, +{currency} currency", variant.name),
                    Severity::Info,
                );
                rewarded.push(claim);
            } else {
                warn!(%handle, %kill, %attacker, "Reward already claimed");
                ctx.collaborators.notifier.notify(
                    attacker,
                    &format!("Reward for {} was already claimed", variant.name),
                    Severity::Warning,
                );
                rejected.push(attacker);
            }
        }

        drops = roll_drops(rng, &race, &variant, grade);
        soul = roll_soul(rng, &race, grade);

        let mut emitted = drops.clone();
        emitted.extend(soul.clone());
        if !emitted.is_empty() {
            ctx.collaborators.drops.emit(emitted, position);
        }
    }

    let return_at = ctx.now + ctx.return_delay_secs.max(0.0) as f64;
    entity.return_timer = Some(ctx.timers.schedule(return_at, TimerAction::ReturnToPool(handle)));
    entity.phase = LifecyclePhase::DeadPendingReturn;

    info!(
        %handle,
        %kill,
        grade,
        rewarded = rewarded.len(),
        rejected = rejected.len(),
        drops = drops.len() + usize::from(soul.is_some()),
        "Monster died"
    );

    Some(DeathReport {
        handle,
        kill,
        position,
        rewarded,
        rejected,
        drops,
        soul,
        return_at,
    })
}
