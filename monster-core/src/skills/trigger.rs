//! Periodic active-skill trigger check.

use crate::constants::HEAL_TRIGGER_HP_RATIO;
use crate::content::{SkillCategory, SkillEffect, SkillId};
use crate::monster::{LifeState, LifecyclePhase, MonsterEntity, MonsterHandle};

/// An active skill that fired, queued for the AI collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct SkillActivation {
    pub handle: MonsterHandle,
    pub skill: SkillId,
    pub category: SkillCategory,
    /// Heal amount for `Heal`, damage multiplier for `Strike` and `Buff`
    pub magnitude: f32,
    pub at: f64,
}

/// Evaluate every active skill of `entity` at `now` in assignment order.
pub fn run_skill_check(entity: &mut MonsterEntity, now: f64) -> Vec<SkillActivation> {
    if entity.life != LifeState::Alive || entity.phase != LifecyclePhase::Active {
        return Vec::new();
    }

    let engaged = !entity.ledger.is_empty();
    let mut fired = Vec::new();

    for skill in entity.skills.iter_mut() {
        if skill.is_passive() || !skill.ready(now) {
            continue;
        }
        let cost = skill.definition.mp_cost.max(0.0);
        if entity.mp < cost {
            continue;
        }

        let magnitude = match skill.category() {
            SkillCategory::Heal => {
                if entity.hp >= entity.max_hp * HEAL_TRIGGER_HP_RATIO {
                    continue;
                }
                let heal = entity.max_hp * skill.magnitude(SkillEffect::HealRatio);
                let before = entity.hp;
                entity.hp = (entity.hp + heal).min(entity.max_hp);
                entity.hp - before
            }
            SkillCategory::Strike | SkillCategory::Buff => {
                if !engaged {
                    continue;
                }
                skill.magnitude(SkillEffect::DamageMultiplier)
            }
            SkillCategory::StatBoost => continue,
        };

        entity.mp -= cost;
        skill.record_activation(now);
        fired.push(SkillActivation {
            handle: entity.handle,
            skill: skill.id().clone(),
            category: skill.category(),
            magnitude,
            at: now,
        });
    }

    fired
}
