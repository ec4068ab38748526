//! Read-only surface handed to the AI/behavior collaborator.
//!
//! The collaborator never mutates a monster. It reads an [`AiView`] snapshot,
//! drains skill activations from the simulation and asks the entity for
//! outgoing attack rolls.

use bevy::math::Vec3;

use super::{LifeState, LifecyclePhase, MonsterEntity, MonsterHandle};
use crate::combat::{AttackKind, CombatStats};
use crate::content::{BehaviorTag, SkillId};

/// Snapshot of one monster for behavior decisions
#[derive(Debug, Clone, PartialEq)]
pub struct AiView {
    pub handle: MonsterHandle,
    pub life: LifeState,
    pub phase: LifecyclePhase,
    pub ai_enabled: bool,
    pub behavior: BehaviorTag,
    pub position: Vec3,
    pub hp: f32,
    pub max_hp: f32,
    pub combat: CombatStats,
    /// Effective physical `(min, max)` after stability narrowing
    pub physical_range: (f32, f32),
    pub magical_range: (f32, f32),
    pub engaged: bool,
    /// Active skills that have fired at least once this lifetime
    pub active_skills: Vec<SkillId>,
}

impl AiView {
    pub fn of(entity: &MonsterEntity) -> Self {
        Self {
            handle: entity.handle(),
            life: entity.life_state(),
            phase: entity.phase(),
            ai_enabled: entity.ai_enabled(),
            behavior: entity.variant().map(|v| v.behavior).unwrap_or_default(),
            position: entity.position(),
            hp: entity.hp(),
            max_hp: entity.max_hp(),
            combat: *entity.combat(),
            physical_range: entity.combat().physical.narrowed(),
            magical_range: entity.combat().magical.narrowed(),
            engaged: !entity.ledger().is_empty(),
            active_skills: entity
                .skills()
                .iter()
                .filter(|s| s.active)
                .map(|s| s.id().clone())
                .collect(),
        }
    }

    /// Attack kind with the higher narrowed ceiling
    pub fn preferred_attack(&self) -> AttackKind {
        if self.magical_range.1 > self.physical_range.1 {
            AttackKind::Magical
        } else {
            AttackKind::Physical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AttackerId;
    use crate::monster::test_monster;
    use crate::stats::StatBlock;

    #[test]
    fn test_view_tracks_engagement() {
        let mut monster = test_monster(50.0, StatBlock::ZERO);
        let view = monster.ai_view();
        assert!(!view.engaged);
        assert_eq!(view.hp, view.max_hp);
        assert!(view.active_skills.is_empty());

        monster.ledger.record(AttackerId(4), 10.0);
        assert!(monster.ai_view().engaged);
    }

    #[test]
    fn test_view_reflects_death() {
        let mut monster = test_monster(50.0, StatBlock::ZERO);
        assert!(monster.ai_view().ai_enabled);
        monster.mark_dead(0.0);
        let view = monster.ai_view();
        assert_eq!(view.life, LifeState::Dead);
        assert!(!view.ai_enabled);
    }

    #[test]
    fn test_preferred_attack_follows_ranges() {
        let mut monster = test_monster(50.0, StatBlock::ZERO);
        monster.combat = crate::combat::derive_combat_stats(&StatBlock {
            power: 2.0,
            intellect: 20.0,
            ..StatBlock::ZERO
        });
        assert_eq!(monster.ai_view().preferred_attack(), AttackKind::Magical);
    }
}
