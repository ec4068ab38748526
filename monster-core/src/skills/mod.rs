//! Skill instances owned by one monster lifetime.
//!
//! Effect magnitudes are resolved once at spawn against the registry's grade
//! bounds; nothing re-reads the template ranges afterwards.

use std::sync::Arc;

use crate::content::{GradeRange, SkillCategory, SkillDefinition, SkillEffect, SkillId};
use crate::stats::StatBlock;

pub mod assigner;
pub mod trigger;

pub use assigner::{assign_skills, optional_skill_count, passive_bonus};
pub use trigger::{run_skill_check, SkillActivation};

#[derive(Debug, Clone, PartialEq)]
pub struct SkillInstance {
    pub definition: Arc<SkillDefinition>,
    pub grade: f32,
    /// `(effect, value)` evaluated at `grade`, one per template effect
    pub magnitudes: Vec<(SkillEffect, f32)>,
    pub last_activation: Option<f64>,
    pub active: bool,
}

impl SkillInstance {
    pub fn new(definition: Arc<SkillDefinition>, grade: f32, bounds: &GradeRange) -> Self {
        let magnitudes = definition
            .effects
            .iter()
            .map(|e| (e.effect, e.evaluate(grade, bounds)))
            .collect();
        Self {
            definition,
            grade,
            magnitudes,
            last_activation: None,
            active: false,
        }
    }

    pub fn id(&self) -> &SkillId {
        &self.definition.id
    }

    pub fn category(&self) -> SkillCategory {
        self.definition.category
    }

    pub fn is_passive(&self) -> bool {
        self.definition.is_passive()
    }

    /// Sum of resolved values for `effect`
    pub fn magnitude(&self, effect: SkillEffect) -> f32 {
        self.magnitudes
            .iter()
            .filter(|(e, _)| *e == effect)
            .map(|(_, v)| v)
            .sum()
    }

    /// Flat stat bonuses carried by this instance
    pub fn stat_bonus(&self) -> StatBlock {
        let mut bonus = StatBlock::ZERO;
        for (effect, value) in &self.magnitudes {
            if let SkillEffect::Stat(stat) = effect {
                bonus.add(*stat, *value);
            }
        }
        bonus
    }

    /// Off cooldown at `now`
    pub fn ready(&self, now: f64) -> bool {
        match self.last_activation {
            None => true,
            Some(last) => now - last >= self.definition.cooldown_secs as f64,
        }
    }

    pub fn record_activation(&mut self, now: f64) {
        self.last_activation = Some(now);
        self.active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stat;

    const BOUNDS: GradeRange = GradeRange::new(80.0, 120.0);

    #[test]
    fn test_magnitudes_resolved_at_grade() {
        let def = Arc::new(
            SkillDefinition::passive("hardy", "Hardy")
                .with_stat_bonus(Stat::Vitality, 2.0, 6.0)
                .with_stat_bonus(Stat::Luck, 1.0, 1.0),
        );
        let instance = SkillInstance::new(def, 120.0, &BOUNDS);
        let bonus = instance.stat_bonus();
        assert_eq!(bonus.vitality, 6.0);
        assert_eq!(bonus.luck, 1.0);
        assert_eq!(bonus.power, 0.0);
    }

    #[test]
    fn test_cooldown_gate() {
        let def = Arc::new(
            SkillDefinition::active("mend", "Mend", SkillCategory::Heal).with_cooldown(5.0),
        );
        let mut instance = SkillInstance::new(def, 100.0, &BOUNDS);
        assert!(instance.ready(0.0));
        instance.record_activation(10.0);
        assert!(instance.active);
        assert!(!instance.ready(14.9));
        assert!(instance.ready(15.0));
    }
}
