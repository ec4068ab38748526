//! Skill templates: classification, grade-interpolated effect ranges, costs.

use serde::{Deserialize, Serialize};

use super::{GradeRange, SkillId};
use crate::stats::Stat;

/// Passive skills fold into stats at spawn; active skills wait for triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Passive,
    Active,
}

/// Category tag; selects the trigger rule for active skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    StatBoost,
    Heal,
    Strike,
    Buff,
}

/// What an effect range feeds into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Flat stat bonus (applied at spawn for passive skills)
    Stat(Stat),
    /// Fraction of max HP restored
    HealRatio,
    /// Multiplier on the next outgoing hit
    DamageMultiplier,
}

impl SkillEffect {
    pub fn label(&self) -> String {
        match self {
            SkillEffect::Stat(stat) => format!("{}_bonus", stat.as_str()),
            SkillEffect::HealRatio => "heal_ratio".into(),
            SkillEffect::DamageMultiplier => "damage_multiplier".into(),
        }
    }
}

/// `[min, max]` template interpolated linearly across the grade bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRange {
    pub effect: SkillEffect,
    pub min: f32,
    pub max: f32,
}

impl EffectRange {
    pub fn new(effect: SkillEffect, min: f32, max: f32) -> Self {
        Self { effect, min, max }
    }

    /// Value at `grade`; the lowest rollable grade yields `min`, the highest `max`
    pub fn evaluate(&self, grade: f32, bounds: &GradeRange) -> f32 {
        let span = bounds.span();
        let t = if span > f32::EPSILON {
            ((grade - bounds.min) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.min + (self.max - self.min) * t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub kind: SkillKind,
    pub category: SkillCategory,
    #[serde(default)]
    pub effects: Vec<EffectRange>,
    #[serde(default)]
    pub cooldown_secs: f32,
    #[serde(default)]
    pub mp_cost: f32,
    #[serde(default)]
    pub range: f32,
}

impl SkillDefinition {
    pub fn passive(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SkillId::new(id),
            name: name.into(),
            kind: SkillKind::Passive,
            category: SkillCategory::StatBoost,
            effects: Vec::new(),
            cooldown_secs: 0.0,
            mp_cost: 0.0,
            range: 0.0,
        }
    }

    pub fn active(id: impl Into<String>, name: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: SkillId::new(id),
            name: name.into(),
            kind: SkillKind::Active,
            category,
            effects: Vec::new(),
            cooldown_secs: 0.0,
            mp_cost: 0.0,
            range: 0.0,
        }
    }

    pub fn with_effect(mut self, effect: SkillEffect, min: f32, max: f32) -> Self {
        self.effects.push(EffectRange::new(effect, min, max));
        self
    }

    pub fn with_stat_bonus(self, stat: Stat, min: f32, max: f32) -> Self {
        self.with_effect(SkillEffect::Stat(stat), min, max)
    }

    pub fn with_cooldown(mut self, secs: f32) -> Self {
        self.cooldown_secs = secs;
        self
    }

    pub fn with_cost(mut self, mp: f32) -> Self {
        self.mp_cost = mp;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn is_passive(&self) -> bool {
        self.kind == SkillKind::Passive
    }

    /// Sum of every effect of the given kind at `grade`
    pub fn effect_at(&self, effect: SkillEffect, grade: f32, bounds: &GradeRange) -> f32 {
        self.effects
            .iter()
            .filter(|e| e.effect == effect)
            .map(|e| e.evaluate(grade, bounds))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: GradeRange = GradeRange::new(80.0, 120.0);

    #[test]
    fn test_effect_interpolation_endpoints() {
        let range = EffectRange::new(SkillEffect::Stat(Stat::Power), 2.0, 6.0);
        assert_eq!(range.evaluate(80.0, &BOUNDS), 2.0);
        assert_eq!(range.evaluate(100.0, &BOUNDS), 4.0);
        assert_eq!(range.evaluate(120.0, &BOUNDS), 6.0);
        // outside bounds clamps
        assert_eq!(range.evaluate(200.0, &BOUNDS), 6.0);
    }

    #[test]
    fn test_effect_at_sums_matching_effects() {
        let skill = SkillDefinition::passive("thick_hide", "Thick Hide")
            .with_stat_bonus(Stat::PhysicalDefense, 4.0, 8.0)
            .with_stat_bonus(Stat::PhysicalDefense, 1.0, 1.0)
            .with_stat_bonus(Stat::Vitality, 2.0, 2.0);
        let def = skill.effect_at(SkillEffect::Stat(Stat::PhysicalDefense), 100.0, &BOUNDS);
        assert!((def - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_bounds_use_max() {
        let range = EffectRange::new(SkillEffect::HealRatio, 0.1, 0.3);
        let fixed = GradeRange::new(100.0, 100.0);
        assert!((range.evaluate(100.0, &fixed) - 0.3).abs() < 1e-6);
    }
}
