//! Load-once template registry.
//!
//! Every cross-reference is resolved and checked in [`ContentRegistryBuilder::build`];
//! a registry that exists is internally consistent.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::{
    DropEntry, GradeRange, RaceDefinition, RaceId, SkillDefinition, SkillId, SkillRef,
    VariantDefinition, VariantId,
};
use crate::constants::{GRADE_MAX, GRADE_MIN};
use crate::error::ContentError;

#[derive(Debug)]
pub struct ContentRegistry {
    grade_bounds: GradeRange,
    skills: HashMap<SkillId, Arc<SkillDefinition>>,
    races: HashMap<RaceId, Arc<RaceDefinition>>,
    variants: HashMap<VariantId, Arc<VariantDefinition>>,
    // registration order, for deterministic iteration
    variant_order: Vec<VariantId>,
}

impl ContentRegistry {
    pub fn builder() -> ContentRegistryBuilder {
        ContentRegistryBuilder::default()
    }

    /// Rollable grades that skill ranges and effect interpolation are anchored to
    pub fn grade_bounds(&self) -> GradeRange {
        self.grade_bounds
    }

    pub fn skill(&self, id: &SkillId) -> Option<&Arc<SkillDefinition>> {
        self.skills.get(id)
    }

    pub fn race(&self, id: &RaceId) -> Option<&Arc<RaceDefinition>> {
        self.races.get(id)
    }

    pub fn variant(&self, id: &VariantId) -> Option<&Arc<VariantDefinition>> {
        self.variants.get(id)
    }

    /// Race of a variant; always present for a registered variant
    pub fn race_of(&self, variant: &VariantDefinition) -> Option<&Arc<RaceDefinition>> {
        self.races.get(&variant.race)
    }

    pub fn variants(&self) -> impl Iterator<Item = &Arc<VariantDefinition>> + '_ {
        self.variant_order
            .iter()
            .filter_map(move |id| self.variants.get(id))
    }

    /// Variants allowed to spawn on `floor`, in registration order
    pub fn variants_for_floor(&self, floor: u32) -> Vec<Arc<VariantDefinition>> {
        self.variants()
            .filter(|v| v.floors.contains(floor))
            .cloned()
            .collect()
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn race_count(&self) -> usize {
        self.races.len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

/// Collects templates, then validates them all at once
#[derive(Debug)]
pub struct ContentRegistryBuilder {
    grade_bounds: GradeRange,
    skills: Vec<SkillDefinition>,
    races: Vec<RaceDefinition>,
    variants: Vec<VariantDefinition>,
}

impl Default for ContentRegistryBuilder {
    fn default() -> Self {
        Self {
            grade_bounds: GradeRange::new(GRADE_MIN, GRADE_MAX),
            skills: Vec::new(),
            races: Vec::new(),
            variants: Vec::new(),
        }
    }
}

impl ContentRegistryBuilder {
    pub fn with_grade_bounds(mut self, min: f32, max: f32) -> Self {
        self.grade_bounds = GradeRange::new(min, max);
        self
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_race(mut self, race: RaceDefinition) -> Self {
        self.races.push(race);
        self
    }

    pub fn with_variant(mut self, variant: VariantDefinition) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn build(self) -> Result<ContentRegistry, ContentError> {
        let bounds = self.grade_bounds;

        let mut skills = HashMap::new();
        for skill in self.skills {
            validate_skill(&skill)?;
            let id = skill.id.clone();
            if skills.insert(id.clone(), Arc::new(skill)).is_some() {
                return Err(duplicate("skill", id.as_str()));
            }
        }

        let mut races = HashMap::new();
        for race in self.races {
            let owner = format!("race {}", race.id);
            check_skill_refs(&owner, &race.mandatory_skills, &skills, &bounds)?;
            check_skill_refs(&owner, &race.optional_skills, &skills, &bounds)?;
            check_drops(&owner, &race.common_drops)?;
            check_drops(&owner, &race.rare_drops)?;
            check_probability(&owner, race.soul_drop_chance)?;
            let id = race.id.clone();
            if races.insert(id.clone(), Arc::new(race)).is_some() {
                return Err(duplicate("race", id.as_str()));
            }
        }

        let mut variants = HashMap::new();
        let mut variant_order = Vec::new();
        for variant in self.variants {
            let owner = format!("variant {}", variant.id);
            if !races.contains_key(&variant.race) {
                return Err(ContentError::UnknownRace {
                    variant: variant.id.clone(),
                    race: variant.race.clone(),
                });
            }
            if let Some(stat) = variant.variance.first_inverted() {
                return Err(ContentError::InvalidVariance {
                    variant: variant.id.clone(),
                    stat: stat.as_str(),
                });
            }
            if variant.floors.min > variant.floors.max {
                return Err(ContentError::InvalidFloorRange {
                    variant: variant.id.clone(),
                    min: variant.floors.min,
                    max: variant.floors.max,
                });
            }
            if !(variant.spawn_weight.is_finite() && variant.spawn_weight > 0.0) {
                return Err(ContentError::InvalidSpawnWeight {
                    variant: variant.id.clone(),
                    weight: variant.spawn_weight,
                });
            }
            check_skill_refs(&owner, &variant.mandatory_skills, &skills, &bounds)?;
            check_skill_refs(&owner, &variant.optional_skills, &skills, &bounds)?;
            check_drops(&owner, &variant.drops)?;

            let id = variant.id.clone();
            if variants.insert(id.clone(), Arc::new(variant)).is_some() {
                return Err(duplicate("variant", id.as_str()));
            }
            variant_order.push(id);
        }

        info!(
            skills = skills.len(),
            races = races.len(),
            variants = variants.len(),
            "Content registry loaded"
        );

        Ok(ContentRegistry {
            grade_bounds: bounds,
            skills,
            races,
            variants,
            variant_order,
        })
    }
}

fn duplicate(kind: &'static str, id: &str) -> ContentError {
    ContentError::Duplicate {
        kind,
        id: id.to_string(),
    }
}

fn validate_skill(skill: &SkillDefinition) -> Result<(), ContentError> {
    for effect in &skill.effects {
        if !(effect.min <= effect.max) {
            return Err(ContentError::InvalidEffectRange {
                skill: skill.id.clone(),
                effect: effect.effect.label(),
                min: effect.min,
                max: effect.max,
            });
        }
    }
    Ok(())
}

fn check_skill_refs(
    owner: &str,
    refs: &[SkillRef],
    skills: &HashMap<SkillId, Arc<SkillDefinition>>,
    bounds: &GradeRange,
) -> Result<(), ContentError> {
    for skill_ref in refs {
        if !skills.contains_key(&skill_ref.skill) {
            return Err(ContentError::UnknownSkill {
                owner: owner.to_string(),
                skill: skill_ref.skill.clone(),
            });
        }
        if !skill_ref.grades.overlaps(bounds) {
            return Err(ContentError::UnreachableSkill {
                owner: owner.to_string(),
                skill: skill_ref.skill.clone(),
                min: skill_ref.grades.min,
                max: skill_ref.grades.max,
                grade_min: bounds.min,
                grade_max: bounds.max,
            });
        }
    }
    Ok(())
}

fn check_drops(owner: &str, drops: &[DropEntry]) -> Result<(), ContentError> {
    drops
        .iter()
        .try_for_each(|d| check_probability(&format!("{owner} drop {}", d.item), d.probability))
}

fn check_probability(owner: &str, value: f32) -> Result<(), ContentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContentError::InvalidProbability {
            owner: owner.to_string(),
            value,
        })
    }
}

// Used by tests across the crate to build small registries.
#[cfg(test)]
pub(crate) fn test_registry() -> ContentRegistry {
    super::builtin::starter_registry().expect("starter pack is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SkillCategory;
    use crate::stats::{Stat, StatBlock, StatVariance};

    fn base_race() -> RaceDefinition {
        RaceDefinition::new("slime", "Slime", StatBlock::splat(5.0))
    }

    #[test]
    fn test_starter_pack_builds() {
        let registry = test_registry();
        assert!(registry.variant_count() > 0);
        assert!(registry.race_count() > 0);
        assert!(registry.skill_count() > 0);
        for variant in registry.variants() {
            assert!(registry.race_of(variant).is_some());
        }
    }

    #[test]
    fn test_variant_with_missing_race_is_refused() {
        let err = ContentRegistry::builder()
            .with_race(base_race())
            .with_variant(VariantDefinition::new("ghost", "Ghost", "wraith"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::UnknownRace { .. }));
    }

    #[test]
    fn test_unknown_skill_is_refused() {
        let err = ContentRegistry::builder()
            .with_race(base_race().with_mandatory_skill(SkillRef::always("acid")))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::UnknownSkill { .. }));
    }

    #[test]
    fn test_unreachable_skill_range_is_refused() {
        let err = ContentRegistry::builder()
            .with_skill(SkillDefinition::passive("acid", "Acid Body"))
            .with_race(base_race().with_optional_skill(SkillRef::new("acid", 130.0, 150.0)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::UnreachableSkill { .. }));
    }

    #[test]
    fn test_duplicate_ids_are_refused() {
        let err = ContentRegistry::builder()
            .with_race(base_race())
            .with_race(base_race())
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::Duplicate { kind: "race", .. }));
    }

    #[test]
    fn test_inverted_variance_is_refused() {
        let mut variance = StatVariance::none();
        variance.min.set(Stat::Agility, 3.0);
        let err = ContentRegistry::builder()
            .with_race(base_race())
            .with_variant(VariantDefinition::new("blue", "Blue Slime", "slime").with_variance(variance))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidVariance { stat: "agility", .. }));
    }

    #[test]
    fn test_bad_probability_is_refused() {
        let err = ContentRegistry::builder()
            .with_race(base_race().with_rare_drop(DropEntry::new("gel", 1.5)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidProbability { .. }));
    }

    #[test]
    fn test_inverted_effect_range_is_refused() {
        let err = ContentRegistry::builder()
            .with_skill(
                SkillDefinition::active("bite", "Bite", SkillCategory::Strike)
                    .with_effect(crate::content::SkillEffect::DamageMultiplier, 2.0, 1.0),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidEffectRange { .. }));
    }

    #[test]
    fn test_variants_for_floor_respects_range_and_order() {
        let registry = ContentRegistry::builder()
            .with_race(base_race())
            .with_variant(VariantDefinition::new("a", "A", "slime").with_floors(1, 10))
            .with_variant(VariantDefinition::new("b", "B", "slime").with_floors(5, 20))
            .with_variant(VariantDefinition::new("c", "C", "slime").with_floors(30, 40))
            .build()
            .unwrap();
        let ids: Vec<String> = registry
            .variants_for_floor(7)
            .iter()
            .map(|v| v.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(registry.variants_for_floor(25).is_empty());
    }
}
