//! Skill assignment for a freshly rolled monster.
//!
//! Mandatory references from race and variant are always taken (when valid at
//! the grade). Optional references form a pool that is shuffled and cut to a
//! grade-driven count. A skill named in several lists becomes one instance;
//! mandatory wins over optional.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use super::SkillInstance;
use crate::constants::{OPTIONAL_SKILL_GRADE_STEP, OPTIONAL_SKILL_WIDEN_MAX};
use crate::content::{ContentRegistry, RaceDefinition, SkillDefinition, SkillRef, VariantDefinition};
use crate::stats::StatBlock;

/// Optional skills to draw at `grade`: one per grade step above the floor,
/// plus one, widened by a uniform `0..=OPTIONAL_SKILL_WIDEN_MAX`.
pub fn optional_skill_count<R: Rng + ?Sized>(rng: &mut R, grade: f32, grade_min: f32) -> usize {
    let steps = ((grade - grade_min) / OPTIONAL_SKILL_GRADE_STEP).round();
    let steps = if steps.is_finite() { steps.max(0.0) as usize } else { 0 };
    steps + 1 + rng.gen_range(0..=OPTIONAL_SKILL_WIDEN_MAX)
}

pub fn assign_skills<R: Rng + ?Sized>(
    rng: &mut R,
    registry: &ContentRegistry,
    race: &RaceDefinition,
    variant: &VariantDefinition,
    grade: f32,
) -> Vec<SkillInstance> {
    let bounds = registry.grade_bounds();
    let mut taken: HashSet<&str> = HashSet::new();

    let mandatory: Vec<Arc<SkillDefinition>> = race
        .mandatory_skills
        .iter()
        .chain(&variant.mandatory_skills)
        .filter_map(|r| resolve(registry, r, grade, &mut taken))
        .collect();

    let mut pool: Vec<Arc<SkillDefinition>> = race
        .optional_skills
        .iter()
        .chain(&variant.optional_skills)
        .filter_map(|r| resolve(registry, r, grade, &mut taken))
        .collect();

    let count = optional_skill_count(rng, grade, bounds.min).min(pool.len());
    pool.shuffle(rng);
    pool.truncate(count);

    mandatory
        .into_iter()
        .chain(pool)
        .map(|def| SkillInstance::new(def, grade, &bounds))
        .collect()
}

fn resolve<'a>(
    registry: &ContentRegistry,
    skill_ref: &'a SkillRef,
    grade: f32,
    taken: &mut HashSet<&'a str>,
) -> Option<Arc<SkillDefinition>> {
    if !skill_ref.grades.contains(grade) || taken.contains(skill_ref.skill.as_str()) {
        return None;
    }
    let Some(def) = registry.skill(&skill_ref.skill) else {
        warn!(skill = %skill_ref.skill, "Skill reference missing from registry");
        return None;
    };
    taken.insert(skill_ref.skill.as_str());
    Some(Arc::clone(def))
}

/// Combined flat stat bonus of every passive instance
pub fn passive_bonus(skills: &[SkillInstance]) -> StatBlock {
    skills
        .iter()
        .filter(|s| s.is_passive())
        .fold(StatBlock::ZERO, |mut acc, s| {
            let bonus = s.stat_bonus();
            for (stat, value) in bonus.iter() {
                acc.add(stat, value);
            }
            acc
        })
}
