//! Variant templates: a spawnable specialization of a race.

use serde::{Deserialize, Serialize};

use super::{DropEntry, FloorRange, RaceId, SkillRef, VariantId};
use crate::stats::StatVariance;

/// Preferred behavior handed to the AI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorTag {
    Passive,
    Patrol,
    #[default]
    Aggressive,
    Ambush,
    Pack,
    Guardian,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub id: VariantId,
    pub name: String,
    pub race: RaceId,
    #[serde(default)]
    pub variance: StatVariance,
    #[serde(default)]
    pub mandatory_skills: Vec<SkillRef>,
    #[serde(default)]
    pub optional_skills: Vec<SkillRef>,
    #[serde(default = "default_weight")]
    pub spawn_weight: f32,
    #[serde(default)]
    pub floors: FloorRange,
    #[serde(default)]
    pub behavior: BehaviorTag,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

fn default_weight() -> f32 {
    1.0
}

impl VariantDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, race: impl Into<String>) -> Self {
        Self {
            id: VariantId::new(id),
            name: name.into(),
            race: RaceId::new(race),
            variance: StatVariance::none(),
            mandatory_skills: Vec::new(),
            optional_skills: Vec::new(),
            spawn_weight: 1.0,
            floors: FloorRange::default(),
            behavior: BehaviorTag::default(),
            drops: Vec::new(),
        }
    }

    pub fn with_variance(mut self, variance: StatVariance) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_mandatory_skill(mut self, skill: SkillRef) -> Self {
        self.mandatory_skills.push(skill);
        self
    }

    pub fn with_optional_skill(mut self, skill: SkillRef) -> Self {
        self.optional_skills.push(skill);
        self
    }

    pub fn with_spawn_weight(mut self, weight: f32) -> Self {
        self.spawn_weight = weight;
        self
    }

    pub fn with_floors(mut self, min: u32, max: u32) -> Self {
        self.floors = FloorRange::new(min, max);
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorTag) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_drop(mut self, entry: DropEntry) -> Self {
        self.drops.push(entry);
        self
    }
}
