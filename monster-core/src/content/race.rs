//! Race templates: the base stat block, reward baseline and drop pools of a
//! monster family.

use serde::{Deserialize, Serialize};

use super::{GradeRange, ItemId, RaceId, SkillRef};
use crate::stats::StatBlock;

/// Element axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Void,
    Neutral,
}

/// Resistance (positive) or weakness (negative) toward an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementAffinity {
    pub element: Element,
    pub value: f32,
}

/// One drop table line: rolled independently against `probability`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub item: ItemId,
    pub probability: f32,
    #[serde(default = "one")]
    pub min_quantity: u32,
    #[serde(default = "one")]
    pub max_quantity: u32,
    #[serde(default)]
    pub grades: GradeRange,
}

fn one() -> u32 {
    1
}

impl DropEntry {
    pub fn new(item: impl Into<String>, probability: f32) -> Self {
        Self {
            item: ItemId::new(item),
            probability,
            min_quantity: 1,
            max_quantity: 1,
            grades: GradeRange::any(),
        }
    }

    pub fn with_quantity(mut self, min: u32, max: u32) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    pub fn with_grades(mut self, min: f32, max: f32) -> Self {
        self.grades = GradeRange::new(min, max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDefinition {
    pub id: RaceId,
    pub name: String,
    pub base_stats: StatBlock,
    #[serde(default)]
    pub affinities: Vec<ElementAffinity>,
    #[serde(default)]
    pub mandatory_skills: Vec<SkillRef>,
    #[serde(default)]
    pub optional_skills: Vec<SkillRef>,
    #[serde(default)]
    pub base_experience: u32,
    #[serde(default)]
    pub base_currency: u32,
    #[serde(default)]
    pub soul_drop_chance: f32,
    #[serde(default)]
    pub soul_item: Option<ItemId>,
    #[serde(default)]
    pub common_drops: Vec<DropEntry>,
    #[serde(default)]
    pub rare_drops: Vec<DropEntry>,
}

impl RaceDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_stats: StatBlock) -> Self {
        Self {
            id: RaceId::new(id),
            name: name.into(),
            base_stats,
            affinities: Vec::new(),
            mandatory_skills: Vec::new(),
            optional_skills: Vec::new(),
            base_experience: 0,
            base_currency: 0,
            soul_drop_chance: 0.0,
            soul_item: None,
            common_drops: Vec::new(),
            rare_drops: Vec::new(),
        }
    }

    pub fn with_affinity(mut self, element: Element, value: f32) -> Self {
        self.affinities.push(ElementAffinity { element, value });
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

    pub fn with_rewards(mut self, experience: u32, currency: u32) -> Self {
        self.base_experience = experience;
        self.base_currency = currency;
        self
    }

    pub fn with_soul(mut self, item: impl Into<String>, chance: f32) -> Self {
        self.soul_item = Some(ItemId::new(item));
        self.soul_drop_chance = chance;
        self
    }

    pub fn with_common_drop(mut self, entry: DropEntry) -> Self {
        self.common_drops.push(entry);
        self
    }

    pub fn with_rare_drop(mut self, entry: DropEntry) -> Self {
        self.rare_drops.push(entry);
        self
    }

    /// Affinity toward `element`, 0.0 when unlisted
    pub fn affinity(&self, element: Element) -> f32 {
        self.affinities
            .iter()
            .filter(|a| a.element == element)
            .map(|a| a.value)
            .sum()
    }
}
