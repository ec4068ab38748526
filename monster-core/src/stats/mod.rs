//! Eight-stat block shared by races, variants and live monsters.
//!
//! `grade` rolls the per-instance difficulty scalar, `compose` layers race
//! base stats, grade scaling and variant variance into a final block.

use serde::{Deserialize, Serialize};

pub mod compose;
pub mod grade;

pub use compose::{compose_stats, grade_factor, scale_common_probability, scale_rare_probability, scale_reward};
pub use grade::{roll_grade, GradeDistribution};

/// One of the eight scalar stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Power,
    Agility,
    Vitality,
    Intellect,
    PhysicalDefense,
    MagicDefense,
    Luck,
    Stability,
}

impl Stat {
    pub const ALL: [Stat; 8] = [
        Stat::Power,
        Stat::Agility,
        Stat::Vitality,
        Stat::Intellect,
        Stat::PhysicalDefense,
        Stat::MagicDefense,
        Stat::Luck,
        Stat::Stability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Power => "power",
            Stat::Agility => "agility",
            Stat::Vitality => "vitality",
            Stat::Intellect => "intellect",
            Stat::PhysicalDefense => "physical_defense",
            Stat::MagicDefense => "magic_defense",
            Stat::Luck => "luck",
            Stat::Stability => "stability",
        }
    }
}

/// Final or template stat values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub power: f32,
    pub agility: f32,
    pub vitality: f32,
    pub intellect: f32,
    pub physical_defense: f32,
    pub magic_defense: f32,
    pub luck: f32,
    pub stability: f32,
}

impl StatBlock {
    pub const ZERO: StatBlock = StatBlock {
        power: 0.0,
        agility: 0.0,
        vitality: 0.0,
        intellect: 0.0,
        physical_defense: 0.0,
        magic_defense: 0.0,
        luck: 0.0,
        stability: 0.0,
    };

    /// Same value in every stat
    pub fn splat(value: f32) -> Self {
        Self {
            power: value,
            agility: value,
            vitality: value,
            intellect: value,
            physical_defense: value,
            magic_defense: value,
            luck: value,
            stability: value,
        }
    }

    pub fn get(&self, stat: Stat) -> f32 {
        match stat {
            Stat::Power => self.power,
            Stat::Agility => self.agility,
            Stat::Vitality => self.vitality,
            Stat::Intellect => self.intellect,
            Stat::PhysicalDefense => self.physical_defense,
            Stat::MagicDefense => self.magic_defense,
            Stat::Luck => self.luck,
            Stat::Stability => self.stability,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut f32 {
        match stat {
            Stat::Power => &mut self.power,
            Stat::Agility => &mut self.agility,
            Stat::Vitality => &mut self.vitality,
            Stat::Intellect => &mut self.intellect,
            Stat::PhysicalDefense => &mut self.physical_defense,
            Stat::MagicDefense => &mut self.magic_defense,
            Stat::Luck => &mut self.luck,
            Stat::Stability => &mut self.stability,
        }
    }

    pub fn set(&mut self, stat: Stat, value: f32) {
        *self.get_mut(stat) = value;
    }

    pub fn add(&mut self, stat: Stat, amount: f32) {
        *self.get_mut(stat) += amount;
    }

    /// Every stat multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        let mut out = *self;
        for stat in Stat::ALL {
            out.set(stat, self.get(stat) * factor);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f32)> + '_ {
        Stat::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite())
    }
}

/// Additive per-stat variance bounds supplied by a variant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatVariance {
    pub min: StatBlock,
    pub max: StatBlock,
}

impl StatVariance {
    pub fn none() -> Self {
        Self::default()
    }

    /// Symmetric `-spread..=spread` on every stat
    pub fn symmetric(spread: f32) -> Self {
        Self {
            min: StatBlock::splat(-spread),
            max: StatBlock::splat(spread),
        }
    }

    /// First stat whose minimum exceeds its maximum
    pub fn first_inverted(&self) -> Option<Stat> {
        Stat::ALL
            .into_iter()
            .find(|s| self.min.get(*s) > self.max.get(*s))
    }
}
