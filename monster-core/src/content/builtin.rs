//! Starter bestiary used by the headless binary, tests and benches.
//!
//! Three races spanning the early floors, each with a couple of variants.

use super::{
    BehaviorTag, ContentPack, DropEntry, Element, RaceDefinition, SkillCategory, SkillDefinition,
    SkillEffect, SkillRef, VariantDefinition,
};
use super::ContentRegistry;
use crate::error::ContentError;
use crate::stats::{Stat, StatBlock, StatVariance};

pub fn starter_pack() -> ContentPack {
    ContentPack {
        skills: skills(),
        races: races(),
        variants: variants(),
    }
}

/// Validated registry over [`starter_pack`]
pub fn starter_registry() -> Result<ContentRegistry, ContentError> {
    starter_pack().into_builder(ContentRegistry::builder()).build()
}

fn skills() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition::passive("thick_hide", "Thick Hide")
            .with_stat_bonus(Stat::PhysicalDefense, 3.0, 9.0),
        SkillDefinition::passive("keen_senses", "Keen Senses")
            .with_stat_bonus(Stat::Agility, 2.0, 6.0)
            .with_stat_bonus(Stat::Luck, 1.0, 4.0),
        SkillDefinition::passive("brute_strength", "Brute Strength")
            .with_stat_bonus(Stat::Power, 2.0, 8.0),
        SkillDefinition::passive("bone_ward", "Bone Ward")
            .with_stat_bonus(Stat::MagicDefense, 4.0, 10.0)
            .with_stat_bonus(Stat::Stability, 5.0, 15.0),
        SkillDefinition::passive("hardy", "Hardy").with_stat_bonus(Stat::Vitality, 2.0, 7.0),
        SkillDefinition::active("mend", "Mend", SkillCategory::Heal)
            .with_effect(SkillEffect::HealRatio, 0.15, 0.3)
            .with_cooldown(12.0)
            .with_cost(20.0),
        SkillDefinition::active("rending_bite", "Rending Bite", SkillCategory::Strike)
            .with_effect(SkillEffect::DamageMultiplier, 1.3, 1.8)
            .with_cooldown(6.0)
            .with_cost(8.0)
            .with_range(2.0),
        SkillDefinition::active("war_cry", "War Cry", SkillCategory::Buff)
            .with_effect(SkillEffect::DamageMultiplier, 1.1, 1.25)
            .with_cooldown(20.0)
            .with_cost(15.0)
            .with_range(10.0),
        SkillDefinition::active("grave_bolt", "Grave Bolt", SkillCategory::Strike)
            .with_effect(SkillEffect::DamageMultiplier, 1.4, 2.0)
            .with_cooldown(8.0)
            .with_cost(18.0)
            .with_range(12.0),
    ]
}

fn races() -> Vec<RaceDefinition> {
    vec![
        RaceDefinition::new(
            "goblin",
            "Goblin",
            StatBlock {
                power: 10.0,
                agility: 12.0,
                vitality: 6.0,
                intellect: 3.0,
                physical_defense: 8.0,
                magic_defense: 4.0,
                luck: 15.0,
                stability: 20.0,
            },
        )
        .with_affinity(Element::Earth, 0.1)
        .with_mandatory_skill(SkillRef::always("keen_senses"))
        .with_optional_skill(SkillRef::new("brute_strength", 80.0, 120.0))
        .with_optional_skill(SkillRef::new("war_cry", 95.0, 120.0))
        .with_optional_skill(SkillRef::new("hardy", 80.0, 110.0))
        .with_rewards(25, 8)
        .with_soul("goblin_soul", 0.01)
        .with_common_drop(DropEntry::new("rusty_dagger", 0.12))
        .with_common_drop(DropEntry::new("copper_ore", 0.3).with_quantity(1, 3))
        .with_rare_drop(DropEntry::new("goblin_charm", 0.02).with_grades(100.0, 120.0)),
        RaceDefinition::new(
            "wolf",
            "Wolf",
            StatBlock {
                power: 14.0,
                agility: 18.0,
                vitality: 9.0,
                intellect: 1.0,
                physical_defense: 6.0,
                magic_defense: 2.0,
                luck: 8.0,
                stability: 10.0,
            },
        )
        .with_affinity(Element::Wind, 0.2)
        .with_affinity(Element::Fire, -0.15)
        .with_mandatory_skill(SkillRef::always("rending_bite"))
        .with_optional_skill(SkillRef::new("thick_hide", 80.0, 120.0))
        .with_optional_skill(SkillRef::new("keen_senses", 80.0, 120.0))
        .with_optional_skill(SkillRef::new("hardy", 90.0, 120.0))
        .with_rewards(30, 5)
        .with_soul("wolf_soul", 0.008)
        .with_common_drop(DropEntry::new("wolf_pelt", 0.45))
        .with_common_drop(DropEntry::new("sharp_fang", 0.2).with_quantity(1, 2))
        .with_rare_drop(DropEntry::new("alpha_fang", 0.015).with_grades(105.0, 120.0)),
        RaceDefinition::new(
            "skeleton",
            "Skeleton",
            StatBlock {
                power: 11.0,
                agility: 6.0,
                vitality: 12.0,
                intellect: 9.0,
                physical_defense: 14.0,
                magic_defense: 10.0,
                luck: 4.0,
                stability: 35.0,
            },
        )
        .with_affinity(Element::Void, 0.3)
        .with_affinity(Element::Fire, -0.2)
        .with_mandatory_skill(SkillRef::always("bone_ward"))
        .with_optional_skill(SkillRef::new("thick_hide", 80.0, 120.0))
        .with_optional_skill(SkillRef::new("mend", 90.0, 120.0))
        .with_optional_skill(SkillRef::new("grave_bolt", 100.0, 120.0))
        .with_optional_skill(SkillRef::new("brute_strength", 80.0, 120.0))
        .with_rewards(40, 12)
        .with_soul("restless_soul", 0.012)
        .with_common_drop(DropEntry::new("bone_dust", 0.5).with_quantity(1, 4))
        .with_rare_drop(DropEntry::new("cursed_relic_shard", 0.01)),
    ]
}

fn variants() -> Vec<VariantDefinition> {
    vec![
        VariantDefinition::new("goblin_scout", "Goblin Scout", "goblin")
            .with_variance(StatVariance::symmetric(1.5))
            .with_spawn_weight(5.0)
            .with_floors(1, 20)
            .with_behavior(BehaviorTag::Patrol),
        VariantDefinition::new("goblin_shaman", "Goblin Shaman", "goblin")
            .with_variance(StatVariance {
                min: StatBlock {
                    intellect: 4.0,
                    ..StatBlock::splat(-1.0)
                },
                max: StatBlock {
                    intellect: 8.0,
                    ..StatBlock::splat(1.0)
                },
            })
            .with_mandatory_skill(SkillRef::always("mend"))
            .with_spawn_weight(2.0)
            .with_floors(3, 30)
            .with_behavior(BehaviorTag::Guardian)
            .with_drop(DropEntry::new("shaman_totem", 0.05)),
        VariantDefinition::new("gray_wolf", "Gray Wolf", "wolf")
            .with_variance(StatVariance::symmetric(2.0))
            .with_spawn_weight(4.0)
            .with_floors(1, 25)
            .with_behavior(BehaviorTag::Pack),
        VariantDefinition::new("dire_wolf", "Dire Wolf", "wolf")
            .with_variance(StatVariance {
                min: StatBlock {
                    power: 3.0,
                    vitality: 3.0,
                    ..StatBlock::ZERO
                },
                max: StatBlock {
                    power: 6.0,
                    vitality: 6.0,
                    ..StatBlock::splat(1.0)
                },
            })
            .with_optional_skill(SkillRef::new("brute_strength", 100.0, 120.0))
            .with_spawn_weight(1.0)
            .with_floors(10, 40)
            .with_behavior(BehaviorTag::Aggressive)
            .with_drop(DropEntry::new("dire_pelt", 0.25)),
        VariantDefinition::new("skeleton_warrior", "Skeleton Warrior", "skeleton")
            .with_variance(StatVariance::symmetric(1.0))
            .with_spawn_weight(3.0)
            .with_floors(5, 50)
            .with_behavior(BehaviorTag::Guardian),
        VariantDefinition::new("skeleton_mage", "Skeleton Mage", "skeleton")
            .with_variance(StatVariance {
                min: StatBlock {
                    intellect: 5.0,
                    power: -3.0,
                    ..StatBlock::ZERO
                },
                max: StatBlock {
                    intellect: 10.0,
                    power: -1.0,
                    ..StatBlock::splat(1.0)
                },
            })
            .with_mandatory_skill(SkillRef::new("grave_bolt", 80.0, 120.0))
            .with_spawn_weight(1.5)
            .with_floors(8, 50)
            .with_behavior(BehaviorTag::Ambush)
            .with_drop(DropEntry::new("spell_scroll", 0.08)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_pack_has_variant_on_first_floor() {
        let pack = starter_pack();
        assert!(pack.variants.iter().any(|v| v.floors.contains(1)));
    }

    #[test]
    fn test_starter_pack_ron_roundtrip() {
        let pack = starter_pack();
        let text = pack.to_ron_string().unwrap();
        let restored = ContentPack::from_ron_str(&text).unwrap();
        assert_eq!(restored.variants.len(), pack.variants.len());
        assert_eq!(restored.races[0], pack.races[0]);
    }
}
