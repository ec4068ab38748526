//! Death drops: race common/rare tables, variant table, and the soul roll.
//!
//! Each entry is gated by its grade range and rolled independently. Rare
//! entries scale super-linearly with grade, everything else linearly.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collaborators::ItemDrop;
use crate::content::{DropEntry, RaceDefinition, VariantDefinition};
use crate::stats::{scale_common_probability, scale_rare_probability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTier {
    Common,
    Rare,
    Variant,
}

impl DropTier {
    /// Effective probability of `base` at `grade`
    pub fn scale(self, base: f32, grade: f32) -> f32 {
        match self {
            DropTier::Rare => scale_rare_probability(base, grade),
            DropTier::Common | DropTier::Variant => scale_common_probability(base, grade),
        }
    }
}

/// Roll one entry; `None` when gated out or the roll misses
pub fn roll_entry<R: Rng + ?Sized>(
    rng: &mut R,
    entry: &DropEntry,
    tier: DropTier,
    grade: f32,
) -> Option<ItemDrop> {
    if !entry.grades.contains(grade) {
        return None;
    }
    let chance = tier.scale(entry.probability, grade);
    if chance <= 0.0 || rng.gen::<f32>() >= chance {
        return None;
    }
    let (lo, hi) = if entry.min_quantity <= entry.max_quantity {
        (entry.min_quantity, entry.max_quantity)
    } else {
        (entry.max_quantity, entry.min_quantity)
    };
    let quantity = rng.gen_range(lo..=hi);
    (quantity > 0).then(|| ItemDrop {
        item: entry.item.clone(),
        quantity,
    })
}

/// Race common, race rare, then variant table, in table order
pub fn roll_drops<R: Rng + ?Sized>(
    rng: &mut R,
    race: &RaceDefinition,
    variant: &VariantDefinition,
    grade: f32,
) -> Vec<ItemDrop> {
    let tables = [
        (&race.common_drops, DropTier::Common),
        (&race.rare_drops, DropTier::Rare),
        (&variant.drops, DropTier::Variant),
    ];
    let mut drops = Vec::new();
    for (table, tier) in tables {
        drops.extend(table.iter().filter_map(|e| roll_entry(rng, e, tier, grade)));
    }
    drops
}

/// Independent soul roll at the race chance scaled linearly by grade
pub fn roll_soul<R: Rng + ?Sized>(rng: &mut R, race: &RaceDefinition, grade: f32) -> Option<ItemDrop> {
    let item = race.soul_item.as_ref()?;
    let chance = scale_common_probability(race.soul_drop_chance, grade);
    (chance > 0.0 && rng.gen::<f32>() < chance).then(|| ItemDrop {
        item: item.clone(),
        quantity: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatBlock;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn race() -> RaceDefinition {
        RaceDefinition::new("bat", "Bat", StatBlock::ZERO)
            .with_common_drop(DropEntry::new("wing", 1.0).with_quantity(2, 2))
            .with_rare_drop(DropEntry::new("fang", 1.0).with_grades(110.0, 120.0))
            .with_soul("bat_soul", 1.0)
    }

    #[test]
    fn test_certain_drops_and_grade_gate() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let variant = VariantDefinition::new("bat", "Bat", "bat").with_drop(DropEntry::new("guano", 1.0));
        let low = roll_drops(&mut rng, &race(), &variant, 100.0);
        let names: Vec<&str> = low.iter().map(|d| d.item.as_str()).collect();
        assert_eq!(names, vec!["wing", "guano"]);
        assert_eq!(low[0].quantity, 2);

        let high = roll_drops(&mut rng, &race(), &variant, 115.0);
        assert!(high.iter().any(|d| d.item.as_str() == "fang"));
    }

    #[test]
    fn test_zero_probability_never_drops() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let entry = DropEntry::new("dust", 0.0);
        for _ in 0..1_000 {
            assert!(roll_entry(&mut rng, &entry, DropTier::Common, 120.0).is_none());
        }
    }

    #[test]
    fn test_rare_scaling_is_steeper() {
        let common = DropTier::Common.scale(0.1, 120.0);
        let rare = DropTier::Rare.scale(0.1, 120.0);
        assert!(rare > common);
        assert!((DropTier::Rare.scale(0.1, 100.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_soul_requires_item() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(roll_soul(&mut rng, &race(), 100.0).is_some());
        let soulless = RaceDefinition::new("bat", "Bat", StatBlock::ZERO);
        assert!(roll_soul(&mut rng, &soulless, 100.0).is_none());
    }

    #[test]
    fn test_observed_rate_tracks_scaled_probability() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let entry = DropEntry::new("ore", 0.25);
        let hits = (0..20_000)
            .filter(|_| roll_entry(&mut rng, &entry, DropTier::Common, 120.0).is_some())
            .count();
        let rate = hits as f32 / 20_000.0;
        assert!((rate - 0.3).abs() < 0.02, "rate {rate}");
    }
}
