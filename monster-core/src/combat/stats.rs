//! Combat stats derived from a composed stat block.
//!
//! Formulas are fixed for balance parity; only the stability narrowing curve
//! is a local policy (see [`DamageRange::narrowed`]).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::stats::StatBlock;

/// Which range an outgoing attack rolls from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Physical,
    Magical,
}

/// `[min, max]` damage carrying the stability that narrows it
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: f32,
    pub max: f32,
    pub stability: f32,
}

impl DamageRange {
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Spread kept after stability: 1.0 at stability 0, halved at
    /// `STABILITY_CONSTANT`, approaching 0 as stability grows.
    pub fn spread_factor(&self) -> f32 {
        let stability = if self.stability.is_finite() {
            self.stability.max(0.0)
        } else {
            0.0
        };
        STABILITY_CONSTANT / (STABILITY_CONSTANT + stability)
    }

    /// Effective `(min, max)` pulled toward the midpoint, never outside the raw range
    pub fn narrowed(&self) -> (f32, f32) {
        let mid = self.midpoint();
        let k = self.spread_factor();
        let lo = (mid - (mid - self.min) * k).clamp(self.min, self.max);
        let hi = (mid + (self.max - mid) * k).clamp(self.min, self.max);
        (lo, hi)
    }

    /// Uniform roll inside the narrowed range
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = self.narrowed();
        if hi - lo <= f32::EPSILON {
            lo
        } else {
            rng.gen_range(lo..=hi)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    pub physical: DamageRange,
    pub magical: DamageRange,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub max_hp: f32,
    pub max_mp: f32,
}

/// One outgoing hit rolled for the AI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub kind: AttackKind,
    pub amount: f32,
    pub critical: bool,
}

impl CombatStats {
    pub fn range(&self, kind: AttackKind) -> &DamageRange {
        match kind {
            AttackKind::Physical => &self.physical,
            AttackKind::Magical => &self.magical,
        }
    }

    pub fn roll_attack<R: Rng + ?Sized>(&self, kind: AttackKind, rng: &mut R) -> AttackRoll {
        let base = self.range(kind).roll(rng);
        let critical = rng.gen::<f32>() < self.crit_chance;
        let amount = if critical {
            base * self.crit_multiplier
        } else {
            base
        };
        AttackRoll {
            kind,
            amount,
            critical,
        }
    }
}

/// Derive damage ranges, crit and vitals from final stats.
pub fn derive_combat_stats(stats: &StatBlock) -> CombatStats {
    let power = stats.power.max(0.0);
    let intellect = stats.intellect.max(0.0);
    let vitality = stats.vitality.max(0.0);

    CombatStats {
        physical: DamageRange {
            min: power * PHYSICAL_DAMAGE_MIN_MULT,
            max: power * PHYSICAL_DAMAGE_MAX_MULT,
            stability: stats.stability,
        },
        magical: DamageRange {
            min: intellect * MAGICAL_DAMAGE_MIN_MULT,
            max: intellect * MAGICAL_DAMAGE_MAX_MULT,
            stability: stats.stability,
        },
        crit_chance: (stats.luck * CRIT_CHANCE_PER_LUCK).clamp(0.0, 1.0),
        crit_multiplier: CRIT_DAMAGE_MULT,
        max_hp: BASE_HP + vitality * HP_PER_VITALITY,
        max_mp: BASE_MP + intellect * MP_PER_INTELLECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn block() -> StatBlock {
        StatBlock {
            power: 10.0,
            agility: 5.0,
            vitality: 20.0,
            intellect: 8.0,
            physical_defense: 5.0,
            magic_defense: 5.0,
            luck: 100.0,
            stability: 0.0,
        }
    }

    #[test]
    fn test_formulas_match_balance_sheet() {
        let combat = derive_combat_stats(&block());
        assert_eq!(combat.physical.min, 15.0);
        assert_eq!(combat.physical.max, 25.0);
        assert!((combat.magical.min - 9.6).abs() < 1e-5);
        assert!((combat.magical.max - 16.0).abs() < 1e-5);
        assert!((combat.crit_chance - 0.05).abs() < 1e-6);
        assert_eq!(combat.crit_multiplier, 2.0);
        assert_eq!(combat.max_hp, 300.0);
        assert_eq!(combat.max_mp, 90.0);
    }

    #[test]
    fn test_zero_stability_keeps_full_range() {
        let range = DamageRange {
            min: 10.0,
            max: 30.0,
            stability: 0.0,
        };
        assert_eq!(range.narrowed(), (10.0, 30.0));
    }

    #[test]
    fn test_narrowing_is_monotonic_and_bounded() {
        let mut previous_width = f32::MAX;
        for stability in [0.0, 10.0, 50.0, 100.0, 500.0, 10_000.0] {
            let range = DamageRange {
                min: 10.0,
                max: 30.0,
                stability,
            };
            let (lo, hi) = range.narrowed();
            assert!(lo >= 10.0 && hi <= 30.0 && lo <= hi);
            let width = hi - lo;
            assert!(width <= previous_width);
            previous_width = width;
        }
        let half = DamageRange {
            min: 10.0,
            max: 30.0,
            stability: 100.0,
        };
        assert_eq!(half.narrowed(), (15.0, 25.0));
    }

    #[test]
    fn test_negative_stability_treated_as_zero() {
        let range = DamageRange {
            min: 10.0,
            max: 30.0,
            stability: -50.0,
        };
        assert_eq!(range.narrowed(), (10.0, 30.0));
    }

    #[test]
    fn test_rolls_stay_inside_narrowed_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
        let range = DamageRange {
            min: 10.0,
            max: 30.0,
            stability: 60.0,
        };
        let (lo, hi) = range.narrowed();
        for _ in 0..1_000 {
            let roll = range.roll(&mut rng);
            assert!(roll >= lo && roll <= hi);
        }
    }

    #[test]
    fn test_guaranteed_crit_doubles() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut combat = derive_combat_stats(&block());
        combat.crit_chance = 1.0;
        combat.physical.stability = f32::MAX;
        let roll = combat.roll_attack(AttackKind::Physical, &mut rng);
        assert!(roll.critical);
        assert!((roll.amount - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_negative_power_does_not_invert_range() {
        let mut stats = block();
        stats.power = -4.0;
        let combat = derive_combat_stats(&stats);
        assert_eq!(combat.physical.min, 0.0);
        assert_eq!(combat.physical.max, 0.0);
    }
}
