//! Stat composer: race base × grade scaling + variant variance.
//!
//! The same `grade / 100` factor drives reward scaling and drop probability
//! scaling so a monster's power and its payout move together.

use rand::Rng;

use super::{Stat, StatBlock, StatVariance};
use crate::constants::{GRADE_ANCHOR, RARE_DROP_EXPONENT};

/// `grade / 100`: 1.0 reproduces the unscaled race
pub fn grade_factor(grade: f32) -> f32 {
    grade / GRADE_ANCHOR
}

/// Compose a final stat block for one instance.
pub fn compose_stats<R: Rng + ?Sized>(
    rng: &mut R,
    race_base: &StatBlock,
    grade: f32,
    variance: &StatVariance,
) -> StatBlock {
    let factor = grade_factor(grade);
    let mut out = StatBlock::ZERO;
    for stat in Stat::ALL {
        let scaled = race_base.get(stat) * factor;
        let jitter = uniform(rng, variance.min.get(stat), variance.max.get(stat));
        out.set(stat, scaled + jitter);
    }
    out
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Experience or currency reward scaled by grade (rounded to whole units)
pub fn scale_reward(base: u32, grade: f32) -> u32 {
    (base as f32 * grade_factor(grade)).round().max(0.0) as u32
}

/// Common and variant drop probability, linear in grade
pub fn scale_common_probability(probability: f32, grade: f32) -> f32 {
    (probability * grade_factor(grade)).clamp(0.0, 1.0)
}

/// Rare drop probability, super-linear in grade
pub fn scale_rare_probability(probability: f32, grade: f32) -> f32 {
    let factor = grade_factor(grade).max(0.0).powf(RARE_DROP_EXPONENT);
    (probability * factor).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn race_base() -> StatBlock {
        StatBlock {
            power: 12.0,
            agility: 7.0,
            vitality: 20.0,
            intellect: 3.0,
            physical_defense: 15.0,
            magic_defense: 4.0,
            luck: 10.0,
            stability: 30.0,
        }
    }

    #[test]
    fn test_grade_100_zero_variance_reproduces_base() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let base = race_base();
        let out = compose_stats(&mut rng, &base, 100.0, &StatVariance::none());
        assert_eq!(out, base);
    }

    #[test]
    fn test_grade_scales_proportionally() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let base = race_base();
        let low = compose_stats(&mut rng, &base, 80.0, &StatVariance::none());
        let high = compose_stats(&mut rng, &base, 120.0, &StatVariance::none());
        assert!((low.power - 9.6).abs() < 1e-4);
        assert!((high.vitality - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_variance_stays_within_bounds() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let base = race_base();
        let variance = StatVariance {
            min: StatBlock::splat(-1.0),
            max: StatBlock::splat(3.0),
        };
        for _ in 0..500 {
            let out = compose_stats(&mut rng, &base, 100.0, &variance);
            for (stat, value) in out.iter() {
                let delta = value - base.get(stat);
                assert!((-1.0 - 1e-4..=3.0 + 1e-4).contains(&delta), "{stat:?} delta {delta}");
            }
        }
    }

    #[test]
    fn test_reward_scaling() {
        assert_eq!(scale_reward(100, 100.0), 100);
        assert_eq!(scale_reward(100, 120.0), 120);
        assert_eq!(scale_reward(50, 80.0), 40);
    }

    #[test]
    fn test_rare_probability_is_super_linear() {
        let common = scale_common_probability(0.1, 120.0);
        let rare = scale_rare_probability(0.1, 120.0);
        assert!(rare > common);
        let expected = 0.1 * 1.2f32.powf(1.5);
        assert!((rare - expected).abs() < 1e-6);
        assert!((scale_rare_probability(0.1, 100.0) - 0.1).abs() < 1e-6);
        assert_eq!(scale_rare_probability(0.9, 120.0), 1.0f32.min(0.9 * 1.2f32.powf(1.5)));
    }
}
