//! Monte-Carlo variant survey
//!
//! Generates many monsters of one variant across CPU cores and summarizes
//! how tough they come out: grade, HP and damage spread, skill counts, and how
//! many hits a reference attack needs to bring one down.
//! Each sample gets its own RNG seeded from `sha3(base_seed, index)`, so a
//! survey is reproducible regardless of how rayon splits the work.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::combat::{dodge_chance, mitigate, DamageType};
use crate::constants::MIN_DAMAGE;
use crate::content::{ContentRegistry, VariantId};
use crate::error::SpawnError;
use crate::logging::OperationSpan;
use crate::monster::generate;
use crate::stats::GradeDistribution;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub samples: u64,
    pub base_seed: u64,
    pub grades: GradeDistribution,
    /// Damage of the reference hit used for hits-to-kill
    pub reference_attack: f32,
    pub reference_type: DamageType,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            samples: 10_000,
            base_seed: 42,
            grades: GradeDistribution::default(),
            reference_attack: 40.0,
            reference_type: DamageType::Physical,
        }
    }
}

/// One generated monster, reduced to the numbers the survey cares about
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveySample {
    pub grade: f32,
    pub max_hp: f32,
    pub physical_mid: f32,
    pub magical_mid: f32,
    pub skill_count: usize,
    /// Expected reference hits to kill, dodges included
    pub hits_to_kill: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl Summary {
    fn of(values: impl Iterator<Item = f32> + Clone) -> Self {
        let count = values.clone().count();
        if count == 0 {
            return Self::default();
        }
        let n = count as f64;
        let mean = values.clone().map(f64::from).sum::<f64>() / n;
        let variance = values
            .clone()
            .map(|v| (f64::from(v) - mean).powi(2))
            .sum::<f64>()
            / n;
        let (min, max) = values.fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self {
            mean: mean as f32,
            std_dev: variance.sqrt() as f32,
            min,
            max,
        }
    }
}

/// Coarse rating from mean hits-to-kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Trivial, // < 3 hits
    Easy,    // < 6
    Normal,  // < 12
    Hard,    // < 25
    Brutal,
}

impl Difficulty {
    pub fn from_hits(hits: f32) -> Self {
        if hits < 3.0 {
            Difficulty::Trivial
        } else if hits < 6.0 {
            Difficulty::Easy
        } else if hits < 12.0 {
            Difficulty::Normal
        } else if hits < 25.0 {
            Difficulty::Hard
        } else {
            Difficulty::Brutal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub variant: VariantId,
    pub samples: u64,
    pub grade: Summary,
    pub max_hp: Summary,
    pub physical_damage: Summary,
    pub magical_damage: Summary,
    pub skill_count: Summary,
    pub hits_to_kill: Summary,
    /// `skill_histogram[n]` = samples that rolled exactly `n` skills
    pub skill_histogram: Vec<u64>,
    pub difficulty: Difficulty,
}

/// Per-sample seed: first eight bytes of `sha3_256(base_seed || index)`
pub fn sample_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate `config.samples` monsters of `variant` in parallel and summarize them.
pub fn run_variant_survey(
    registry: &ContentRegistry,
    variant: &VariantId,
    config: &SurveyConfig,
) -> Result<SurveyReport, SpawnError> {
    let _span = OperationSpan::new("variant_survey");
    let definition = registry
        .variant(variant)
        .ok_or_else(|| SpawnError::UnknownVariant(variant.clone()))?;

    let samples: Vec<SurveySample> = (0..config.samples)
        .into_par_iter()
        .map(|index| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(sample_seed(config.base_seed, index));
            let monster = generate(&mut rng, registry, definition, &config.grades)?;

            let per_hit = mitigate(config.reference_attack, config.reference_type, &monster.stats)
                .max(MIN_DAMAGE);
            let hit_rate = 1.0 - dodge_chance(monster.stats.agility);
            let hits = (monster.combat.max_hp / per_hit).ceil() / hit_rate.max(f32::EPSILON);

            Ok(SurveySample {
                grade: monster.grade,
                max_hp: monster.combat.max_hp,
                physical_mid: monster.combat.physical.midpoint(),
                magical_mid: monster.combat.magical.midpoint(),
                skill_count: monster.skills.len(),
                hits_to_kill: hits,
            })
        })
        .collect::<Result<_, SpawnError>>()?;

    let report = summarize(variant.clone(), &samples);
    tracing::info!(
        variant = %variant,
        samples = report.samples,
        mean_grade = report.grade.mean,
        mean_hp = report.max_hp.mean,
        difficulty = ?report.difficulty,
        "Variant survey complete"
    );
    Ok(report)
}

fn summarize(variant: VariantId, samples: &[SurveySample]) -> SurveyReport {
    let max_skills = samples.iter().map(|s| s.skill_count).max().unwrap_or(0);
    let mut skill_histogram = vec![0u64; max_skills + 1];
    for sample in samples {
        skill_histogram[sample.skill_count] += 1;
    }

    let hits_to_kill = Summary::of(samples.iter().map(|s| s.hits_to_kill));
    SurveyReport {
        variant,
        samples: samples.len() as u64,
        grade: Summary::of(samples.iter().map(|s| s.grade)),
        max_hp: Summary::of(samples.iter().map(|s| s.max_hp)),
        physical_damage: Summary::of(samples.iter().map(|s| s.physical_mid)),
        magical_damage: Summary::of(samples.iter().map(|s| s.magical_mid)),
        skill_count: Summary::of(samples.iter().map(|s| s.skill_count as f32)),
        hits_to_kill,
        skill_histogram,
        difficulty: Difficulty::from_hits(hits_to_kill.mean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::registry::test_registry;

    fn small(samples: u64) -> SurveyConfig {
        SurveyConfig {
            samples,
            ..Default::default()
        }
    }

    #[test]
    fn test_survey_small() {
        let registry = test_registry();
        let report = run_variant_survey(&registry, &VariantId::new("goblin_scout"), &small(200)).unwrap();
        assert_eq!(report.samples, 200);
        assert!(report.max_hp.mean > 0.0);
        assert!(report.max_hp.max >= report.max_hp.min);
        assert_eq!(report.skill_histogram.iter().sum::<u64>(), 200);
        assert!(report.hits_to_kill.min >= 1.0);
    }

    #[test]
    fn test_grades_stay_in_bounds() {
        let registry = test_registry();
        let report = run_variant_survey(&registry, &VariantId::new("gray_wolf"), &small(2_000)).unwrap();
        assert!(report.grade.min >= 80.0);
        assert!(report.grade.max <= 120.0);
        assert!((report.grade.mean - 100.0).abs() < 1.0, "mean {}", report.grade.mean);
        assert!(report.grade.std_dev > 0.0);
    }

    #[test]
    fn test_deterministic_results() {
        let registry = test_registry();
        let variant = VariantId::new("skeleton_mage");
        let r1 = run_variant_survey(&registry, &variant, &small(300)).unwrap();
        let r2 = run_variant_survey(&registry, &variant, &small(300)).unwrap();
        assert_eq!(r1.max_hp, r2.max_hp);
        assert_eq!(r1.skill_histogram, r2.skill_histogram);
    }

    #[test]
    fn test_unknown_variant() {
        let registry = test_registry();
        let err = run_variant_survey(&registry, &VariantId::new("dragon"), &small(10)).unwrap_err();
        assert_eq!(err, SpawnError::UnknownVariant(VariantId::new("dragon")));
    }

    #[test]
    fn test_sample_seed_varies_by_index() {
        assert_eq!(sample_seed(42, 7), sample_seed(42, 7));
        assert_ne!(sample_seed(42, 7), sample_seed(42, 8));
        assert_ne!(sample_seed(42, 7), sample_seed(43, 7));
    }

    #[test]
    fn test_difficulty_thresholds() {
        assert_eq!(Difficulty::from_hits(1.0), Difficulty::Trivial);
        assert_eq!(Difficulty::from_hits(5.9), Difficulty::Easy);
        assert_eq!(Difficulty::from_hits(11.0), Difficulty::Normal);
        assert_eq!(Difficulty::from_hits(24.0), Difficulty::Hard);
        assert_eq!(Difficulty::from_hits(40.0), Difficulty::Brutal);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::of(std::iter::empty());
        assert_eq!(summary, Summary::default());
    }
}
