//! Grade roller: bounded pseudo-normal difficulty per monster instance.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{GRADE_MAX, GRADE_MEAN, GRADE_MIN, GRADE_STD_DEV, GRADE_UNIFORM_EPSILON};
use crate::error::ConfigError;

/// Parameters of the grade distribution (part of the spawner config surface)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeDistribution {
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for GradeDistribution {
    fn default() -> Self {
        Self {
            mean: GRADE_MEAN,
            std_dev: GRADE_STD_DEV,
            min: GRADE_MIN,
            max: GRADE_MAX,
        }
    }
}

impl GradeDistribution {
    /// Degenerate distribution that always yields `grade`
    pub fn fixed(grade: f32) -> Self {
        Self {
            mean: grade,
            std_dev: 0.0,
            min: grade,
            max: grade,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("mean", self.mean),
            ("std_dev", self.std_dev),
            ("min", self.min),
            ("max", self.max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::GradeParameter { name, value });
            }
        }
        if self.min > self.max {
            return Err(ConfigError::GradeBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, grade: f32) -> bool {
        grade >= self.min && grade <= self.max
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        roll_grade(rng, self.mean, self.std_dev, self.min, self.max)
    }
}

/// Sample a standard normal with the Box-Muller transform.
///
/// `u1` is nudged off zero before the logarithm.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(GRADE_UNIFORM_EPSILON);
    let u2: f64 = rng.gen::<f64>();
    box_muller(u1, u2)
}

fn box_muller(u1: f64, u2: f64) -> f64 {
    let u1 = u1.clamp(GRADE_UNIFORM_EPSILON, 1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Roll a grade ~ N(mean, std_dev) clamped to `[min, max]`.
pub fn roll_grade<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if !(std_dev > 0.0) || !std_dev.is_finite() {
        return clamp_finite(mean, lo, hi);
    }
    let z = standard_normal(rng);
    let raw = mean as f64 + z * std_dev as f64;
    clamp_finite(raw as f32, lo, hi)
}

fn clamp_finite(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        return (lo + hi) * 0.5;
    }
    value.clamp(lo, hi)
}
