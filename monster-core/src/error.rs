//! Typed failures for content loading, configuration and spawning.
//!
//! Runtime guard violations (damage to the dead, duplicate reward claims) are
//! not errors: they are recovered in place and never reach these types.

use std::path::PathBuf;

use crate::content::{RaceId, SkillId, VariantId};

/// Template validation failures, raised while building a `ContentRegistry`.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("Variant {variant} references unknown race {race}")]
    UnknownRace { variant: VariantId, race: RaceId },

    #[error("{owner} references unknown skill {skill}")]
    UnknownSkill { owner: String, skill: SkillId },

    #[error("{owner} skill {skill} grade range {min}..={max} never overlaps rollable grades {grade_min}..={grade_max}")]
    UnreachableSkill {
        owner: String,
        skill: SkillId,
        min: f32,
        max: f32,
        grade_min: f32,
        grade_max: f32,
    },

    #[error("Variant {variant} has min variance above max for {stat}")]
    InvalidVariance { variant: VariantId, stat: &'static str },

    #[error("Variant {variant} has inverted floor range {min}..={max}")]
    InvalidFloorRange { variant: VariantId, min: u32, max: u32 },

    #[error("Variant {variant} has non-positive spawn weight {weight}")]
    InvalidSpawnWeight { variant: VariantId, weight: f32 },

    #[error("{owner} has probability {value} outside 0..=1")]
    InvalidProbability { owner: String, value: f32 },

    #[error("Skill {skill} effect {effect} has inverted range {min}..={max}")]
    InvalidEffectRange {
        skill: SkillId,
        effect: String,
        min: f32,
        max: f32,
    },

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid simulation configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grade bounds inverted: min {min} > max {max}")]
    GradeBounds { min: f32, max: f32 },

    #[error("Grade distribution parameter {name} is not finite or negative: {value}")]
    GradeParameter { name: &'static str, value: f32 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be zero or more, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("Pool capacity {capacity} is below max concurrent {max_concurrent}")]
    CapacityBelowConcurrency {
        capacity: usize,
        max_concurrent: usize,
    },

    #[error("Configured grade range {config_min}..={config_max} differs from content grade bounds {content_min}..={content_max}")]
    GradeRangeMismatch {
        config_min: f32,
        config_max: f32,
        content_min: f32,
        content_max: f32,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A spawn request that could not be satisfied this cycle.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Unknown variant: {0}")]
    UnknownVariant(VariantId),

    #[error("Variant {variant} cannot spawn on floor {floor}")]
    WrongFloor { variant: VariantId, floor: u32 },

    #[error("Pool exhausted: capacity {capacity}, nothing evictable")]
    PoolExhausted { capacity: usize },

    #[error("Spawning is reserved to the authoritative server")]
    NotAuthority,
}
