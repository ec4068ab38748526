//! Centralized balance constants for the monster lifecycle core.
//!
//! Formulas in `combat`, `stats` and `loot` read from here so balance parity
//! with the content team's tables is kept in one place.

// =====================================================
// Grade
// =====================================================

/// Grade at which a race's base stats are reproduced unscaled
pub const GRADE_ANCHOR: f32 = 100.0;

/// Default lower clamp for rolled grades
pub const GRADE_MIN: f32 = 80.0;

/// Default upper clamp for rolled grades
pub const GRADE_MAX: f32 = 120.0;

/// Default mean of the grade distribution
pub const GRADE_MEAN: f32 = 100.0;

/// Default standard deviation of the grade distribution
pub const GRADE_STD_DEV: f32 = 8.0;

/// Smallest uniform sample fed to `ln` in the Box-Muller transform
pub const GRADE_UNIFORM_EPSILON: f64 = 1e-12;

// =====================================================
// Skills
// =====================================================

/// Grade points per additional optional skill
pub const OPTIONAL_SKILL_GRADE_STEP: f32 = 20.0;

/// Max extra optional skills from the random widening step
pub const OPTIONAL_SKILL_WIDEN_MAX: usize = 1;

/// HP fraction under which heal skills trigger
pub const HEAL_TRIGGER_HP_RATIO: f32 = 0.5;

// =====================================================
// Combat
// =====================================================

/// Physical damage range: power * [MIN, MAX]
pub const PHYSICAL_DAMAGE_MIN_MULT: f32 = 1.5;
pub const PHYSICAL_DAMAGE_MAX_MULT: f32 = 2.5;

/// Magical damage range: intellect * [MIN, MAX]
pub const MAGICAL_DAMAGE_MIN_MULT: f32 = 1.2;
pub const MAGICAL_DAMAGE_MAX_MULT: f32 = 2.0;

/// Critical chance per luck point (0.05%)
pub const CRIT_CHANCE_PER_LUCK: f32 = 0.0005;

/// Critical damage multiplier (2.0x), independent of stats
pub const CRIT_DAMAGE_MULT: f32 = 2.0;

/// Max HP = BASE + vitality * PER_VITALITY
pub const BASE_HP: f32 = 100.0;
pub const HP_PER_VITALITY: f32 = 10.0;

/// Max MP = BASE + intellect * PER_INTELLECT
pub const BASE_MP: f32 = 50.0;
pub const MP_PER_INTELLECT: f32 = 5.0;

/// Mitigation = defense / (defense + DEFENSE_CONSTANT)
pub const DEFENSE_CONSTANT: f32 = 100.0;

/// Dodge chance per agility point (0.1%)
pub const DODGE_CHANCE_PER_AGILITY: f32 = 0.001;

/// Floor applied to mitigated damage
pub const MIN_DAMAGE: f32 = 1.0;

/// Stability at which a damage range's spread is halved
pub const STABILITY_CONSTANT: f32 = 100.0;

// =====================================================
// Rewards & Drops
// =====================================================

/// Rare drop probability scales by (grade / anchor) ^ RARE_DROP_EXPONENT
pub const RARE_DROP_EXPONENT: f32 = 1.5;

// =====================================================
// Lifecycle
// =====================================================

/// Seconds between death and pool return
pub const POOL_RETURN_DELAY_SECS: f32 = 2.0;

/// Seconds between active-skill trigger checks
pub const SKILL_CHECK_INTERVAL_SECS: f32 = 1.0;

/// Default pool capacity
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Undrained deaths or skill activations kept before the oldest is dropped
pub const EVENT_QUEUE_LIMIT: usize = 4096;

/// Default max concurrent monsters per floor
pub const DEFAULT_MAX_CONCURRENT: usize = 24;

/// Default seconds between spawn attempts
pub const DEFAULT_SPAWN_INTERVAL_SECS: f32 = 3.0;
