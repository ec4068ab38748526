//! Combat: derived combat stats and the authoritative damage resolver.

pub mod resolver;
pub mod stats;

pub use resolver::{
    apply_damage, dodge_chance, mitigate, mitigation_ratio, DamageOutcome, DamageType,
    DodgePolicy, IgnoreReason,
};
pub use stats::{derive_combat_stats, AttackKind, AttackRoll, CombatStats, DamageRange};
