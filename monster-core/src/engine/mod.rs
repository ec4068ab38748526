//! Simulation engine: configuration, the owning simulation value, and the
//! bevy plugin that hosts it.
//!
//! Architecture:
//!   remote callers -> DamageRequest events -> MonsterSimPlugin
//!   MonsterSimPlugin -> SimulationResource(Arc<RwLock<MonsterSimulation>>)
//!   MonsterSimulation -> pool, timers, spawn director, collaborators

pub mod config;
pub mod plugin;
pub mod simulation;

pub use config::{NetRole, SimulationConfig};
pub use plugin::{
    DamageRequest, DamageResolved, MonsterKilled, MonsterSimPlugin, SimulationResource,
    SkillActivated,
};
pub use simulation::{MonsterSimulation, SimulationStats};

// =====================================================
// Tests
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Collaborators, DropLog, GlobalRewardLedger, NotificationLog};
    use crate::combat::{DamageOutcome, DamageType, DodgePolicy, IgnoreReason};
    use crate::content::registry::test_registry;
    use crate::content::VariantId;
    use crate::error::{ConfigError, SpawnError};
    use crate::ledger::AttackerId;
    use crate::monster::LifecyclePhase;
    use bevy::math::Vec3;
    use std::sync::Arc;

    fn test_sim(config: SimulationConfig) -> (MonsterSimulation, GlobalRewardLedger) {
        let rewards = GlobalRewardLedger::default();
        let collaborators = Collaborators::new(DropLog::default(), rewards.clone(), NotificationLog::default());
        let mut sim = MonsterSimulation::new(config, Arc::new(test_registry()), collaborators).unwrap();
        sim.set_dodge_policy(DodgePolicy::Never);
        (sim, rewards)
    }

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        // no automatic spawns unless a test asks for them
        config.spawner.spawn_interval_secs = 1.0e6;
        config
    }

    fn scout() -> VariantId {
        VariantId::new("goblin_scout")
    }

    #[test]
    fn test_spawn_activates_with_full_vitals() {
        let (mut sim, _) = test_sim(quiet_config());
        let handle = sim.spawn(&scout(), Vec3::ZERO).unwrap();
        let monster = sim.monster(handle).unwrap();
        assert_eq!(monster.phase(), LifecyclePhase::Active);
        assert_eq!(monster.hp(), monster.max_hp());
        assert_eq!(monster.mp(), monster.max_mp());
        assert!(monster.is_targetable());
        assert!(monster.skill_timer().is_some());
        assert_eq!(sim.stats().spawns, 1);
    }

    #[test]
    fn test_unknown_and_wrong_floor_variants_rejected() {
        let (mut sim, _) = test_sim(quiet_config());
        assert_eq!(
            sim.spawn(&VariantId::new("dragon"), Vec3::ZERO),
            Err(SpawnError::UnknownVariant(VariantId::new("dragon")))
        );
        // dire wolves start on floor 10
        assert!(matches!(
            sim.spawn(&VariantId::new("dire_wolf"), Vec3::ZERO),
            Err(SpawnError::WrongFloor { floor: 1, .. })
        ));
    }

    #[test]
    fn test_replica_rejects_mutations() {
        let mut config = quiet_config();
        config.role = NetRole::Replica;
        let (mut sim, _) = test_sim(config);
        assert_eq!(sim.spawn(&scout(), Vec3::ZERO), Err(SpawnError::NotAuthority));
        let outcome = sim.apply_damage(crate::monster::MonsterHandle::new(0, 1), 5.0, DamageType::True, None);
        assert_eq!(outcome, DamageOutcome::Ignored(IgnoreReason::NotAuthority));
    }

    #[test]
    fn test_dead_monster_returns_to_pool_after_delay() {
        let (mut sim, _) = test_sim(quiet_config());
        let handle = sim.spawn(&scout(), Vec3::ZERO).unwrap();
        let outcome = sim.apply_damage(handle, 1e6, DamageType::True, Some(AttackerId(1)));
        assert!(outcome.is_kill());
        assert_eq!(sim.monster(handle).unwrap().phase(), LifecyclePhase::DeadPendingReturn);

        sim.tick(1.5);
        assert!(sim.monster(handle).is_some());
        sim.tick(0.6);
        assert!(sim.monster(handle).is_none());
        assert_eq!(sim.pool().free_count(), 1);
        assert_eq!(sim.stats().returned_to_pool, 1);
    }

    #[test]
    fn test_director_spawns_on_tick() {
        let mut config = SimulationConfig::default();
        config.spawner.spawn_interval_secs = 1.0;
        config.spawner.max_concurrent = 3;
        let (mut sim, _) = test_sim(config);
        for _ in 0..10 {
            sim.tick(1.0);
        }
        assert_eq!(sim.alive_count(), 3);
        assert_eq!(sim.stats().spawns, 3);
        assert!(sim.stats().skipped_spawns > 0);
    }

    #[test]
    fn test_invalid_tick_delta_ignored() {
        let (mut sim, _) = test_sim(quiet_config());
        sim.tick(f32::NAN);
        sim.tick(-1.0);
        assert_eq!(sim.now(), 0.0);
    }

    #[test]
    fn test_grade_range_must_match_content_bounds() {
        let mut config = quiet_config();
        config.spawner.grade.mean = 140.0;
        config.spawner.grade.min = 140.0;
        config.spawner.grade.max = 180.0;
        let err = MonsterSimulation::new(config.clone(), Arc::new(test_registry()), Collaborators::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::GradeRangeMismatch { config_min, content_min, .. }
                if config_min == 140.0 && content_min == 80.0
        ));

        let matching = config.registry_builder().build().unwrap();
        assert!(MonsterSimulation::new(config, Arc::new(matching), Collaborators::default()).is_ok());
    }

    #[test]
    fn test_undrained_deaths_are_capped() {
        let mut config = quiet_config();
        config.event_queue_limit = 2;
        let (mut sim, _) = test_sim(config);
        let mut handles = Vec::new();
        for _ in 0..3 {
            let handle = sim.spawn(&scout(), Vec3::ZERO).unwrap();
            sim.apply_damage(handle, 1.0e6, DamageType::True, Some(AttackerId(1)));
            handles.push(handle);
        }
        assert_eq!(sim.stats().kills, 3);
        assert_eq!(sim.stats().dropped_events, 1);

        let kept: Vec<_> = sim.drain_deaths().into_iter().map(|r| r.handle).collect();
        assert_eq!(kept, handles[1..].to_vec());
        assert!(sim.drain_deaths().is_empty());
    }
}
