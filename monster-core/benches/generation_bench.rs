use std::sync::Arc;

use bevy::math::Vec3;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use monster_core::balance::{run_variant_survey, SurveyConfig};
use monster_core::collaborators::Collaborators;
use monster_core::combat::{DamageType, DodgePolicy};
use monster_core::content::{starter_registry, VariantId};
use monster_core::engine::{MonsterSimulation, SimulationConfig};
use monster_core::ledger::AttackerId;
use monster_core::monster::generate;
use monster_core::stats::GradeDistribution;

fn bench_generation(c: &mut Criterion) {
    let registry = starter_registry().unwrap();
    let wolf = registry.variant(&VariantId::new("dire_wolf")).unwrap().clone();
    let grades = GradeDistribution::default();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

    c.bench_function("generate_dire_wolf", |b| {
        b.iter(|| generate(&mut rng, &registry, black_box(&wolf), &grades).unwrap())
    });

    c.bench_function("variant_survey_1k", |b| {
        let config = SurveyConfig {
            samples: 1_000,
            ..Default::default()
        };
        b.iter(|| run_variant_survey(&registry, &VariantId::new("gray_wolf"), black_box(&config)).unwrap())
    });
}

fn quiet_sim(capacity: usize) -> MonsterSimulation {
    let mut config = SimulationConfig::default();
    config.pool_capacity = capacity;
    config.spawner.max_concurrent = capacity.min(config.spawner.max_concurrent);
    config.spawner.spawn_interval_secs = 1.0e6;
    config.return_delay_secs = 0.0;
    let registry = Arc::new(starter_registry().unwrap());
    let mut sim = MonsterSimulation::new(config, registry, Collaborators::default()).unwrap();
    sim.set_dodge_policy(DodgePolicy::Never);
    sim
}

fn bench_damage(c: &mut Criterion) {
    let scout = VariantId::new("goblin_scout");
    c.bench_function("apply_damage_until_dead", |b| {
        b.iter_batched(
            || {
                let mut sim = quiet_sim(8);
                let handle = sim.spawn(&scout, Vec3::ZERO).unwrap();
                (sim, handle)
            },
            |(mut sim, handle)| {
                let mut attacker = 0;
                while sim.monster(handle).is_some_and(|m| m.is_alive()) {
                    attacker = (attacker + 1) % 4;
                    sim.apply_damage(handle, black_box(25.0), DamageType::Physical, Some(AttackerId(attacker)));
                }
                sim
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pool_churn(c: &mut Criterion) {
    let scout = VariantId::new("goblin_scout");
    let mut sim = quiet_sim(64);
    c.bench_function("spawn_kill_return_64", |b| {
        b.iter(|| {
            for _ in 0..64 {
                let handle = sim.spawn(&scout, Vec3::ZERO).unwrap();
                sim.apply_damage(handle, 1.0e6, DamageType::True, Some(AttackerId(1)));
            }
            // zero return delay: every corpse goes back on the next tick
            sim.tick(0.0);
            sim.drain_deaths();
            sim.drain_skill_activations();
        })
    });
}

criterion_group!(benches, bench_generation, bench_damage, bench_pool_churn);
criterion_main!(benches);
