use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info, warn};

use monster_core::balance::{run_variant_survey, SurveyConfig};
use monster_core::collaborators::Collaborators;
use monster_core::combat::DamageType;
use monster_core::content::{starter_pack, ContentPack, ContentRegistry};
use monster_core::engine::{
    DamageRequest, MonsterKilled, MonsterSimPlugin, MonsterSimulation, SimulationConfig,
    SimulationResource,
};
use monster_core::ledger::AttackerId;
use monster_core::logging::{init_tracing, LoggingPlugin, TracingConfig};

const DEFAULT_RUN_SECS: f32 = 10.0;
const SURVEY_SAMPLES: u64 = 2_000;

fn main() -> Result<()> {
    let tracing_config = TracingConfig::default();
    init_tracing(&tracing_config);

    let config = load_config()?;
    let registry = Arc::new(load_content(&config)?);
    let run_secs = run_duration()?;

    print_survey(&registry, &config)?;

    let simulation = MonsterSimulation::new(config.clone(), Arc::clone(&registry), Collaborators::default())
        .context("building monster simulation")?;
    let plugin = MonsterSimPlugin::new(simulation);
    let shared = plugin.shared();

    info!(
        floor = config.spawner.floor,
        tick_rate = config.tick_rate,
        run_secs,
        "Starting headless soak"
    );

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(
            config.tick_interval_secs(),
        ))))
        .add_plugins(LoggingPlugin {
            config: tracing_config,
        })
        .add_plugins(plugin)
        .insert_resource(SoakRun {
            rng: Xoshiro256PlusPlus::seed_from_u64(config.world_seed ^ 0x5eed),
            attackers: 4,
            elapsed: 0.0,
            run_secs,
        })
        .add_systems(Update, (soak_attackers, log_kills, stop_after_run))
        .run();

    match shared.read() {
        Ok(sim) => {
            let stats = sim.stats();
            let pool = sim.pool().stats();
            info!(
                spawns = stats.spawns,
                kills = stats.kills,
                evictions = stats.evictions,
                skipped_spawns = stats.skipped_spawns,
                rewards_granted = stats.rewards_granted,
                rewards_rejected = stats.rewards_rejected,
                drops_emitted = stats.drops_emitted,
                stale_timers = stats.stale_timers,
                returned = stats.returned_to_pool,
                skill_activations = stats.skill_activations,
                dropped_events = stats.dropped_events,
                "Soak finished"
            );
            info!(
                constructed = pool.constructed,
                reused = pool.reused,
                released = pool.released,
                in_use = sim.pool().in_use_count(),
                "Pool usage"
            );
        }
        Err(_) => warn!("Simulation lock poisoned; no final stats"),
    }
    Ok(())
}

fn load_config() -> Result<SimulationConfig> {
    match std::env::var_os("MONSTER_SIM_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            SimulationConfig::from_json_file(&path)
                .with_context(|| format!("loading simulation config from {}", path.display()))
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn load_content(config: &SimulationConfig) -> Result<ContentRegistry> {
    match std::env::var_os("MONSTER_SIM_CONTENT") {
        Some(path) => {
            let path = PathBuf::from(path);
            let pack = ContentPack::from_path(&path)
                .with_context(|| format!("reading content pack {}", path.display()))?;
            pack.into_builder(config.registry_builder())
                .build()
                .with_context(|| format!("validating content pack {}", path.display()))
        }
        None => starter_pack()
            .into_builder(config.registry_builder())
            .build()
            .context("building starter bestiary"),
    }
}

fn run_duration() -> Result<f32> {
    match std::env::var("MONSTER_SIM_SECONDS") {
        Ok(value) => value
            .parse::<f32>()
            .with_context(|| format!("MONSTER_SIM_SECONDS is not a number: {value}")),
        Err(_) => Ok(DEFAULT_RUN_SECS),
    }
}

fn print_survey(registry: &ContentRegistry, config: &SimulationConfig) -> Result<()> {
    let survey = SurveyConfig {
        samples: SURVEY_SAMPLES,
        base_seed: config.world_seed,
        grades: config.spawner.grade,
        ..Default::default()
    };
    for variant in registry.variants_for_floor(config.spawner.floor) {
        let report = run_variant_survey(registry, &variant.id, &survey)
            .with_context(|| format!("surveying {}", variant.id))?;
        info!(
            variant = %report.variant,
            grade = %format!("{:.1} ± {:.1}", report.grade.mean, report.grade.std_dev),
            hp = %format!("{:.0} [{:.0}, {:.0}]", report.max_hp.mean, report.max_hp.min, report.max_hp.max),
            physical = report.physical_damage.mean,
            magical = report.magical_damage.mean,
            skills = ?report.skill_histogram,
            hits_to_kill = report.hits_to_kill.mean,
            difficulty = ?report.difficulty,
            "Survey"
        );
    }
    Ok(())
}

// =====================================================
// Soak systems
// =====================================================

#[derive(Resource)]
struct SoakRun {
    rng: Xoshiro256PlusPlus,
    attackers: u64,
    elapsed: f32,
    run_secs: f32,
}

/// Each frame, a random attacker swings at a random live monster
fn soak_attackers(
    mut soak: ResMut<SoakRun>,
    sim_res: Res<SimulationResource>,
    mut requests: EventWriter<DamageRequest>,
) {
    let targets = match sim_res.0.read() {
        Ok(sim) => sim.alive_handles(),
        Err(_) => return,
    };
    if targets.is_empty() {
        return;
    }
    let soak = &mut *soak;
    let target = targets[soak.rng.gen_range(0..targets.len())];
    let damage_type = match soak.rng.gen_range(0..3) {
        0 => DamageType::Physical,
        1 => DamageType::Magical,
        _ => DamageType::True,
    };
    requests.send(DamageRequest {
        target,
        amount: soak.rng.gen_range(10.0..80.0),
        damage_type,
        attacker: Some(AttackerId(soak.rng.gen_range(1..=soak.attackers))),
    });
}

fn log_kills(mut killed: EventReader<MonsterKilled>) {
    for MonsterKilled(report) in killed.read() {
        debug!(
            handle = %report.handle,
            kill = %report.kill,
            rewarded = report.rewarded.len(),
            drops = report.drop_count(),
            "Kill"
        );
    }
}

fn stop_after_run(time: Res<Time>, mut soak: ResMut<SoakRun>, mut exit: EventWriter<AppExit>) {
    soak.elapsed += time.delta_secs();
    if soak.elapsed >= soak.run_secs {
        exit.send(AppExit::Success);
    }
}
