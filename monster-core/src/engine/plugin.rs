use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::combat::{DamageOutcome, DamageType};
use crate::death::DeathReport;
use crate::engine::simulation::MonsterSimulation;
use crate::ledger::AttackerId;
use crate::monster::MonsterHandle;
use crate::skills::SkillActivation;

/// Hosts a [`MonsterSimulation`] inside a bevy app.
///
/// Damage arrives as [`DamageRequest`] events and is applied in arrival order
/// before the simulation ticks; deaths and skill activations are re-published
/// as events afterwards.
pub struct MonsterSimPlugin {
    simulation: Arc<RwLock<MonsterSimulation>>,
}

impl MonsterSimPlugin {
    pub fn new(simulation: MonsterSimulation) -> Self {
        Self {
            simulation: Arc::new(RwLock::new(simulation)),
        }
    }

    /// Shared handle for callers that inspect the simulation outside bevy
    pub fn shared(&self) -> Arc<RwLock<MonsterSimulation>> {
        Arc::clone(&self.simulation)
    }
}

impl Plugin for MonsterSimPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationResource(self.shared()))
            .add_event::<DamageRequest>()
            .add_event::<DamageResolved>()
            .add_event::<MonsterKilled>()
            .add_event::<SkillActivated>()
            .add_systems(
                Update,
                (process_damage_requests, simulation_tick_system, publish_simulation_events).chain(),
            );
    }
}

#[derive(Resource)]
pub struct SimulationResource(pub Arc<RwLock<MonsterSimulation>>);

/// Remote damage request, serialized through the event queue
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: MonsterHandle,
    pub amount: f32,
    pub damage_type: DamageType,
    pub attacker: Option<AttackerId>,
}

#[derive(Event, Debug, Clone)]
pub struct DamageResolved {
    pub request: DamageRequest,
    pub outcome: DamageOutcome,
}

#[derive(Event, Debug, Clone)]
pub struct MonsterKilled(pub DeathReport);

#[derive(Event, Debug, Clone)]
pub struct SkillActivated(pub SkillActivation);

fn process_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut resolved: EventWriter<DamageResolved>,
    sim_res: Res<SimulationResource>,
) {
    let Ok(mut sim) = sim_res.0.write() else {
        return;
    };
    for request in requests.read() {
        let outcome = sim.apply_damage(
            request.target,
            request.amount,
            request.damage_type,
            request.attacker,
        );
        resolved.send(DamageResolved {
            request: request.clone(),
            outcome,
        });
    }
}

fn simulation_tick_system(time: Res<Time>, sim_res: Res<SimulationResource>) {
    if let Ok(mut sim) = sim_res.0.write() {
        sim.tick(time.delta_secs());
    }
}

fn publish_simulation_events(
    sim_res: Res<SimulationResource>,
    mut killed: EventWriter<MonsterKilled>,
    mut activated: EventWriter<SkillActivated>,
) {
    let Ok(mut sim) = sim_res.0.write() else {
        return;
    };
    for report in sim.drain_deaths() {
        killed.send(MonsterKilled(report));
    }
    for activation in sim.drain_skill_activations() {
        activated.send(SkillActivated(activation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Collaborators;
    use crate::content::registry::test_registry;
    use crate::content::VariantId;
    use crate::engine::config::SimulationConfig;

    fn app() -> (App, Arc<RwLock<MonsterSimulation>>) {
        let mut config = SimulationConfig::default();
        config.spawner.spawn_interval_secs = 1000.0;
        let sim = MonsterSimulation::new(config, Arc::new(test_registry()), Collaborators::default()).unwrap();
        let plugin = MonsterSimPlugin::new(sim);
        let shared = plugin.shared();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(plugin);
        (app, shared)
    }

    #[test]
    fn test_damage_requests_resolve_in_order() {
        let (mut app, shared) = app();
        let handle = shared
            .write()
            .unwrap()
            .spawn(&VariantId::new("goblin_scout"), Vec3::ZERO)
            .unwrap();

        app.world_mut().send_event(DamageRequest {
            target: handle,
            amount: 1e6,
            damage_type: DamageType::True,
            attacker: Some(AttackerId(1)),
        });
        app.world_mut().send_event(DamageRequest {
            target: handle,
            amount: 10.0,
            damage_type: DamageType::True,
            attacker: Some(AttackerId(2)),
        });
        // no dodges, so the first request always lands the kill
        shared
            .write()
            .unwrap()
            .set_dodge_policy(crate::combat::DodgePolicy::Never);
        app.update();

        let sim = shared.read().unwrap();
        let monster = sim.monster(handle).unwrap();
        assert!(!monster.is_alive());
        assert!(monster.ledger().contains(AttackerId(1)));
        assert!(!monster.ledger().contains(AttackerId(2)));
        assert_eq!(sim.stats().kills, 1);
    }

    #[test]
    fn test_plugin_inserts_resource() {
        let (app, _) = app();
        assert!(app.world().get_resource::<SimulationResource>().is_some());
    }
}
