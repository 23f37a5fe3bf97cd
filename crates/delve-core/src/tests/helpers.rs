//! Test helper functions for setting up simulations and actors.
//!
//! This module provides factory functions and setup utilities that make
//! writing scenario tests more ergonomic and consistent.

use glam::Vec3;

use crate::collision::Scope;
use crate::config::CombatConfig;
use crate::entity::{ActorId, Archetype};
use crate::output::{Event, PlayerAction};
use crate::scene::{SceneHooks, SceneObject};
use crate::simulation::Simulation;
use crate::spawn::ActorSpawn;
use crate::stats::{BasicPlayerStats, Weapon};

// =============================================================================
// Scenario Setup
// =============================================================================

/// Installs a test-writer subscriber so `tracing` output shows up on failure.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Creates a simulation with default balance and a fresh character.
pub fn new_sim() -> (Simulation, BasicPlayerStats) {
    init_tracing();
    (Simulation::new(CombatConfig::default()), BasicPlayerStats::default())
}

/// Creates a simulation with the given reward seed.
pub fn seeded_sim(seed: u64) -> (Simulation, BasicPlayerStats) {
    init_tracing();
    let config = CombatConfig {
        seed,
        ..CombatConfig::default()
    };
    (Simulation::new(config), BasicPlayerStats::default())
}

// =============================================================================
// Actor Factory Functions
// =============================================================================

/// Spawns a hostile, teamless actor in `scope`.
pub fn spawn_hostile(sim: &mut Simulation, archetype: Archetype, scope: Scope, position: Vec3) -> ActorId {
    sim.spawn(
        ActorSpawn::new(archetype, scope, position).hostile(true),
        &mut RecordingScene::default(),
    )
}

/// Spawns a calm team of actors in the overworld.
///
/// # Returns
///
/// The new ids in spawn order.
pub fn spawn_team(sim: &mut Simulation, team: &str, members: &[(Archetype, Vec3)]) -> Vec<ActorId> {
    members
        .iter()
        .map(|(archetype, position)| {
            sim.spawn(
                ActorSpawn::new(*archetype, Scope::Overworld, *position).team(team),
                &mut RecordingScene::default(),
            )
        })
        .collect()
}

// =============================================================================
// Player Actions
// =============================================================================

/// A sword swing from the player's chest height.
pub fn swing(damage: f32) -> PlayerAction {
    PlayerAction::Melee {
        origin: Vec3::new(0.0, 1.0, 0.0),
        range: 5.0,
        damage,
        weapon: Weapon::Sword,
    }
}

/// A bow shot from the origin.
pub fn shot(direction: Vec3, damage: f32) -> PlayerAction {
    PlayerAction::Shoot {
        origin: Vec3::new(0.0, 1.0, 0.0),
        direction,
        damage,
        weapon: Weapon::Bow,
    }
}

// =============================================================================
// Running
// =============================================================================

/// Steps `ticks` times with no player input.
///
/// # Returns
///
/// Every event of every tick, in order.
pub fn run_idle(sim: &mut Simulation, stats: &mut BasicPlayerStats, ticks: usize, dt: f32) -> Vec<Event> {
    let mut scene = RecordingScene::default();
    (0..ticks)
        .flat_map(|_| sim.step(dt, &[], stats, &mut scene).events)
        .collect()
}

/// Current position of an actor.
///
/// # Panics
///
/// Panics if the actor is not in the roster.
pub fn position(sim: &Simulation, id: ActorId) -> Vec3 {
    sim.arena()
        .get(id)
        .map(|actor| actor.transform.position)
        .expect("actor should exist")
}

/// Current health of an actor, if it has a pool.
pub fn health(sim: &Simulation, id: ActorId) -> Option<f32> {
    sim.view().get_health(id).map(|h| h.current)
}

/// Horizontal distance between two points.
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(a.x - b.x, 0.0, a.z - b.z).length()
}

// =============================================================================
// Scene Recording
// =============================================================================

/// Scene that records every call.
#[derive(Debug, Default)]
pub struct RecordingScene {
    /// Objects added, with their scope
    pub added: Vec<(SceneObject, Scope)>,
    /// Objects removed
    pub removed: Vec<SceneObject>,
}

impl RecordingScene {
    /// Objects added and not yet removed.
    pub fn live(&self) -> Vec<SceneObject> {
        self.added
            .iter()
            .map(|(object, _)| *object)
            .filter(|object| !self.removed.contains(object))
            .collect()
    }
}

impl SceneHooks for RecordingScene {
    fn add_object(&mut self, object: SceneObject, scope: Scope) {
        self.added.push((object, scope));
    }

    fn remove_object(&mut self, object: SceneObject) {
        self.removed.push(object);
    }
}
