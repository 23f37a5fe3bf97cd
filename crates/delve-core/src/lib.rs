//! # Delve Core
//!
//! Real-time combat core for the Delve dungeon crawler.
//!
//! This crate owns everything that happens between a player swinging a sword
//! and a monster dropping its gold: box collision, actor AI, projectiles and
//! combat resolution. Rendering, input, audio and level generation live in the
//! host and talk to the core through a few narrow seams.
//!
//! ## Architecture
//!
//! - **Entities**: Actors (melee, tank, ranged, neutral) and the player body
//! - **Collision**: Oriented boxes on the ground plane, separated with SAT
//! - **AI**: Per-archetype state machines emitting velocities and intents
//! - **Resolver**: Attack events, the engagement, kills and difficulty
//! - **Simulation**: The fixed-order tick that drives all of the above
//!
//! The host plugs in through [`stats::PlayerStats`] for health and economy
//! and [`scene::SceneHooks`] for adding and removing visuals.
//!
//! ## Usage
//!
//! ```
//! use delve_core::{ActorSpawn, Archetype, BasicPlayerStats, CombatConfig, NullScene, Scope, Simulation};
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(CombatConfig::default());
//! let mut stats = BasicPlayerStats::default();
//! sim.spawn(
//!     ActorSpawn::new(Archetype::Melee, Scope::Overworld, Vec3::new(8.0, 1.0, 0.0)).hostile(true),
//!     &mut NullScene,
//! );
//!
//! let report = sim.step(1.0 / 60.0, &[], &mut stats, &mut NullScene);
//! assert_eq!(report.tick, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Core modules
pub mod arena;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod output;
pub mod projectile;
pub mod stats;

// Behaviour and resolution
pub mod ai;
pub mod resolver;
pub mod spawn;

// Host seams and the tick
pub mod scene;
pub mod simulation;
pub mod world_view;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use collision::{Collider, ColliderOwner, CollisionWorld, Scope, StaticGeometry, StaticId};
pub use config::CombatConfig;
pub use entity::{Actor, ActorId, ActorKind, Archetype, Combatant, Player, StatusFlags, TeamId};
pub use error::{CombatError, CombatResult, ConfigError};
pub use output::{Event, EventLog, PlayerAction, SpawnRequest, TickReport};
pub use projectile::{ProjectileId, ProjectileTracker};
pub use resolver::CombatResolver;
pub use scene::{NullScene, SceneHooks, SceneObject};
pub use simulation::Simulation;
pub use spawn::ActorSpawn;
pub use stats::{BasicPlayerStats, PlayerStats, Weapon};
pub use world_view::WorldView;
