//! Actor AI: per-archetype state machines.
//!
//! - [`brawler`]: melee and tank actors
//! - [`ranged`]: kiting archers
//!
//! # Architecture
//!
//! [`think`] runs one actor's decision for the tick. It reads the actor's own
//! persistent state plus an [`AiContext`] (target position and, for ranged
//! actors, the nearest teammate tank), then writes the actor's velocity, yaw
//! and state. Attacks are not applied here; they come back as [`Intent`]s for
//! the combat resolver.
//!
//! Only hostile, living actors think. Everything else stands still and keeps
//! whatever state it had.

pub mod brawler;
pub mod ranged;

use glam::Vec3;

use crate::config::CombatConfig;
use crate::entity::{Actor, ActorKind};
use crate::output::Intent;

/// Inputs for one actor's decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiContext {
    /// Target position (the player)
    pub target: Vec3,
    /// Nearest living teammate tank, for ranged actors
    pub tank: Option<Vec3>,
    /// Elapsed seconds
    pub dt: f32,
}

/// Runs one tick of AI for `actor`.
///
/// Updates the actor's velocity, facing and state machine.
///
/// # Returns
///
/// The attack the actor wants to make this tick, if any.
pub fn think(actor: &mut Actor, ctx: &AiContext, config: &CombatConfig) -> Option<Intent> {
    actor.velocity = Vec3::ZERO;
    if !actor.is_hostile() {
        return None;
    }

    actor.transform.face_towards(ctx.target);
    let id = actor.id();
    let position = actor.transform.position;

    let brawler_tuning = config.brawler(actor.archetype());
    match &mut actor.kind {
        ActorKind::Melee(data) | ActorKind::Tank(data) => {
            let tuning = brawler_tuning.unwrap_or(&config.melee);
            let step = brawler::update(data, tuning, position, ctx.target, ctx.dt);
            actor.velocity = step.velocity;
            step.strike.then(|| Intent::MeleeStrike {
                attacker: id,
                origin: position,
                damage: data.damage,
            })
        }
        ActorKind::Ranged(data) => {
            let step = ranged::update(data, &config.ranged, position, ctx.target, ctx.tank, ctx.dt);
            actor.velocity = step.velocity;
            step.fire.then(|| {
                let lift = Vec3::Y * config.projectile.muzzle_height;
                let origin = position + lift;
                let direction = (ctx.target + lift - origin).normalize_or_zero();
                Intent::FireProjectile {
                    owner: id,
                    origin: origin + direction * config.projectile.muzzle_offset,
                    direction,
                    damage: data.projectile_damage,
                }
            })
        }
        ActorKind::Neutral => None,
    }
}

/// Squared distance on the ground plane.
pub(crate) fn horizontal_distance_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Horizontal velocity from `from` toward `to` at `speed`.
///
/// Targets closer than 1e-4 give zero velocity.
pub(crate) fn steer(from: Vec3, to: Vec3, speed: f32) -> Vec3 {
    let offset = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let distance = offset.length();
    if distance < 1e-4 {
        Vec3::ZERO
    } else {
        offset * (speed / distance)
    }
}
