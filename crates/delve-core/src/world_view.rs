//! `WorldView` provides read-only access to combat state for the renderer.
//!
//! Renderers and HUDs read actor placement, health-derived flags, the
//! player's hit flash and knockback, and projectile positions through this
//! view. They never get a mutable handle: every change goes through the
//! [`Simulation`](crate::simulation::Simulation).
//!
//! # Example
//!
//! ```
//! use delve_core::config::CombatConfig;
//! use delve_core::entity::Archetype;
//! use delve_core::collision::Scope;
//! use delve_core::scene::NullScene;
//! use delve_core::simulation::Simulation;
//! use delve_core::spawn::ActorSpawn;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(CombatConfig::default());
//! let id = sim.spawn(
//!     ActorSpawn::new(Archetype::Melee, Scope::Overworld, Vec3::new(3.0, 1.0, 0.0)),
//!     &mut NullScene,
//! );
//!
//! let view = sim.view();
//! let actor = view.actor(id).unwrap();
//! assert_eq!(actor.transform.position, Vec3::new(3.0, 1.0, 0.0));
//! assert!(actor.health_fraction.is_none());
//! assert!(!view.player().flashing);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::collision::Scope;
use crate::entity::{Actor, ActorId, Archetype, Combatant, Health, Player, StatusFlags, TransformState};
use crate::projectile::{ProjectileId, ProjectileTracker};

// =============================================================================
// Snapshots
// =============================================================================

/// What the renderer needs to draw one actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorVisual {
    /// Roster id
    pub id: ActorId,
    /// Model selection
    pub archetype: Archetype,
    /// Placement
    pub transform: TransformState,
    /// Remaining health in `[0, 1]`, once the actor has been engaged
    pub health_fraction: Option<f32>,
    /// Status flags (hostile, talkable, engaged highlight)
    pub flags: StatusFlags,
}

impl ActorVisual {
    fn of(actor: &Actor) -> Self {
        Self {
            id: actor.id(),
            archetype: actor.archetype(),
            transform: actor.transform,
            health_fraction: actor.health.as_ref().map(Health::fraction),
            flags: actor.flags,
        }
    }

    /// Returns `true` if the actor should be drawn with the fight highlight.
    #[must_use]
    pub fn highlighted(&self) -> bool {
        self.flags.contains(StatusFlags::ENGAGED)
    }
}

/// Player hit reaction state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerVisual {
    /// Placement
    pub transform: TransformState,
    /// Draw the hit flash this frame
    pub flashing: bool,
    /// A knockback is still pushing the player
    pub knocked_back: bool,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileVisual {
    /// Tracker id
    pub id: ProjectileId,
    /// Who fired it
    pub owner: Combatant,
    /// Current position
    pub position: Vec3,
    /// Unit flight direction, for orienting the model
    pub direction: Vec3,
}

// =============================================================================
// WorldView
// =============================================================================

/// Read-only view of the combat state at the end of a tick.
///
/// Only actors and projectiles of the active scope are visible.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    arena: &'a Arena,
    player: &'a Player,
    projectiles: &'a ProjectileTracker,
    scope: Scope,
}

impl<'a> WorldView<'a> {
    /// Creates a view of the given state.
    #[must_use]
    pub const fn new(
        arena: &'a Arena,
        player: &'a Player,
        projectiles: &'a ProjectileTracker,
        scope: Scope,
    ) -> Self {
        Self {
            arena,
            player,
            projectiles,
            scope,
        }
    }

    /// Tick the state belongs to.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Scope being rendered.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// One living actor of the active scope.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<ActorVisual> {
        self.arena
            .get(id)
            .filter(|actor| actor.scope == self.scope && actor.is_alive())
            .map(ActorVisual::of)
    }

    /// Placement of any actor, regardless of scope.
    #[must_use]
    pub fn get_transform(&self, id: ActorId) -> Option<&'a TransformState> {
        self.arena.get(id).map(|actor| &actor.transform)
    }

    /// Health pool of any actor, once it exists.
    #[must_use]
    pub fn get_health(&self, id: ActorId) -> Option<&'a Health> {
        self.arena.get(id).and_then(|actor| actor.health.as_ref())
    }

    /// Living actors of the active scope in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = ActorVisual> + 'a {
        self.arena.living_in(self.scope).map(ActorVisual::of)
    }

    /// Ids of visible actors whose center lies within `radius` of `center`
    /// on the ground plane.
    #[must_use]
    pub fn query_in_radius(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        let radius_sq = radius * radius;
        self.arena
            .living_in(self.scope)
            .filter(|actor| {
                let offset = actor.transform.position - center;
                offset.x * offset.x + offset.z * offset.z <= radius_sq
            })
            .map(Actor::id)
            .collect()
    }

    /// The player's hit reaction.
    #[must_use]
    pub fn player(&self) -> PlayerVisual {
        PlayerVisual {
            transform: self.player.transform,
            flashing: self.player.feedback.is_flashing(),
            knocked_back: self.player.feedback.knockback.is_some(),
        }
    }

    /// Projectiles of the active scope in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = ProjectileVisual> + 'a {
        let scope = self.scope;
        self.projectiles
            .iter()
            .filter(move |(_, projectile)| projectile.scope == scope)
            .map(|(id, projectile)| ProjectileVisual {
                id,
                owner: projectile.owner,
                position: projectile.position,
                direction: projectile.direction,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ActorKind;
    use crate::projectile::Projectile;

    fn arena() -> (Arena, ActorId, ActorId) {
        let mut arena = Arena::new();
        let near = arena.spawn(
            "near",
            ActorKind::Neutral,
            Scope::Dungeon,
            TransformState::at(Vec3::new(1.0, 1.0, 0.0)),
        );
        let other_scope = arena.spawn(
            "far",
            ActorKind::Neutral,
            Scope::Overworld,
            TransformState::at(Vec3::new(0.5, 1.0, 0.0)),
        );
        (arena, near, other_scope)
    }

    #[test]
    fn only_active_scope_is_visible() {
        let (arena, near, other) = arena();
        let player = Player::default();
        let projectiles = ProjectileTracker::new();
        let view = WorldView::new(&arena, &player, &projectiles, Scope::Dungeon);

        assert!(view.actor(near).is_some());
        assert!(view.actor(other).is_none());
        assert!(view.get_transform(other).is_some());
        assert_eq!(view.actors().count(), 1);
        assert_eq!(view.query_in_radius(Vec3::ZERO, 2.0), vec![near]);
    }

    #[test]
    fn health_fraction_follows_pool() {
        let (mut arena, near, _) = arena();
        let mut health = Health::full(80.0);
        health.apply_damage(20.0);
        arena.get_mut(near).unwrap().health = Some(health);

        let player = Player::default();
        let projectiles = ProjectileTracker::new();
        let view = WorldView::new(&arena, &player, &projectiles, Scope::Dungeon);

        let fraction = view.actor(near).unwrap().health_fraction.unwrap();
        assert!((fraction - 0.75).abs() < 0.0001);
        assert!((view.get_health(near).unwrap().current - 60.0).abs() < 0.0001);
    }

    #[test]
    fn player_flash_is_visible() {
        let (arena, _, _) = arena();
        let mut player = Player::default();
        player.feedback.trigger(Vec3::X, 1.5, 0.15, 0.15);
        let projectiles = ProjectileTracker::new();
        let view = WorldView::new(&arena, &player, &projectiles, Scope::Dungeon);

        let visual = view.player();
        assert!(visual.flashing);
        assert!(visual.knocked_back);
    }

    #[test]
    fn projectiles_are_filtered_by_scope() {
        let (arena, near, _) = arena();
        let player = Player::default();
        let mut projectiles = ProjectileTracker::new();
        let owner = Combatant::Actor(near);
        projectiles.spawn(Projectile::new(owner, Vec3::ZERO, Vec3::X, 16.0, 8.0, 2.5, Scope::Dungeon));
        projectiles.spawn(Projectile::new(owner, Vec3::ZERO, Vec3::X, 16.0, 8.0, 2.5, Scope::Overworld));

        let view = WorldView::new(&arena, &player, &projectiles, Scope::Dungeon);
        let visible: Vec<ProjectileVisual> = view.projectiles().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].owner, owner);
    }
}
