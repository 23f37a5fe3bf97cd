//! Projectile tracker.
//!
//! Projectiles are points moving in a straight line. Each tick the tracker ages
//! them, moves the survivors and asks the collision engine whether the new
//! position lies inside a volume.
//!
//! # Hit order
//!
//! Actor-fired projectiles test, in order:
//! 1. the player's box (a hit, which carries damage)
//! 2. any other actor's box (blocked, no damage)
//! 3. active static geometry (blocked)
//!
//! Player-fired projectiles are visual: their damage is settled by the ray test
//! when they are fired, so they only test steps 2 and 3 to know where to stop.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{contains_point, Collider, ColliderOwner, CollisionWorld, Scope};
use crate::entity::{ActorId, Combatant};

/// Unique identifier for a projectile.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(u64);

impl ProjectileId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectileId({})", self.0)
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point-like moving hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Who fired it
    pub owner: Combatant,
    /// Where it was fired from
    pub origin: Vec3,
    /// Current position
    pub position: Vec3,
    /// Unit direction of travel
    pub direction: Vec3,
    /// Units per second
    pub speed: f32,
    /// Damage dealt to the player on a hit
    pub damage: f32,
    /// Seconds since it was fired
    pub age: f32,
    /// Removed once `age` exceeds this
    pub lifetime: f32,
    /// Scope it was fired in
    pub scope: Scope,
}

impl Projectile {
    /// Creates a projectile at `origin`.
    ///
    /// A zero `direction` leaves the projectile stationary until it expires.
    #[must_use]
    pub fn new(
        owner: Combatant,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
        damage: f32,
        lifetime: f32,
        scope: Scope,
    ) -> Self {
        Self {
            owner,
            origin,
            position: origin,
            direction: direction.normalize_or_zero(),
            speed,
            damage,
            age: 0.0,
            lifetime,
            scope,
        }
    }

    /// Returns `true` for projectiles that can hurt the player.
    #[must_use]
    pub const fn is_hostile_to_player(&self) -> bool {
        matches!(self.owner, Combatant::Actor(_))
    }
}

/// What ended a projectile's flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImpactKind {
    /// Entered the player's box
    Player,
    /// Stopped by an actor or static volume
    Blocked(ColliderOwner),
    /// Outlived its lifetime
    Expired,
}

/// A projectile removed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileImpact {
    /// The removed projectile
    pub id: ProjectileId,
    /// Who fired it
    pub owner: Combatant,
    /// Where it ended
    pub position: Vec3,
    /// Damage it carried
    pub damage: f32,
    /// Why it ended
    pub kind: ImpactKind,
}

impl ProjectileImpact {
    /// Returns the firing actor for hits on the player.
    #[must_use]
    pub const fn player_hit_by(&self) -> Option<ActorId> {
        match (self.kind, self.owner) {
            (ImpactKind::Player, Combatant::Actor(id)) => Some(id),
            _ => None,
        }
    }
}

/// Volumes a projectile can run into this tick.
#[derive(Debug, Clone, Copy)]
pub struct HitVolumes<'a> {
    /// The player's collider, if the player can be hit
    pub player: Option<&'a Collider>,
    /// Colliders of living actors in the active scope
    pub actors: &'a [Collider],
    /// Static geometry source
    pub world: &'a CollisionWorld,
}

impl HitVolumes<'_> {
    fn first_hit(&self, projectile: &Projectile) -> Option<ImpactKind> {
        let tolerance = self.world.tuning().containment_tolerance;
        let point = projectile.position;

        if projectile.is_hostile_to_player() {
            if let Some(player) = self.player {
                if contains_point(player, point, tolerance) {
                    return Some(ImpactKind::Player);
                }
            }
        }

        let shooter = projectile.owner.actor().map(ColliderOwner::Actor);
        if let Some(actor) = self
            .actors
            .iter()
            .filter(|actor| Some(actor.owner()) != shooter)
            .find(|actor| contains_point(actor, point, tolerance))
        {
            return Some(ImpactKind::Blocked(actor.owner()));
        }

        self.world
            .static_containing(point)
            .map(|id| ImpactKind::Blocked(ColliderOwner::Static(id)))
    }
}

/// Live projectiles in deterministic id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileTracker {
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_id: u64,
}

impl ProjectileTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a projectile.
    pub fn spawn(&mut self, projectile: Projectile) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id += 1;
        self.projectiles.insert(id, projectile);
        id
    }

    /// Returns a projectile by id.
    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Iterates live projectiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileId, &Projectile)> + '_ {
        self.projectiles.iter().map(|(id, p)| (*id, p))
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Returns `true` if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Ages, moves and hit-tests every projectile in the active scope.
    ///
    /// Projectiles from other scopes are left frozen.
    ///
    /// # Returns
    ///
    /// Every projectile removed this tick, in id order.
    pub fn advance(&mut self, dt: f32, volumes: &HitVolumes<'_>) -> Vec<ProjectileImpact> {
        let active = volumes.world.active_scope();
        let mut impacts = Vec::new();

        for (&id, projectile) in &mut self.projectiles {
            if projectile.scope != active {
                continue;
            }

            projectile.age += dt;
            let kind = if projectile.age > projectile.lifetime {
                Some(ImpactKind::Expired)
            } else {
                projectile.position += projectile.direction * (projectile.speed * dt);
                volumes.first_hit(projectile)
            };

            if let Some(kind) = kind {
                impacts.push(ProjectileImpact {
                    id,
                    owner: projectile.owner,
                    position: projectile.position,
                    damage: projectile.damage,
                    kind,
                });
            }
        }

        for impact in &impacts {
            self.projectiles.remove(&impact.id);
        }
        impacts
    }

    /// Drops every projectile fired in `scope`.
    ///
    /// # Returns
    ///
    /// Ids of the dropped projectiles.
    pub fn clear_scope(&mut self, scope: Scope) -> Vec<ProjectileId> {
        let dropped: Vec<ProjectileId> = self
            .projectiles
            .iter()
            .filter(|(_, p)| p.scope == scope)
            .map(|(id, _)| *id)
            .collect();
        for id in &dropped {
            self.projectiles.remove(id);
        }
        dropped
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::StaticGeometry;
    use crate::entity::TransformState;

    fn arrow(owner: Combatant, origin: Vec3, direction: Vec3) -> Projectile {
        Projectile::new(owner, origin, direction, 16.0, 8.0, 2.5, Scope::Overworld)
    }

    fn enemy(id: u64) -> Combatant {
        Combatant::Actor(ActorId::new(id))
    }

    fn box_at(world: &CollisionWorld, owner: ColliderOwner, position: Vec3) -> Collider {
        world.build_collider(owner, &TransformState::at(position), Vec3::ONE)
    }

    mod lifetime_tests {
        use super::*;

        #[test]
        fn expires_only_after_lifetime() {
            let world = CollisionWorld::default();
            let volumes = HitVolumes {
                player: None,
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));

            for _ in 0..5 {
                assert!(tracker.advance(0.5, &volumes).is_empty());
            }
            assert_eq!(tracker.len(), 1);

            let impacts = tracker.advance(0.5, &volumes);
            assert_eq!(impacts.len(), 1);
            assert_eq!(impacts[0].kind, ImpactKind::Expired);
            assert!(tracker.is_empty());
        }

        #[test]
        fn expired_projectile_does_not_move() {
            let world = CollisionWorld::default();
            let volumes = HitVolumes {
                player: None,
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));

            let impacts = tracker.advance(3.0, &volumes);
            assert_eq!(impacts[0].position, Vec3::ZERO);
        }

        #[test]
        fn moves_along_direction() {
            let world = CollisionWorld::default();
            let volumes = HitVolumes {
                player: None,
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            let id = tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)));

            tracker.advance(0.25, &volumes);
            let projectile = tracker.get(id).unwrap();
            assert!((projectile.position - Vec3::new(0.0, 0.0, 4.0)).length() < 0.0001);
        }
    }

    mod hit_order_tests {
        use super::*;

        #[test]
        fn enemy_projectile_hits_player_first() {
            let world = CollisionWorld::default();
            let player = box_at(&world, ColliderOwner::Player, Vec3::new(1.0, 0.0, 0.0));
            let blocker = box_at(&world, ColliderOwner::Actor(ActorId::new(2)), Vec3::new(1.0, 0.0, 0.0));
            let actors = [blocker];
            let volumes = HitVolumes {
                player: Some(&player),
                actors: &actors,
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));

            let impacts = tracker.advance(0.05, &volumes);
            assert_eq!(impacts[0].kind, ImpactKind::Player);
            assert_eq!(impacts[0].player_hit_by(), Some(ActorId::new(1)));
        }

        #[test]
        fn enemy_projectile_blocked_by_other_actor() {
            let world = CollisionWorld::default();
            let blocker_owner = ColliderOwner::Actor(ActorId::new(2));
            let actors = [box_at(&world, blocker_owner, Vec3::new(1.0, 0.0, 0.0))];
            let volumes = HitVolumes {
                player: None,
                actors: &actors,
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));

            let impacts = tracker.advance(0.05, &volumes);
            assert_eq!(impacts[0].kind, ImpactKind::Blocked(blocker_owner));
            assert_eq!(impacts[0].player_hit_by(), None);
        }

        #[test]
        fn shooter_does_not_block_own_projectile() {
            let world = CollisionWorld::default();
            let actors = [box_at(&world, ColliderOwner::Actor(ActorId::new(1)), Vec3::ZERO)];
            let volumes = HitVolumes {
                player: None,
                actors: &actors,
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));

            assert!(tracker.advance(0.01, &volumes).is_empty());
        }

        #[test]
        fn static_geometry_blocks() {
            let mut world = CollisionWorld::default();
            let wall = world.add_static(Scope::Overworld, StaticGeometry::block(Vec3::new(2.0, 0.0, 0.0), Vec3::ONE));
            let volumes = HitVolumes {
                player: None,
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(Combatant::Player, Vec3::ZERO, Vec3::X));

            let impacts = tracker.advance(0.1, &volumes);
            assert_eq!(impacts[0].kind, ImpactKind::Blocked(ColliderOwner::Static(wall)));
        }

        #[test]
        fn player_projectile_ignores_player_box() {
            let world = CollisionWorld::default();
            let player = box_at(&world, ColliderOwner::Player, Vec3::ZERO);
            let volumes = HitVolumes {
                player: Some(&player),
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            tracker.spawn(arrow(Combatant::Player, Vec3::ZERO, Vec3::X));

            assert!(tracker.advance(0.01, &volumes).is_empty());
        }
    }

    mod scope_tests {
        use super::*;

        #[test]
        fn inactive_scope_projectiles_are_frozen() {
            let world = CollisionWorld::default();
            let volumes = HitVolumes {
                player: None,
                actors: &[],
                world: &world,
            };
            let mut tracker = ProjectileTracker::new();
            let mut dungeon_arrow = arrow(enemy(1), Vec3::ZERO, Vec3::X);
            dungeon_arrow.scope = Scope::Dungeon;
            let id = tracker.spawn(dungeon_arrow);

            tracker.advance(10.0, &volumes);
            assert_eq!(tracker.get(id).unwrap().age, 0.0);
        }

        #[test]
        fn clear_scope_drops_only_that_scope() {
            let mut tracker = ProjectileTracker::new();
            let keep = tracker.spawn(arrow(enemy(1), Vec3::ZERO, Vec3::X));
            let mut dungeon_arrow = arrow(enemy(1), Vec3::ZERO, Vec3::X);
            dungeon_arrow.scope = Scope::Dungeon;
            let drop = tracker.spawn(dungeon_arrow);

            assert_eq!(tracker.clear_scope(Scope::Dungeon), vec![drop]);
            assert!(tracker.get(keep).is_some());
        }
    }
}
