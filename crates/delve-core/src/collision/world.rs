//! Static geometry registry partitioned by location scope.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::obb::{self, Collider, ColliderOwner};
use crate::config::CollisionTuning;
use crate::entity::TransformState;

/// A partition of the world with its own static geometry.
///
/// Exactly one scope is active at a time; only its statics and actors take part
/// in collision queries.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// The persistent outdoor map
    #[default]
    Overworld,
    /// The current dungeon instance
    Dungeon,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overworld => write!(f, "overworld"),
            Self::Dungeon => write!(f, "dungeon"),
        }
    }
}

/// Identifier of a registered static collider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StaticId(u64);

impl StaticId {
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

impl fmt::Display for StaticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "static#{}", self.0)
    }
}

/// Static geometry as supplied by the level generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticGeometry {
    /// Placement of the wall or obstacle
    pub transform: TransformState,
    /// Unscaled half-extents
    pub local_half_extents: Vec3,
}

impl StaticGeometry {
    /// Axis-aligned block centered at `position`.
    #[must_use]
    pub const fn block(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            transform: TransformState::at(position),
            local_half_extents: half_extents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StaticEntry {
    id: StaticId,
    geometry: StaticGeometry,
    collider: Collider,
}

/// Static colliders for both scopes plus the active-scope switch.
///
/// Static colliders are built once on registration; call
/// [`refresh_static`](Self::refresh_static) if their geometry moves.
///
/// # Example
///
/// ```
/// use delve_core::collision::{CollisionWorld, Scope, StaticGeometry};
/// use delve_core::config::CollisionTuning;
/// use glam::Vec3;
///
/// let mut world = CollisionWorld::new(CollisionTuning::default());
/// world.add_static(Scope::Dungeon, StaticGeometry::block(Vec3::ZERO, Vec3::ONE));
///
/// assert_eq!(world.active_statics().count(), 0);
/// world.set_active_scope(Scope::Dungeon);
/// assert_eq!(world.active_statics().count(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionWorld {
    tuning: CollisionTuning,
    overworld: Vec<StaticEntry>,
    dungeon: Vec<StaticEntry>,
    active: Scope,
    enabled: bool,
    next_static_id: u64,
}

impl CollisionWorld {
    /// Creates an empty world with the overworld active and collision enabled.
    #[must_use]
    pub fn new(tuning: CollisionTuning) -> Self {
        Self {
            tuning,
            overworld: Vec::new(),
            dungeon: Vec::new(),
            active: Scope::Overworld,
            enabled: true,
            next_static_id: 0,
        }
    }

    /// Returns the tolerances in use.
    #[must_use]
    pub const fn tuning(&self) -> &CollisionTuning {
        &self.tuning
    }

    fn entries(&self, scope: Scope) -> &Vec<StaticEntry> {
        match scope {
            Scope::Overworld => &self.overworld,
            Scope::Dungeon => &self.dungeon,
        }
    }

    fn entries_mut(&mut self, scope: Scope) -> &mut Vec<StaticEntry> {
        match scope {
            Scope::Overworld => &mut self.overworld,
            Scope::Dungeon => &mut self.dungeon,
        }
    }

    /// Builds a collider with this world's minimum half-extent.
    #[must_use]
    pub fn build_collider(
        &self,
        owner: ColliderOwner,
        transform: &TransformState,
        local_half_extents: Vec3,
    ) -> Collider {
        Collider::build(owner, transform, local_half_extents, self.tuning.min_half_extent)
    }

    /// Registers a static collider under `scope`.
    pub fn add_static(&mut self, scope: Scope, geometry: StaticGeometry) -> StaticId {
        let id = StaticId::new(self.next_static_id);
        self.next_static_id += 1;

        let collider = self.build_collider(
            ColliderOwner::Static(id),
            &geometry.transform,
            geometry.local_half_extents,
        );
        self.entries_mut(scope).push(StaticEntry {
            id,
            geometry,
            collider,
        });
        id
    }

    /// Discards every static of `scope` and registers `geometry` in its place.
    ///
    /// # Returns
    ///
    /// Ids of the new statics in registration order.
    pub fn replace_statics(
        &mut self,
        scope: Scope,
        geometry: impl IntoIterator<Item = StaticGeometry>,
    ) -> Vec<StaticId> {
        let discarded = self.entries(scope).len();
        self.entries_mut(scope).clear();
        let ids: Vec<StaticId> = geometry
            .into_iter()
            .map(|g| self.add_static(scope, g))
            .collect();
        tracing::info!(%scope, discarded, added = ids.len(), "replaced static geometry");
        ids
    }

    /// Rebuilds one static collider after its geometry moved.
    ///
    /// # Returns
    ///
    /// `false` if no static with this id exists.
    pub fn refresh_static(&mut self, id: StaticId, transform: TransformState) -> bool {
        let entry = self
            .overworld
            .iter_mut()
            .chain(self.dungeon.iter_mut())
            .find(|entry| entry.id == id);
        match entry {
            Some(entry) => {
                entry.geometry.transform = transform;
                entry.collider.update(&transform);
                true
            }
            None => {
                tracing::warn!(%id, "refresh of unknown static collider");
                false
            }
        }
    }

    /// Switches which scope's statics take part in queries.
    pub fn set_active_scope(&mut self, scope: Scope) {
        if self.active != scope {
            tracing::info!(from = %self.active, to = %scope, "active scope changed");
            self.active = scope;
        }
    }

    /// Returns the active scope.
    #[must_use]
    pub const fn active_scope(&self) -> Scope {
        self.active
    }

    /// Enables or disables penetration resolution.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns `true` if penetration resolution runs.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Static colliders of `scope` in registration order.
    pub fn statics(&self, scope: Scope) -> impl Iterator<Item = &Collider> + '_ {
        self.entries(scope).iter().map(|entry| &entry.collider)
    }

    /// Static colliders of the active scope.
    pub fn active_statics(&self) -> impl Iterator<Item = &Collider> + '_ {
        self.statics(self.active)
    }

    /// Returns the first active static containing `point`.
    #[must_use]
    pub fn static_containing(&self, point: Vec3) -> Option<StaticId> {
        self.entries(self.active)
            .iter()
            .find(|entry| obb::contains_point(&entry.collider, point, self.tuning.containment_tolerance))
            .map(|entry| entry.id)
    }

    /// Pushes a mover out of every overlapping collider, one at a time.
    ///
    /// Active statics are resolved first in registration order, then `others`
    /// in slice order. The mover's box is rebuilt before each test, so every
    /// push sees the result of the previous one. Tightly packed overlaps
    /// therefore resolve differently depending on order.
    ///
    /// # Arguments
    ///
    /// * `owner` - The mover; colliders with the same owner in `others` are skipped
    /// * `transform` - Mover placement, updated in place
    /// * `local_half_extents` - Mover's unscaled half-extents
    /// * `others` - Dynamic colliders to resolve against after the statics
    ///
    /// # Returns
    ///
    /// Total horizontal displacement applied.
    pub fn resolve_mover(
        &self,
        owner: ColliderOwner,
        transform: &mut TransformState,
        local_half_extents: Vec3,
        others: &[Collider],
    ) -> Vec2 {
        let mut mover = self.build_collider(owner, transform, local_half_extents);
        let mut total = Vec2::ZERO;

        let obstacles = self
            .active_statics()
            .chain(others.iter().filter(|other| other.owner() != owner));
        for obstacle in obstacles {
            mover.update(transform);
            let result = obb::test(&mover, obstacle);
            if result.intersects {
                total += obb::resolve_penetration(transform, &result, self.tuning.separation_epsilon);
            }
        }
        total
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(CollisionTuning::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
