//! Actor roster for the combat simulation.
//!
//! The Arena owns every [`Actor`]. It provides:
//! - Actor storage with deterministic iteration order (`BTreeMap`)
//! - Actor lifecycle (spawn, deferred removal of the dead, scope teardown)
//! - Team aggro propagation
//! - Teammate lookups by id (the nearest tank)
//! - The simulation tick counter
//!
//! # Architecture
//!
//! Actor ids are assigned monotonically, so iterating the `BTreeMap` always
//! visits actors in spawn order. Actors never hold references to each other;
//! relations such as "my team" or "the nearest tank" are answered here by
//! scanning the roster.
//!
//! Deaths are never removed mid-tick. The combat resolver marks an actor
//! [`StatusFlags::DEAD`] and the simulation calls
//! [`remove_dead`](Arena::remove_dead) once every system has run, so nothing
//! later in the tick can mistake a dead actor for a live one or lose track of
//! its id.
//!
//! # Example
//!
//! ```
//! use delve_core::arena::Arena;
//! use delve_core::collision::Scope;
//! use delve_core::entity::{ActorKind, TeamId, TransformState};
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let a = arena.spawn("guard_a", ActorKind::Neutral, Scope::Overworld, TransformState::at(Vec3::ZERO));
//! let b = arena.spawn("guard_b", ActorKind::Neutral, Scope::Overworld, TransformState::at(Vec3::X));
//! for id in [a, b] {
//!     arena.get_mut(id).unwrap().team = TeamId::parse("guards");
//! }
//!
//! let changed = arena.set_hostile(a, true).unwrap();
//! assert_eq!(changed, vec![a, b]);
//! ```

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::Scope;
use crate::entity::{Actor, ActorId, ActorKind, Archetype, StatusFlags, TransformState};
use crate::error::{CombatError, CombatResult};

/// Roster of every actor in both scopes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing actor id counter.
    next_id: u64,
    /// Actor storage with deterministic iteration order.
    actors: BTreeMap<ActorId, Actor>,
    /// Current simulation tick.
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new actor and returns its id.
    ///
    /// The actor starts as built by [`Actor::new`]: level 1, no team, not
    /// hostile. Use [`get_mut`](Self::get_mut) or the
    /// [`ActorSpawn`](crate::spawn::ActorSpawn) builder to configure it.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name
    /// * `kind` - Archetype AI data
    /// * `scope` - Location scope the actor lives in
    /// * `transform` - Initial placement
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        kind: ActorKind,
        scope: Scope,
        transform: TransformState,
    ) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.actors
            .insert(id, Actor::new(id, name, kind, scope, transform));
        id
    }

    /// Returns the id the next spawn will receive.
    #[must_use]
    pub const fn peek_next_id(&self) -> ActorId {
        ActorId::new(self.next_id)
    }

    /// Returns an actor by id.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Returns a mutable actor by id.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Returns a living actor.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownActor`] if the id is not in the roster and
    /// [`CombatError::ActorDead`] if its death was already processed this tick.
    pub fn living(&self, id: ActorId) -> CombatResult<&Actor> {
        let actor = self.get(id).ok_or(CombatError::UnknownActor(id))?;
        if actor.is_alive() {
            Ok(actor)
        } else {
            Err(CombatError::ActorDead(id))
        }
    }

    /// Mutable variant of [`living`](Self::living).
    ///
    /// # Errors
    ///
    /// Same as [`living`](Self::living).
    pub fn living_mut(&mut self, id: ActorId) -> CombatResult<&mut Actor> {
        let actor = self.actors.get_mut(&id).ok_or(CombatError::UnknownActor(id))?;
        if actor.is_alive() {
            Ok(actor)
        } else {
            Err(CombatError::ActorDead(id))
        }
    }

    /// Iterates actor ids in spawn order.
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Iterates actors in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Iterates mutable actors in spawn order.
    pub fn actors_mut(&mut self) -> impl Iterator<Item = &mut Actor> + '_ {
        self.actors.values_mut()
    }

    /// Living actors of one scope, in spawn order.
    pub fn living_in(&self, scope: Scope) -> impl Iterator<Item = &Actor> + '_ {
        self.actors
            .values()
            .filter(move |actor| actor.scope == scope && actor.is_alive())
    }

    /// Number of actors, dead ones awaiting removal included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns `true` if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Returns the current tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Sets an actor's hostility.
    ///
    /// Turning hostile spreads to every living teammate in the same call.
    /// Calming down affects only the named actor.
    ///
    /// # Returns
    ///
    /// Ids whose hostile flag changed, in spawn order.
    ///
    /// # Errors
    ///
    /// Missing or dead actors are rejected as in [`living`](Self::living).
    pub fn set_hostile(&mut self, id: ActorId, hostile: bool) -> CombatResult<Vec<ActorId>> {
        let team = self.living(id)?.team.clone();

        let mut changed = Vec::new();
        for actor in self.actors.values_mut() {
            let in_group = actor.id() == id
                || (hostile && team.is_some() && actor.team == team);
            if in_group && actor.set_hostile(hostile) {
                changed.push(actor.id());
            }
        }

        if !changed.is_empty() {
            tracing::info!(
                actor = %id,
                hostile,
                team = team.as_ref().map_or("", |t| t.as_str()),
                affected = changed.len(),
                "hostility changed"
            );
        }
        Ok(changed)
    }

    /// Nearest living tank on `id`'s team, measured on the ground plane.
    ///
    /// The actor itself never counts, even if it is a tank. Ties keep the
    /// earlier-spawned tank.
    ///
    /// # Returns
    ///
    /// The tank's id and position, or `None` if the actor is unknown, has no
    /// team, or no teammate tank is alive.
    #[must_use]
    pub fn nearest_tank_teammate(&self, id: ActorId) -> Option<(ActorId, Vec3)> {
        let actor = self.get(id)?;
        let origin = actor.transform.horizontal();

        self.actors
            .values()
            .filter(|other| {
                other.archetype() == Archetype::Tank
                    && other.is_alive()
                    && other.scope == actor.scope
                    && actor.is_teammate_of(other)
            })
            .map(|tank| {
                let distance_sq = origin.distance_squared(tank.transform.horizontal());
                (distance_sq, tank.id(), tank.transform.position)
            })
            .fold(None, |best: Option<(f32, ActorId, Vec3)>, candidate| match best {
                Some(current) if current.0 <= candidate.0 => Some(current),
                _ => Some(candidate),
            })
            .map(|(_, tank_id, position)| (tank_id, position))
    }

    /// Removes every actor marked dead.
    ///
    /// # Returns
    ///
    /// The removed actors in spawn order.
    pub fn remove_dead(&mut self) -> Vec<Actor> {
        let dead: Vec<ActorId> = self
            .actors
            .values()
            .filter(|actor| actor.flags.contains(StatusFlags::DEAD))
            .map(Actor::id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.actors.remove(&id))
            .collect()
    }

    /// Removes every actor living in `scope`, dead or alive.
    ///
    /// Used when a scope's geometry is regenerated.
    ///
    /// # Returns
    ///
    /// The removed ids in spawn order.
    pub fn remove_scope_actors(&mut self, scope: Scope) -> Vec<ActorId> {
        let removed: Vec<ActorId> = self
            .actors
            .values()
            .filter(|actor| actor.scope == scope)
            .map(Actor::id)
            .collect();
        for id in &removed {
            self.actors.remove(id);
        }
        if !removed.is_empty() {
            tracing::info!(%scope, count = removed.len(), "removed scope actors");
        }
        removed
    }
}

// =============================================================================
// Tests
// =============================================================================
