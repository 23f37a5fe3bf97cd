//! Actor and player types for the combat core.
//!
//! This module provides:
//! - [`ActorId`]: stable identifier into the [`Arena`](crate::arena::Arena) roster
//! - [`TeamId`]: aggro group tag
//! - [`Archetype`]: behavioral/stat category of an actor
//! - [`ActorKind`]: per-archetype AI data as a tagged enum
//! - [`Actor`]: a combat-participating NPC
//! - [`Player`]: the single player-controlled combatant
//!
//! # Architecture
//!
//! Each archetype's AI data lives in its own [`ActorKind`] variant, so the
//! brawler state machine can only touch [`BrawlerData`] and the ranged state
//! machine can only touch [`RangedData`]. Relations between actors (teammates,
//! the nearest tank) are looked up by id through the arena; actors never hold
//! references to each other.
//!
//! # Example
//!
//! ```
//! use delve_core::collision::Scope;
//! use delve_core::entity::{Actor, ActorId, ActorKind, Archetype, TransformState};
//! use glam::Vec3;
//!
//! let actor = Actor::new(
//!     ActorId::new(3),
//!     "monster_3",
//!     ActorKind::Neutral,
//!     Scope::Dungeon,
//!     TransformState::at(Vec3::new(1.0, 0.0, 4.0)),
//! );
//!
//! assert_eq!(actor.id().as_u64(), 3);
//! assert_eq!(actor.archetype(), Archetype::Neutral);
//! assert!(actor.is_alive());
//! ```

pub mod components;

use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::Scope;

pub use components::{
    BrawlerData, BrawlerState, Health, HitFeedback, Knockback, RangedData, RangedState,
    TransformState,
};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for an actor.
///
/// Ids are assigned monotonically by the arena and never reused, so iteration
/// in id order is also spawn order.
///
/// # Example
///
/// ```
/// use delve_core::entity::ActorId;
///
/// let a = ActorId::new(1);
/// let b = ActorId::new(2);
/// assert!(a < b);
/// assert_eq!(b.to_string(), "2");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
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

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

/// Aggro group shared by actors that turn hostile together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(String);

impl TeamId {
    /// Parses a team tag.
    ///
    /// Blank tags mean "no team" and return `None`.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let trimmed = tag.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Returns the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Archetype and kind
// =============================================================================

/// Behavioral and stat category of an actor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Close-range brawler
    Melee,
    /// Kiting archer
    Ranged,
    /// Slow, heavy brawler that ranged teammates hide behind
    Tank,
    /// Non-combat NPC; never acts on its own
    Neutral,
}

impl Archetype {
    /// Parses an archetype tag, case-insensitively.
    ///
    /// Unrecognized tags fall back to [`Archetype::Neutral`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "melee" => Self::Melee,
            "ranged" | "bow" | "archer" => Self::Ranged,
            "tank" => Self::Tank,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Melee => write!(f, "melee"),
            Self::Ranged => write!(f, "ranged"),
            Self::Tank => write!(f, "tank"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Per-archetype AI data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Melee brawler
    Melee(BrawlerData),
    /// Ranged kiter
    Ranged(RangedData),
    /// Tank brawler
    Tank(BrawlerData),
    /// No AI
    Neutral,
}

impl ActorKind {
    /// Returns the archetype this data belongs to.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        match self {
            Self::Melee(_) => Archetype::Melee,
            Self::Ranged(_) => Archetype::Ranged,
            Self::Tank(_) => Archetype::Tank,
            Self::Neutral => Archetype::Neutral,
        }
    }

    /// Returns the brawler data for melee and tank actors.
    #[must_use]
    pub const fn as_brawler(&self) -> Option<&BrawlerData> {
        match self {
            Self::Melee(data) | Self::Tank(data) => Some(data),
            _ => None,
        }
    }

    /// Returns mutable brawler data for melee and tank actors.
    #[must_use]
    pub fn as_brawler_mut(&mut self) -> Option<&mut BrawlerData> {
        match self {
            Self::Melee(data) | Self::Tank(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the ranged data, if this is a ranged actor.
    #[must_use]
    pub const fn as_ranged(&self) -> Option<&RangedData> {
        match self {
            Self::Ranged(data) => Some(data),
            _ => None,
        }
    }

    /// Returns mutable ranged data, if this is a ranged actor.
    #[must_use]
    pub fn as_ranged_mut(&mut self) -> Option<&mut RangedData> {
        match self {
            Self::Ranged(data) => Some(data),
            _ => None,
        }
    }
}

// =============================================================================
// Status flags
// =============================================================================

bitflags! {
    /// Visual and behavioral status of an actor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct StatusFlags: u8 {
        /// Actively targeting the player
        const HOSTILE = 1 << 0;
        /// Can be talked to
        const TALKABLE = 1 << 1;
        /// Part of the current engagement
        const ENGAGED = 1 << 2;
        /// Health reached zero; removed at the end of the tick
        const DEAD = 1 << 3;
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self::TALKABLE
    }
}

// =============================================================================
// Actor
// =============================================================================

/// A combat-participating NPC.
///
/// # Invariants
///
/// - `id` is unique within the arena
/// - `health` is `None` until the actor first enters an engagement; after that
///   it is only mutated by the combat resolver
/// - an actor with [`StatusFlags::DEAD`] is never hostile, talkable or engaged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    /// Display name, e.g. `monster_4`
    pub name: String,
    /// Aggro group, if any
    pub team: Option<TeamId>,
    /// Archetype AI data
    pub kind: ActorKind,
    /// Location scope the actor lives in
    pub scope: Scope,
    /// World placement
    pub transform: TransformState,
    /// Velocity chosen by the AI this tick
    pub velocity: Vec3,
    /// Local collision half-extents (x, half-height, z)
    pub half_extents: Vec3,
    /// Health pool, created at engagement start
    pub health: Option<Health>,
    /// Actor level (elite monsters are level 2)
    pub level: u32,
    /// Health multiplier cached at spawn from the difficulty at that time
    pub hp_scale: f32,
    /// Status flags
    pub flags: StatusFlags,
}

impl Actor {
    /// Default collision half-extents for actors.
    pub const DEFAULT_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);

    /// Creates a level 1, non-hostile, talkable actor with no team.
    ///
    /// # Arguments
    ///
    /// * `id` - Roster id
    /// * `name` - Display name
    /// * `kind` - Archetype AI data
    /// * `scope` - Location scope
    /// * `transform` - Initial placement
    #[must_use]
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        kind: ActorKind,
        scope: Scope,
        transform: TransformState,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team: None,
            kind,
            scope,
            transform,
            velocity: Vec3::ZERO,
            half_extents: Self::DEFAULT_HALF_EXTENTS,
            health: None,
            level: 1,
            hp_scale: 1.0,
            flags: StatusFlags::default(),
        }
    }

    /// Returns the actor's id.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the actor's archetype.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.kind.archetype()
    }

    /// Returns `true` until death has been processed.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.flags.contains(StatusFlags::DEAD)
    }

    /// Returns `true` for living actors targeting the player.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.is_alive() && self.flags.contains(StatusFlags::HOSTILE)
    }

    /// Returns `true` while the actor is in the current engagement.
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.flags.contains(StatusFlags::ENGAGED)
    }

    /// Returns `true` if both actors share a team.
    #[must_use]
    pub fn is_teammate_of(&self, other: &Self) -> bool {
        self.id != other.id && self.team.is_some() && self.team == other.team
    }

    /// Sets hostility; talkability is its inverse.
    ///
    /// Dead actors are left untouched.
    ///
    /// # Returns
    ///
    /// `true` if the hostile flag changed.
    pub fn set_hostile(&mut self, hostile: bool) -> bool {
        if !self.is_alive() || self.flags.contains(StatusFlags::HOSTILE) == hostile {
            return false;
        }
        self.flags.set(StatusFlags::HOSTILE, hostile);
        self.flags.set(StatusFlags::TALKABLE, !hostile);
        true
    }

    /// Marks the actor dead and clears every combat flag.
    pub fn mark_dead(&mut self) {
        self.flags = StatusFlags::DEAD;
        self.velocity = Vec3::ZERO;
    }
}

// =============================================================================
// Player
// =============================================================================

/// The player's physical state.
///
/// Health and progression live in the [`PlayerStats`](crate::stats::PlayerStats)
/// collaborator, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// World placement
    pub transform: TransformState,
    /// Velocity supplied by the controller
    pub velocity: Vec3,
    /// Local collision half-extents
    pub half_extents: Vec3,
    /// Hit flash and knockback
    pub feedback: HitFeedback,
    /// Whether the player collides with geometry and actors
    pub collision_enabled: bool,
}

impl Player {
    /// Default player half-extents.
    pub const DEFAULT_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 1.0, 0.4);

    /// Creates a player standing at `position`.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            transform: TransformState::at(position),
            velocity: Vec3::ZERO,
            half_extents: Self::DEFAULT_HALF_EXTENTS,
            feedback: HitFeedback::default(),
            collision_enabled: true,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Either side of a fight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combatant {
    /// The player
    Player,
    /// An NPC
    Actor(ActorId),
}

impl Combatant {
    /// Returns the actor id, if this is an actor.
    #[must_use]
    pub const fn actor(self) -> Option<ActorId> {
        match self {
            Self::Actor(id) => Some(id),
            Self::Player => None,
        }
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Actor(id) => write!(f, "actor {id}"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
