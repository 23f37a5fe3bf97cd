//! Typed messages passed between the phases of a tick.
//!
//! # Architecture
//!
//! Messages flow in one direction through the tick:
//! - [`PlayerAction`]: discrete attacks raised by the input controller
//! - [`Intent`]: proposals emitted by the actor AI (swing, fire)
//! - [`CombatEvent`]: a single attack attempt with its target set and hit test,
//!   built right before the combat resolver consumes it
//! - [`Event`]: outcomes, recorded in an [`EventLog`] and returned per tick in a
//!   [`TickReport`]
//!
//! Nothing here mutates state. Every message is consumed within the tick that
//! raised it, except for [`Event`]s, which the caller reads afterwards.
//!
//! # Example
//!
//! ```
//! use delve_core::output::{Event, EventLog, SpawnRequest};
//!
//! let mut log = EventLog::new();
//! log.push(Event::DifficultyRaised { difficulty: 2 });
//! log.push(Event::SpawnRequested(SpawnRequest { difficulty: 2, position: None }));
//!
//! let events = log.take();
//! assert_eq!(events.len(), 2);
//! assert!(log.is_empty());
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{ColliderOwner, Scope};
use crate::entity::{ActorId, Archetype, Combatant};
use crate::projectile::ProjectileId;
use crate::stats::Weapon;

// =============================================================================
// Inputs
// =============================================================================

/// An attack raised by the player's controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// A melee swing.
    Melee {
        /// Point the reach is measured from
        origin: Vec3,
        /// Reach of the swing
        range: f32,
        /// Damage on a hit
        damage: f32,
        /// Weapon credited with a kill
        weapon: Weapon,
    },
    /// A ranged shot.
    Shoot {
        /// Eye position the ray starts at
        origin: Vec3,
        /// Aim direction, normalized by the resolver
        direction: Vec3,
        /// Damage on a hit
        damage: f32,
        /// Weapon credited with a kill
        weapon: Weapon,
    },
}

impl PlayerAction {
    /// Weapon used for the attack.
    #[must_use]
    pub const fn weapon(&self) -> Weapon {
        match self {
            Self::Melee { weapon, .. } | Self::Shoot { weapon, .. } => *weapon,
        }
    }
}

/// A proposal emitted by the actor AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// A swing that landed at the end of a windup.
    MeleeStrike {
        /// Swinging actor
        attacker: ActorId,
        /// Attacker position at the moment of the swing
        origin: Vec3,
        /// Damage with difficulty scaling applied
        damage: f32,
    },
    /// A projectile to spawn.
    FireProjectile {
        /// Shooting actor
        owner: ActorId,
        /// Spawn position
        origin: Vec3,
        /// Unit flight direction
        direction: Vec3,
        /// Damage carried by the projectile
        damage: f32,
    },
}

impl Intent {
    /// The actor that emitted the intent.
    #[must_use]
    pub const fn source(&self) -> ActorId {
        match self {
            Self::MeleeStrike { attacker, .. } => *attacker,
            Self::FireProjectile { owner, .. } => *owner,
        }
    }
}

// =============================================================================
// Attack attempts
// =============================================================================

/// Who an attack may hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSet {
    /// The player
    Player,
    /// Only the currently engaged actor
    Engaged(ActorId),
    /// Any of these actors; the nearest qualifying one is chosen
    Actors(Vec<ActorId>),
}

/// Geometric test an attack must pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitTest {
    /// Target center within `range` of `origin`
    Reach {
        /// Measurement point
        origin: Vec3,
        /// Maximum distance
        range: f32,
    },
    /// Target center close to a ray, in front of its origin
    Ray {
        /// Ray start
        origin: Vec3,
        /// Unit ray direction
        direction: Vec3,
        /// Furthest projection along the ray
        max_range: f32,
        /// Largest perpendicular distance that still hits
        radius: f32,
    },
    /// Already known to connect (projectile entered the target's box)
    Contact {
        /// Where the hit landed
        origin: Vec3,
    },
}

impl HitTest {
    /// Point knockback pushes away from.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        match self {
            Self::Reach { origin, .. } | Self::Ray { origin, .. } | Self::Contact { origin } => *origin,
        }
    }
}

/// One attack attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    /// Who is attacking
    pub attacker: Combatant,
    /// Who may be hit
    pub targets: TargetSet,
    /// Damage on a hit
    pub damage: f32,
    /// How a hit is decided
    pub hit_test: HitTest,
    /// Weapon credited with a kill, for player attacks
    pub weapon: Option<Weapon>,
}

// =============================================================================
// Outcomes
// =============================================================================

/// Request for the roster-seeding routine to add a monster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Difficulty the new monster is scaled for
    pub difficulty: u32,
    /// Exact ground position, or `None` for a random spot near the player
    pub position: Option<Vec3>,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An actor lost health.
    ActorDamaged {
        /// Damaged actor
        actor: ActorId,
        /// Damage absorbed
        amount: f32,
        /// Health left
        remaining: f32,
    },
    /// An actor died.
    ActorKilled {
        /// Dead actor
        actor: ActorId,
        /// Its archetype
        archetype: Archetype,
        /// Scope it died in
        scope: Scope,
        /// Weapon that landed the killing blow
        weapon: Option<Weapon>,
    },
    /// The player received gold.
    GoldGranted {
        /// Amount granted
        amount: u32,
    },
    /// The player received score.
    ScoreGranted {
        /// Amount granted
        amount: u32,
    },
    /// The global difficulty counter went up.
    DifficultyRaised {
        /// New difficulty
        difficulty: u32,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Attacking actor
        attacker: ActorId,
        /// Damage dealt
        amount: f32,
        /// Health left
        remaining: f32,
    },
    /// The player's health reached zero.
    PlayerDefeated,
    /// An engagement began or switched to a new target.
    EngagementStarted {
        /// Current target
        target: ActorId,
    },
    /// No engaged hostile is left.
    EngagementEnded,
    /// Actors changed hostility.
    HostilityChanged {
        /// Affected actors in spawn order
        actors: Vec<ActorId>,
        /// New hostility
        hostile: bool,
    },
    /// A replacement monster should be spawned.
    SpawnRequested(SpawnRequest),
    /// A projectile was launched.
    ProjectileFired {
        /// New projectile
        id: ProjectileId,
        /// Shooter
        owner: Combatant,
    },
    /// A projectile outlived its lifetime.
    ProjectileExpired {
        /// Removed projectile
        id: ProjectileId,
    },
    /// A projectile was stopped by a volume.
    ProjectileBlocked {
        /// Removed projectile
        id: ProjectileId,
        /// What stopped it
        by: ColliderOwner,
    },
    /// An attack found no qualifying target.
    AttackMissed {
        /// Who attacked
        attacker: Combatant,
    },
}

/// Drainable record of events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Appends several events in order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Drains every recorded event.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Everything that happened in one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 1 for the first step
    pub tick: u64,
    /// Events in the order they happened
    pub events: Vec<Event>,
}

impl TickReport {
    /// Returns `true` if the player was defeated this tick.
    #[must_use]
    pub fn player_defeated(&self) -> bool {
        self.events.iter().any(|e| matches!(e, Event::PlayerDefeated))
    }

    /// Actors that died this tick.
    #[must_use]
    pub fn kills(&self) -> Vec<ActorId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::ActorKilled { actor, .. } => Some(*actor),
                _ => None,
            })
            .collect()
    }

    /// Spawn requests raised this tick.
    #[must_use]
    pub fn spawn_requests(&self) -> Vec<SpawnRequest> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::SpawnRequested(request) => Some(*request),
                _ => None,
            })
            .collect()
    }

    /// Total gold granted this tick.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                Event::GoldGranted { amount } => *amount,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_source() {
        let strike = Intent::MeleeStrike {
            attacker: ActorId::new(4),
            origin: Vec3::ZERO,
            damage: 10.0,
        };
        assert_eq!(strike.source(), ActorId::new(4));
    }

    #[test]
    fn hit_test_origin() {
        let ray = HitTest::Ray {
            origin: Vec3::Y,
            direction: Vec3::X,
            max_range: 32.0,
            radius: 1.2,
        };
        assert_eq!(ray.origin(), Vec3::Y);
    }

    #[test]
    fn event_log_drains() {
        let mut log = EventLog::new();
        log.push(Event::PlayerDefeated);
        log.extend([Event::EngagementEnded, Event::GoldGranted { amount: 3 }]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[1], Event::EngagementEnded);

        let drained = log.take();
        assert_eq!(drained.len(), 3);
        assert!(log.is_empty());
    }

    #[test]
    fn report_summaries() {
        let report = TickReport {
            tick: 7,
            events: vec![
                Event::ActorKilled {
                    actor: ActorId::new(2),
                    archetype: Archetype::Tank,
                    scope: Scope::Dungeon,
                    weapon: Some(Weapon::Sword),
                },
                Event::GoldGranted { amount: 12 },
                Event::GoldGranted { amount: 5 },
                Event::SpawnRequested(SpawnRequest {
                    difficulty: 1,
                    position: None,
                }),
            ],
        };
        assert_eq!(report.kills(), vec![ActorId::new(2)]);
        assert_eq!(report.gold(), 17);
        assert_eq!(report.spawn_requests().len(), 1);
        assert!(!report.player_defeated());
    }

    #[test]
    fn events_serialize() {
        let event = Event::ProjectileBlocked {
            id: ProjectileId::new(3),
            by: ColliderOwner::Actor(ActorId::new(1)),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
