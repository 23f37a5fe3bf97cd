//! The resolver's view of "who the player is fighting".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::ActorId;

/// Current fight: one target plus every actor that joined.
///
/// The player's swings only test [`target`](Self::target). Participants are
/// kept so the fight can move to the next actor when the target dies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    target: Option<ActorId>,
    participants: BTreeSet<ActorId>,
}

impl Engagement {
    /// Creates an inactive engagement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current target, if a fight is on.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Returns `true` while a fight is on.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Returns `true` if `id` is part of the fight.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.participants.contains(&id)
    }

    /// Participants in spawn order.
    pub fn participants(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.participants.iter().copied()
    }

    /// Adds `id` to the fight.
    ///
    /// # Returns
    ///
    /// `true` if this started a new fight with `id` as the target.
    pub fn join(&mut self, id: ActorId) -> bool {
        self.participants.insert(id);
        if self.target.is_none() {
            self.target = Some(id);
            return true;
        }
        false
    }

    /// Removes `id` from the fight.
    ///
    /// # Returns
    ///
    /// `true` if `id` was the current target. The target is cleared; the
    /// caller picks the next one with [`retarget`](Self::retarget) or ends
    /// the fight.
    pub fn leave(&mut self, id: ActorId) -> bool {
        self.participants.remove(&id);
        if self.target == Some(id) {
            self.target = None;
            return true;
        }
        false
    }

    /// Points the fight at an existing participant.
    ///
    /// Ignored if `id` is not a participant.
    pub fn retarget(&mut self, id: ActorId) {
        if self.participants.contains(&id) {
            self.target = Some(id);
        }
    }

    /// Ends the fight.
    ///
    /// # Returns
    ///
    /// The former participants in spawn order.
    pub fn clear(&mut self) -> Vec<ActorId> {
        self.target = None;
        std::mem::take(&mut self.participants).into_iter().collect()
    }
}
