//! Kill bookkeeping: gold rolls, the kill counter and global difficulty.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GoldRange;

/// Global kill counter and the difficulty derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillLedger {
    kills: u32,
    difficulty: u32,
}

impl KillLedger {
    /// Starts at zero kills, difficulty 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kills: 0,
            difficulty: 1,
        }
    }

    /// Total kills.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Current difficulty, at least 1.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Counts a kill.
    ///
    /// # Returns
    ///
    /// The new difficulty if this kill raised it.
    pub fn record_kill(&mut self, kills_per_difficulty: u32) -> Option<u32> {
        self.kills += 1;
        if kills_per_difficulty > 0 && self.kills % kills_per_difficulty == 0 {
            self.difficulty += 1;
            Some(self.difficulty)
        } else {
            None
        }
    }
}

impl Default for KillLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolls gold uniformly in `range` and scales it, rounding down.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub(crate) fn roll_gold<R: Rng>(rng: &mut R, range: GoldRange, multiplier: f32) -> u32 {
    let low = range.min.min(range.max);
    let high = range.min.max(range.max);
    let base = rng.gen_range(low..=high);
    (base as f32 * multiplier.max(0.0)).floor() as u32
}
