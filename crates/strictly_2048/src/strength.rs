//! Oracle strength tiers.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Oracle tuning for one strength level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthTier {
    /// Search branches below this probability are pruned.
    pub min_probability: f32,
    /// Maximum search depth.
    pub max_depth: u8,
}

/// Tier table indexed by `strength - 1`. Difficulty increases with the index.
pub const STRENGTH_TIERS: [StrengthTier; 8] = [
    StrengthTier { min_probability: 0.1, max_depth: 2 },
    StrengthTier { min_probability: 0.05, max_depth: 3 },
    StrengthTier { min_probability: 0.02, max_depth: 4 },
    StrengthTier { min_probability: 0.01, max_depth: 5 },
    StrengthTier { min_probability: 0.005, max_depth: 6 },
    StrengthTier { min_probability: 0.002, max_depth: 7 },
    StrengthTier { min_probability: 0.001, max_depth: 8 },
    StrengthTier { min_probability: 0.0005, max_depth: 10 },
];

/// Weakest strength.
pub const MIN_STRENGTH: u8 = 1;

/// Strongest strength.
pub const MAX_STRENGTH: u8 = STRENGTH_TIERS.len() as u8;

/// A strength level, always within `[MIN_STRENGTH, MAX_STRENGTH]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "u8", into = "u8")]
pub struct Strength(u8);

impl Strength {
    /// Clamps `level` into range.
    #[instrument]
    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(MIN_STRENGTH, MAX_STRENGTH))
    }

    /// The numeric level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// One level stronger, saturating at the top.
    pub fn increased(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    /// One level weaker, saturating at the bottom.
    pub fn decreased(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }

    /// The oracle tuning for this level.
    pub fn tier(self) -> StrengthTier {
        STRENGTH_TIERS[usize::from(self.0 - MIN_STRENGTH)]
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::clamped(3)
    }
}

impl From<u8> for Strength {
    fn from(level: u8) -> Self {
        Self::clamped(level)
    }
}

impl From<Strength> for u8 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}
