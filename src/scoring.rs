//! Score to tier mapping
//!
//! Two tables coexist and must stay separate: the live table drives
//! in-session feedback and the client mint prompt, the mint table is the one
//! the minting service names tiers with. They disagree, and reconciling them
//! is a product decision, so callers always pick one explicitly.

use serde::{Deserialize, Serialize};

/// Named achievement bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    None,
    Bronze,
    Silver,
    Gold,
    Legendary,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "None",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Legendary => "Legendary",
        }
    }

    /// Badge shown next to the tier name
    pub fn badge(&self) -> &'static str {
        match self {
            Tier::None => "❌",
            Tier::Bronze => "🥉",
            Tier::Silver => "🥈",
            Tier::Gold => "🥇",
            Tier::Legendary => "💎",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descending `(min_score_inclusive, tier)` thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTable {
    pub name: &'static str,
    thresholds: &'static [(u32, Tier)],
}

impl TierTable {
    /// Thresholds must be strictly descending by score
    pub const fn new(name: &'static str, thresholds: &'static [(u32, Tier)]) -> Self {
        Self { name, thresholds }
    }

    pub fn thresholds(&self) -> &'static [(u32, Tier)] {
        self.thresholds
    }

    /// Tier for a score: first threshold met, scanning highest first
    pub fn tier_of(&self, score: u32) -> Tier {
        self.thresholds
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::None)
    }

    /// Next threshold above the current tier, for progress display
    pub fn next_tier(&self, score: u32) -> Option<(u32, Tier)> {
        self.thresholds
            .iter()
            .rev()
            .find(|(min, _)| score < *min)
            .copied()
    }

    /// Lowest score that earns any tier
    pub fn floor(&self) -> u32 {
        self.thresholds.last().map(|(min, _)| *min).unwrap_or(0)
    }
}

/// In-session feedback and client mint prompt
pub const LIVE_TIERS: TierTable = TierTable::new(
    "live",
    &[
        (40, Tier::Legendary),
        (20, Tier::Gold),
        (10, Tier::Silver),
        (3, Tier::Bronze),
    ],
);

/// Minting service tier naming
pub const MINT_TIERS: TierTable = TierTable::new(
    "mint",
    &[
        (100, Tier::Legendary),
        (50, Tier::Gold),
        (25, Tier::Silver),
        (10, Tier::Bronze),
    ],
);

/// Tier for `score` under `table`
#[inline]
pub fn tier_of(score: u32, table: &TierTable) -> Tier {
    table.tier_of(score)
}

/// Whether a finished run may be offered for minting
#[inline]
pub fn is_mint_eligible(score: u32, threshold: u32) -> bool {
    score >= threshold
}
