//! Experience bookkeeping across the campaign.
//!
//! Thresholds come from the level table; excess experience carries
//! over, so one large award can clear several levels at once. After
//! the final level the threshold drops to zero and further awards
//! only accumulate in the lifetime total.

use serde::{Deserialize, Serialize};

use crate::data::levels::{LevelTable, LEVEL_COUNT};

/// Campaign experience tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    xp_into_level: u64,
    total_xp: u64,
    // Threshold per level, indexed by level - 1; snapshotted from the
    // table so the tracker serializes standalone.
    thresholds: Vec<u64>,
}

impl Progression {
    /// Start at level 1 with the table's thresholds.
    #[must_use]
    pub fn new(table: &LevelTable) -> Self {
        Self {
            level: 1,
            xp_into_level: 0,
            total_xp: 0,
            thresholds: table.iter().map(|c| c.xp_threshold).collect(),
        }
    }

    /// Start mid-campaign, for a simulation built at a specific level.
    #[must_use]
    pub fn starting_at(table: &LevelTable, level: u32) -> Self {
        let mut p = Self::new(table);
        p.level = level.clamp(1, LEVEL_COUNT);
        p
    }

    /// Award experience; returns how many levels were cleared.
    ///
    /// Carry-over applies: each level-up consumes the current
    /// threshold and the remainder counts toward the next level.
    pub fn add_xp(&mut self, xp: u64) -> u32 {
        if xp == 0 {
            return 0;
        }
        self.xp_into_level += xp;
        self.total_xp += xp;

        let mut cleared = 0;
        while !self.is_complete() && self.xp_into_level >= self.threshold() {
            self.xp_into_level -= self.threshold();
            self.level += 1;
            cleared += 1;
        }
        if self.is_complete() {
            self.xp_into_level = 0;
        }
        cleared
    }

    /// Current campaign level, 1..=16.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn xp_into_level(&self) -> u64 {
        self.xp_into_level
    }

    /// Threshold for the current level; zero once the campaign is done.
    #[must_use]
    pub fn threshold(&self) -> u64 {
        if self.is_complete() {
            return 0;
        }
        self.thresholds
            .get((self.level - 1) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Lifetime experience earned.
    #[must_use]
    pub const fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Progress toward the next level as a whole percentage, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let threshold = self.threshold();
        if threshold == 0 {
            return 100;
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            ((self.xp_into_level * 100) / threshold).min(100) as u32
        }
    }

    /// Snap the bar to full for the level-complete display.
    pub fn fill(&mut self) {
        self.xp_into_level = self.threshold();
    }

    /// Drop accumulated progress at a level transition.
    pub fn reset_xp(&mut self) {
        self.xp_into_level = 0;
    }

    /// True past the final campaign level.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.level > LEVEL_COUNT
    }
}
