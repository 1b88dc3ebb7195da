//! The sixteen-level campaign table.
//!
//! Four chapters of four levels each. A chapter fields a single enemy
//! archetype; the enemy count climbs 1..=4 across the chapter and the
//! arena rotates through all four variants. The table is built
//! explicitly from a [`StatTable`] so experience thresholds always
//! reflect the stats actually in play.

use serde::{Deserialize, Serialize};

use crate::arena::ArenaVariant;
use crate::error::{GameError, Result};

use super::stats::StatTable;

/// Total campaign levels.
pub const LEVEL_COUNT: u32 = 16;
/// Levels per chapter.
pub const CHAPTER_SIZE: u32 = 4;

/// The enemy archetype a chapter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Chapter 1: weak random wanderers.
    Erratic,
    /// Chapter 2: standard enforcers.
    Predictive,
    /// Chapter 3: aggressive stalkers.
    Hunter,
    /// Chapter 4: the adaptive boss archetype.
    Adaptive,
}

impl EnemyKind {
    /// The archetype fielded by a chapter (1..=4).
    #[must_use]
    pub const fn for_chapter(chapter: u32) -> Self {
        match chapter {
            1 => Self::Erratic,
            2 => Self::Predictive,
            3 => Self::Hunter,
            _ => Self::Adaptive,
        }
    }

    /// Key into the stat table.
    #[must_use]
    pub const fn stat_key(self) -> &'static str {
        match self {
            Self::Erratic => "erratic",
            Self::Predictive => "predictive",
            Self::Hunter => "hunter",
            Self::Adaptive => "adaptive",
        }
    }

    /// Experience value when the stat table has no entry.
    #[must_use]
    pub const fn fallback_xp(self) -> u32 {
        match self {
            Self::Erratic => 10,
            Self::Predictive => 100,
            Self::Hunter => 500,
            Self::Adaptive => 1000,
        }
    }

    /// Percent chance per decision that this archetype throws a disc.
    #[must_use]
    pub const fn disc_throw_percent(self) -> u64 {
        match self {
            Self::Erratic => 2,
            Self::Predictive => 5,
            Self::Hunter => 8,
            Self::Adaptive => 12,
        }
    }

    /// Inclusive throw distance range in cells.
    #[must_use]
    pub const fn disc_throw_range(self) -> (i32, i32) {
        match self {
            Self::Erratic => (1, 2),
            Self::Predictive => (1, 3),
            Self::Hunter => (2, 3),
            Self::Adaptive => (2, 3),
        }
    }
}

/// One row of the campaign table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Campaign level, 1..=16.
    pub level: u32,
    /// Chapter, 1..=4.
    pub chapter: u32,
    /// Level within the chapter, 1..=4.
    pub chapter_level: u32,
    /// Arena variant fought on.
    pub arena: ArenaVariant,
    /// Enemy archetype fielded.
    pub enemy: EnemyKind,
    /// Number of enemies spawned.
    pub enemy_count: u32,
    /// Experience needed to clear the level's progression bar.
    pub xp_threshold: u64,
}

/// Immutable campaign table; index with [`LevelTable::get`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl LevelTable {
    /// Row for a campaign level.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidLevel`] outside 1..=16.
    pub fn get(&self, level: u32) -> Result<&LevelConfig> {
        if level == 0 || level > LEVEL_COUNT {
            return Err(GameError::InvalidLevel(level));
        }
        Ok(&self.levels[(level - 1) as usize])
    }

    /// All rows in campaign order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }

    /// Number of campaign levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; the table carries sixteen rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Build the campaign table from a stat table.
///
/// Per chapter: the archetype is fixed, the enemy count equals the
/// chapter-relative level, the arena rotates
/// Classic -> Open -> Maze -> Procedural, and the experience threshold
/// is the archetype's worth times the enemy count.
#[must_use]
pub fn build_level_table(stats: &StatTable) -> LevelTable {
    let mut levels = Vec::with_capacity(LEVEL_COUNT as usize);
    for level in 1..=LEVEL_COUNT {
        let chapter = (level - 1) / CHAPTER_SIZE + 1;
        let chapter_level = (level - 1) % CHAPTER_SIZE + 1;
        let enemy = EnemyKind::for_chapter(chapter);
        let enemy_count = chapter_level;

        let arena = match chapter_level {
            1 => ArenaVariant::Classic,
            2 => ArenaVariant::Open,
            3 => ArenaVariant::Maze,
            _ => ArenaVariant::Procedural,
        };

        let enemy_xp = stats
            .get(enemy.stat_key())
            .map_or_else(|| enemy.fallback_xp(), |t| t.xp);
        let xp_threshold = u64::from(enemy_xp) * u64::from(enemy_count);

        levels.push(LevelConfig {
            level,
            chapter,
            chapter_level,
            arena,
            enemy,
            enemy_count,
            xp_threshold,
        });
    }
    LevelTable { levels }
}
