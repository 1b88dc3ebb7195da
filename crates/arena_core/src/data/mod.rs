//! Data-driven combatant stats and level progression tables.
//!
//! This module contains pure data structures deserialized from RON
//! files plus the builtin fallback tables. No IO happens here; file
//! loading is the caller's job (the headless runner reads files and
//! hands the text to [`stats::StatTable::from_ron`]).

pub mod levels;
pub mod stats;

pub use levels::{build_level_table, EnemyKind, LevelConfig, LevelTable};
pub use stats::{StatTable, StatTemplate};
