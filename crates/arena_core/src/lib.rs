//! # Arena Core
//!
//! Deterministic simulation core for a turn-synchronous grid combat arena.
//!
//! Entities move on a fixed 40x40 grid, leave destructible light-trails,
//! throw and recapture discs, and are driven by one of four AI decision
//! strategies. This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond data-file parsing helpers
//! - No system randomness (a single seeded stream drives all AI dice)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless scripted playthroughs
//! - Replay and regression testing against state hashes
//! - Determinism testing across platforms
//!
//! ## Crate Structure
//!
//! - [`arena`] - Grid, cells, and the four arena generation variants
//! - [`trails`] - Light-trail lifecycle
//! - [`collision`] - Move classification and trap detection
//! - [`discs`] - Disc throw/recapture physics
//! - [`ai`] - The four enemy decision archetypes
//! - [`pathfinding`] - Bounded A* used by the boss archetype
//! - [`simulation`] - Tick scheduler and the public command/query API
//! - [`data`] - Stat templates and the level table
//! - [`progression`] - XP accumulation and level-ups

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod arena;
pub mod collision;
pub mod data;
pub mod discs;
pub mod error;
pub mod math;
pub mod pathfinding;
pub mod progression;
pub mod rng;
pub mod simulation;
pub mod trails;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::AiArchetype;
    pub use crate::arena::{Arena, ArenaVariant, Cell, ColorTag};
    pub use crate::data::levels::{build_level_table, EnemyKind, LevelConfig, LevelTable};
    pub use crate::data::stats::{StatTable, StatTemplate};
    pub use crate::discs::{Disc, DiscState};
    pub use crate::error::{GameError, Result};
    pub use crate::math::{Direction, Fixed, Position};
    pub use crate::simulation::{Entity, EntityId, EntityKind, Outcome, Simulation, TickEvents};
}
