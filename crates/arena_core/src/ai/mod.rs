//! Enemy decision strategies.
//!
//! Each enemy carries one of four archetypes behind a common `decide`
//! contract: given an immutable view of the world, produce the next
//! movement direction, updating only the archetype's private bounded
//! memory (mode enum plus recent-position history) as a side effect.
//!
//! Archetypes treat trail cells as the hazard to steer around; solid
//! walls are left to the collision resolver, exactly like the rest of
//! the movement pipeline. All dice go through the shared [`SimRng`]
//! stream so replays stay deterministic.

mod adaptive;
mod erratic;
mod hunter;
mod predictive;

pub use adaptive::{AdaptiveMode, AdaptiveState};
pub use erratic::ErraticState;
pub use hunter::{HunterMode, HunterState};
pub use predictive::{PredictiveMode, PredictiveState};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::math::{Direction, Position};
use crate::rng::SimRng;

/// Immutable snapshot of every trail cell, taken at decision time.
///
/// Entities decided later in a tick see trails laid earlier in the same
/// tick; that ordering is part of the scheduler contract.
#[derive(Debug, Clone, Default)]
pub struct TrailSnapshot {
    cells: HashSet<Position>,
}

impl TrailSnapshot {
    /// Collect the current trail cells from the arena.
    #[must_use]
    pub fn capture(arena: &Arena) -> Self {
        let mut cells = HashSet::new();
        for y in 0..arena.height() {
            for x in 0..arena.width() {
                let pos = Position::new(x, y);
                if arena.cell_at(pos).is_some_and(|c| c.is_trail()) {
                    cells.insert(pos);
                }
            }
        }
        Self { cells }
    }

    /// True if a trail cell occupied `pos` at capture time.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Everything an archetype may look at while deciding.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// The arena grid (bounds, statics; Hunt's pathfinder reads it).
    pub arena: &'a Arena,
    /// Trail cells at decision time.
    pub trails: &'a TrailSnapshot,
    /// The deciding entity's cell.
    pub self_pos: Position,
    /// The pursued target's cell (the player).
    pub target_pos: Position,
    /// The target's last facing, when it has one.
    pub target_facing: Option<Direction>,
    /// Positions of living allied enemies, excluding the decider.
    pub allies: &'a [Position],
    /// Current simulation tick.
    pub tick: u64,
}

/// One of the four enemy decision strategies, with its private memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AiArchetype {
    /// Weak, mostly random wanderer.
    Erratic(ErraticState),
    /// Standard enforcer with basic prediction.
    Predictive(PredictiveState),
    /// Tactical hunter with pattern tracking and coordination.
    Hunter(HunterState),
    /// Boss strategist cycling through five modes.
    Adaptive(AdaptiveState),
}

impl AiArchetype {
    /// Decide the next movement direction.
    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        match self {
            Self::Erratic(state) => state.decide(ctx, rng),
            Self::Predictive(state) => state.decide(ctx, rng),
            Self::Hunter(state) => state.decide(ctx, rng),
            Self::Adaptive(state) => state.decide(ctx, rng),
        }
    }
}

/// Axis-priority step toward `to`, falling back when already there.
pub(crate) fn move_toward(from: Position, to: Position, fallback: Direction) -> Direction {
    from.direction_toward(to).unwrap_or(fallback)
}

/// Axis-priority step away from `to`.
pub(crate) fn move_away(from: Position, to: Position, fallback: Direction) -> Direction {
    from.direction_toward(to)
        .map_or(fallback, Direction::opposite)
}

/// Uniform random direction.
pub(crate) fn random_direction(rng: &mut SimRng) -> Direction {
    Direction::ALL[(rng.next() % 4) as usize]
}
