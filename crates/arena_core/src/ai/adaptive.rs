//! The boss archetype.
//!
//! Five modes chosen each decision by distance bands crossed with a
//! single random draw, plus a forced switch to chaos when the heading
//! has not changed for too long. Hunt is the only strategy in the
//! engine that calls the bounded pathfinder; everything else is local
//! heuristics over the trail snapshot.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::{Direction, Position};
use crate::pathfinding;
use crate::rng::SimRng;

use super::{move_toward, DecisionContext};

/// Linear prediction depth for hunting.
const PREDICTION_DEPTH: i32 = 5;
/// Distance band for trap setting.
const TRAP_RADIUS: i32 = 8;
/// Hunt-mode draw threshold, in percent.
const AGGRESSION_PCT: u64 = 80;
/// Positions remembered for pattern analysis.
const MEMORY_SIZE: usize = 20;
/// Unchanged-heading decisions before chaos is forced.
const STUCK_LIMIT: u32 = 10;
/// Beyond this Manhattan distance, Hunt consults the pathfinder.
const MELEE_RANGE: i32 = 2;

/// Boss behavior modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptiveMode {
    /// Direct pursuit with deep prediction.
    Hunt,
    /// Circle around to cut off escape.
    Flank,
    /// Position to create inescapable situations.
    Trap,
    /// Fake retreat to lure the target out.
    Bait,
    /// Unpredictable but not random movement.
    Chaos,
}

/// Private memory of the boss archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveState {
    move_history: VecDeque<Position>,
    last_direction: Direction,
    moves_since_direction_change: u32,
    mode: AdaptiveMode,
}

impl Default for AdaptiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveState {
    /// Fresh boss memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            move_history: VecDeque::with_capacity(MEMORY_SIZE),
            last_direction: Direction::Right,
            moves_since_direction_change: 0,
            mode: AdaptiveMode::Hunt,
        }
    }

    /// Current behavior mode, for HUD/debug display.
    #[must_use]
    pub const fn mode(&self) -> AdaptiveMode {
        self.mode
    }

    pub(super) fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        self.track(ctx.self_pos);
        self.update_mode(ctx, rng);

        let chosen = match self.mode {
            AdaptiveMode::Hunt => self.hunt(ctx),
            AdaptiveMode::Flank => self.flank(ctx, rng),
            AdaptiveMode::Trap => self.trap(ctx),
            AdaptiveMode::Bait => self.bait(ctx),
            AdaptiveMode::Chaos => self.chaos(ctx),
        };

        let chosen = Self::validate(ctx, chosen);

        if chosen == self.last_direction {
            self.moves_since_direction_change += 1;
        } else {
            self.moves_since_direction_change = 0;
        }
        self.last_direction = chosen;

        chosen
    }

    /// Weighted mode draw from distance bands and one random roll.
    fn update_mode(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) {
        let distance = ctx.self_pos.manhattan_distance(ctx.target_pos);
        let roll = rng.next() % 100;

        if distance < 5 && roll < AGGRESSION_PCT {
            self.mode = AdaptiveMode::Hunt;
        } else if distance < 10 && roll < 50 {
            self.mode = AdaptiveMode::Flank;
        } else if distance < TRAP_RADIUS && roll < 70 {
            self.mode = AdaptiveMode::Trap;
        } else if distance > 15 && roll < 30 {
            self.mode = AdaptiveMode::Bait;
        } else if roll > 85 {
            self.mode = AdaptiveMode::Chaos;
        }

        if self.moves_since_direction_change > STUCK_LIMIT {
            self.mode = AdaptiveMode::Chaos;
        }
    }

    /// Pursuit of a five-step prediction; beyond melee range the bounded
    /// pathfinder leads and the local heuristic is the fallback.
    fn hunt(&self, ctx: &DecisionContext<'_>) -> Direction {
        if ctx.self_pos.manhattan_distance(ctx.target_pos) > MELEE_RANGE {
            if let Some(step) =
                pathfinding::first_step_toward(ctx.arena, ctx.self_pos, ctx.target_pos)
            {
                return step;
            }
        }

        let predicted = match ctx.target_facing {
            Some(facing) => ctx.target_pos.step_by(facing, PREDICTION_DEPTH),
            None => ctx.target_pos,
        };
        move_toward(ctx.self_pos, predicted, self.last_direction)
    }

    /// Mostly perpendicular interception, else straight hunting.
    fn flank(&self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        let dx = ctx.target_pos.x - ctx.self_pos.x;
        let dy = ctx.target_pos.y - ctx.self_pos.y;

        if rng.chance(60) {
            if dx.abs() > dy.abs() {
                if dy >= 0 {
                    Direction::Down
                } else {
                    Direction::Up
                }
            } else if dx >= 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else {
            self.hunt(ctx)
        }
    }

    /// Pick the neighbor that scores best for boxing the target in.
    fn trap(&self, ctx: &DecisionContext<'_>) -> Direction {
        let mut best_dir = self.last_direction;
        let mut max_score = 0;

        for dir in Direction::ALL {
            let next = ctx.self_pos.step(dir);
            let score = Self::trap_score(ctx, next);
            if score > max_score {
                max_score = score;
                best_dir = dir;
            }
        }

        best_dir
    }

    /// Proximity to the target plus a bonus per adjacent trail cell.
    fn trap_score(ctx: &DecisionContext<'_>, pos: Position) -> i32 {
        let mut score = 20 - pos.manhattan_distance(ctx.target_pos);
        for dir in Direction::ALL {
            if ctx.trails.contains(pos.step(dir)) {
                score += 3;
            }
        }
        score
    }

    /// Feigned retreat: widen the gap on the dominant axis.
    fn bait(&self, ctx: &DecisionContext<'_>) -> Direction {
        let dx = ctx.self_pos.x - ctx.target_pos.x;
        let dy = ctx.self_pos.y - ctx.target_pos.y;

        if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy.abs() > 0 {
            if dy > 0 {
                Direction::Down
            } else {
                Direction::Up
            }
        } else {
            self.last_direction
        }
    }

    /// Deterministic "randomness": a hash of the current position mixed
    /// with a coarse time bucket, nudged clockwise off blocked cells.
    fn chaos(&self, ctx: &DecisionContext<'_>) -> Direction {
        let position_hash =
            (ctx.self_pos.x as u64).wrapping_mul(31).wrapping_add(ctx.self_pos.y as u64);
        let time_bucket = ctx.tick / 16;
        let seed = position_hash ^ time_bucket;

        let mut choice = Direction::ALL[(seed % 4) as usize];
        if ctx.trails.contains(ctx.self_pos.step(choice)) {
            choice = choice.rotate_cw();
        }

        choice
    }

    /// Final pass: on collision, any unblocked direction will do.
    fn validate(ctx: &DecisionContext<'_>, direction: Direction) -> Direction {
        if ctx.trails.contains(ctx.self_pos.step(direction)) {
            for alt in Direction::ALL {
                if !ctx.trails.contains(ctx.self_pos.step(alt)) {
                    return alt;
                }
            }
        }
        direction
    }

    fn track(&mut self, pos: Position) {
        self.move_history.push_back(pos);
        if self.move_history.len() > MEMORY_SIZE {
            self.move_history.pop_front();
        }
    }
}
