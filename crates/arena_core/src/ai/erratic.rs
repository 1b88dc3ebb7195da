//! The weak, erratic archetype.
//!
//! Mostly random wandering with a feeble pull toward the target, panic
//! when the target gets close, and a forced direction change after
//! holding one heading too long. No mode enum; the whole strategy is
//! dice plus two counters.

use serde::{Deserialize, Serialize};

use crate::math::{Direction, Position};
use crate::rng::SimRng;

use super::{move_away, random_direction, DecisionContext};

/// Share of steps that are pure random movement, in percent.
const RANDOM_FACTOR: u64 = 60;
/// Chance of swapping the pursuit axes ("confusion"), in percent.
const AXIS_CONFUSION: u64 = 30;
/// Chance of random movement while panicking, in percent.
const PANIC_RANDOM: u64 = 40;
/// Chance of an unprompted direction change after a clear move.
const JITTER: u64 = 20;
/// Consecutive same-direction decisions before a forced change.
const MAX_SAME_DIRECTION: u32 = 3;
/// Manhattan distance below which the target is frighteningly close.
const PANIC_DISTANCE: i32 = 4;

/// Private memory of the erratic archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErraticState {
    current_direction: Direction,
    moves_in_direction: u32,
}

impl ErraticState {
    /// Start with an initial heading.
    #[must_use]
    pub const fn new(initial: Direction) -> Self {
        Self {
            current_direction: initial,
            moves_in_direction: 0,
        }
    }

    pub(super) fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        let distance = ctx.self_pos.manhattan_distance(ctx.target_pos);

        let mut chosen = if distance < PANIC_DISTANCE {
            self.panic(ctx, rng)
        } else if rng.chance(RANDOM_FACTOR) {
            random_direction(rng)
        } else {
            self.weak_pursuit(ctx, rng)
        };

        chosen = self.erratic_handling(ctx, chosen, rng);

        if chosen == self.current_direction {
            self.moves_in_direction += 1;
        } else {
            self.moves_in_direction = 0;
            self.current_direction = chosen;
        }

        if self.moves_in_direction >= MAX_SAME_DIRECTION {
            self.current_direction = random_direction(rng);
            self.moves_in_direction = 0;
            chosen = self.current_direction;
        }

        chosen
    }

    /// Flee, with residual randomness.
    fn panic(&self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        if rng.chance(PANIC_RANDOM) {
            random_direction(rng)
        } else {
            move_away(ctx.self_pos, ctx.target_pos, self.current_direction)
        }
    }

    /// Toward the target, sometimes on the wrong axis.
    fn weak_pursuit(&self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        let mut dx = ctx.target_pos.x - ctx.self_pos.x;
        let mut dy = ctx.target_pos.y - ctx.self_pos.y;

        if rng.chance(AXIS_CONFUSION) {
            std::mem::swap(&mut dx, &mut dy);
        }

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
            self.current_direction
        }
    }

    /// Minimal avoidance plus unprompted jitter.
    fn erratic_handling(
        &self,
        ctx: &DecisionContext<'_>,
        intended: Direction,
        rng: &mut SimRng,
    ) -> Direction {
        let blocked = |pos: Position| ctx.trails.contains(pos);

        if blocked(ctx.self_pos.step(intended)) {
            let alternatives: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|dir| *dir != intended && !blocked(ctx.self_pos.step(*dir)))
                .collect();
            return rng
                .pick(&alternatives)
                .copied()
                .unwrap_or_else(|| intended.opposite());
        }

        if rng.chance(JITTER) {
            let random_dir = random_direction(rng);
            if !blocked(ctx.self_pos.step(random_dir)) {
                return random_dir;
            }
        }

        intended
    }
}
