//! The tactical hunter archetype.
//!
//! A patient five-state stalker: it holds a hunting band around the
//! target, strikes off a delta-based prediction of where the target is
//! heading, retreats behind trail cover when crowded, and teams up with
//! a nearby ally for pincer approaches. Move validation rejects dead
//! ends outright.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::{Direction, Position};
use crate::rng::SimRng;

use super::{move_away, move_toward, DecisionContext};

/// Optimal hunting distance.
const STALKING_DISTANCE: i32 = 12;
/// Attack range.
const STRIKE_DISTANCE: i32 = 6;
/// Close-quarters evasion range.
const EVASION_DISTANCE: i32 = 3;
/// Range to coordinate with allies.
const COLLABORATION_RANGE: i32 = 15;
/// Pattern recognition depth for both histories.
const PATTERN_MEMORY: usize = 15;
/// Decisions spent stalking before patience snaps into a strike.
const STALKER_PATIENCE: u32 = 30;
/// Decisions between forced flanking maneuvers.
const FLANK_PERIOD: u64 = 20;
/// A destination with this many blocked neighbors is a dead end.
const DEAD_END_THRESHOLD: usize = 3;

/// Hunter behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HunterMode {
    /// Maintain distance, observe patterns.
    Stalk,
    /// Close in for the attack.
    Strike,
    /// Tactical retreat and repositioning.
    Evade,
    /// Circle to an advantageous position.
    Flank,
    /// Pincer with a nearby ally.
    Coordinate,
}

/// Private memory of the hunter archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HunterState {
    target_history: VecDeque<Position>,
    path_history: VecDeque<Position>,
    current_direction: Direction,
    mode: HunterMode,
    stalker_patience: u32,
    /// Total decisions taken; drives the periodic flank and orbiting.
    decisions: u64,
}

impl Default for HunterState {
    fn default() -> Self {
        Self::new()
    }
}

impl HunterState {
    /// Fresh hunter memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target_history: VecDeque::with_capacity(PATTERN_MEMORY),
            path_history: VecDeque::with_capacity(PATTERN_MEMORY),
            current_direction: Direction::Down,
            mode: HunterMode::Stalk,
            stalker_patience: 0,
            decisions: 0,
        }
    }

    /// Current behavior state, for HUD/debug display.
    #[must_use]
    pub const fn mode(&self) -> HunterMode {
        self.mode
    }

    pub(super) fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        self.track(ctx.self_pos, ctx.target_pos);

        let distance = ctx.self_pos.manhattan_distance(ctx.target_pos);
        self.adapt_mode(distance, ctx);

        let chosen = match self.mode {
            HunterMode::Stalk => self.stalk(ctx, distance, rng),
            HunterMode::Strike => self.strike(ctx, rng),
            HunterMode::Evade => self.evade(ctx),
            HunterMode::Flank => self.flank(ctx),
            HunterMode::Coordinate => self.coordinate(ctx, rng),
        };

        let chosen = self.clever_handling(ctx, chosen);
        self.current_direction = chosen;
        chosen
    }

    fn adapt_mode(&mut self, distance: i32, ctx: &DecisionContext<'_>) {
        let has_nearby_allies = ctx
            .allies
            .iter()
            .any(|ally| ctx.self_pos.manhattan_distance(*ally) <= COLLABORATION_RANGE);

        self.mode = if has_nearby_allies && distance < STRIKE_DISTANCE * 2 {
            HunterMode::Coordinate
        } else if distance <= EVASION_DISTANCE {
            HunterMode::Evade
        } else if distance <= STRIKE_DISTANCE {
            HunterMode::Strike
        } else if distance <= STALKING_DISTANCE {
            HunterMode::Stalk
        } else if self.stalker_patience > STALKER_PATIENCE {
            self.stalker_patience = 0;
            HunterMode::Strike
        } else {
            HunterMode::Stalk
        };

        // Periodic flank for unpredictability
        if self.decisions > 0 && self.decisions % FLANK_PERIOD == 0 {
            self.mode = HunterMode::Flank;
        }
    }

    /// Hold the hunting band: close slowly, back off, or orbit.
    fn stalk(&mut self, ctx: &DecisionContext<'_>, distance: i32, rng: &mut SimRng) -> Direction {
        self.stalker_patience += 1;

        if distance > STALKING_DISTANCE {
            self.move_toward_weighted(ctx.self_pos, ctx.target_pos, 70, rng)
        } else if distance < STALKING_DISTANCE - 2 {
            move_away(ctx.self_pos, ctx.target_pos, self.current_direction)
        } else {
            self.orbit(ctx.self_pos, ctx.target_pos)
        }
    }

    /// Intercept the predicted target position at full aggression.
    fn strike(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        let predicted = self.predict_target(ctx);
        self.move_toward_weighted(ctx.self_pos, predicted, 100, rng)
    }

    /// Retreat, preferring a step that keeps trail cover toward the target.
    fn evade(&self, ctx: &DecisionContext<'_>) -> Direction {
        let away = move_away(ctx.self_pos, ctx.target_pos, self.current_direction);

        for dir in Direction::ALL {
            let test = ctx.self_pos.step(dir);
            if !ctx.trails.contains(test) && self.has_trail_cover(ctx, test) {
                return dir;
            }
        }

        away
    }

    /// Perpendicular cutoff, alternating side for unpredictability.
    fn flank(&self, ctx: &DecisionContext<'_>) -> Direction {
        let dx = ctx.target_pos.x - ctx.self_pos.x;
        let dy = ctx.target_pos.y - ctx.self_pos.y;

        let mut flank_dir = if dx.abs() > dy.abs() {
            if dy >= 0 {
                Direction::Down
            } else {
                Direction::Up
            }
        } else if dx >= 0 {
            Direction::Right
        } else {
            Direction::Left
        };

        if self.decisions % 3 == 0 {
            flank_dir = flank_dir.opposite();
        }

        flank_dir
    }

    /// Approach from the side of the target opposite the nearest ally.
    fn coordinate(&mut self, ctx: &DecisionContext<'_>, rng: &mut SimRng) -> Direction {
        let Some(nearest) = ctx
            .allies
            .iter()
            .filter(|ally| ctx.self_pos.manhattan_distance(**ally) > 0)
            .min_by_key(|ally| ctx.self_pos.manhattan_distance(**ally))
            .copied()
        else {
            return self.strike(ctx, rng);
        };

        let ally_dx = ctx.target_pos.x - nearest.x;
        let ally_dy = ctx.target_pos.y - nearest.y;
        let opposite = if ally_dx.abs() > ally_dy.abs() {
            if ally_dx > 0 {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if ally_dy > 0 {
            Direction::Up
        } else {
            Direction::Down
        };

        let ideal = ctx.target_pos.step_by(opposite, 2);
        self.move_toward_weighted(ctx.self_pos, ideal, 80, rng)
    }

    /// Delta prediction: extrapolate twice the target's last observed step.
    fn predict_target(&self, ctx: &DecisionContext<'_>) -> Position {
        if self.target_history.len() < 3 {
            return match ctx.target_facing {
                Some(facing) => ctx.target_pos.step_by(facing, 2),
                None => ctx.target_pos,
            };
        }

        let last = self.target_history[self.target_history.len() - 1];
        let second_last = self.target_history[self.target_history.len() - 2];
        Position::new(
            ctx.target_pos.x + (last.x - second_last.x) * 2,
            ctx.target_pos.y + (last.y - second_last.y) * 2,
        )
    }

    /// Axis-priority step, occasionally taking the secondary axis when
    /// aggression allows.
    fn move_toward_weighted(
        &self,
        from: Position,
        to: Position,
        aggression_pct: u64,
        rng: &mut SimRng,
    ) -> Direction {
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        if !rng.chance(aggression_pct) && dx != 0 && dy != 0 {
            return if rng.chance(50) {
                if dx > 0 {
                    Direction::Right
                } else {
                    Direction::Left
                }
            } else if dy > 0 {
                Direction::Down
            } else {
                Direction::Up
            };
        }

        move_toward(from, to, self.current_direction)
    }

    /// Perpendicular orbiting step around the target.
    fn orbit(&self, from: Position, to: Position) -> Direction {
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        if dx.abs() > dy.abs() {
            if self.decisions % 2 == 0 {
                Direction::Down
            } else {
                Direction::Up
            }
        } else if self.decisions % 2 == 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// A trail on the sign-step from `pos` toward the target is cover.
    fn has_trail_cover(&self, ctx: &DecisionContext<'_>, pos: Position) -> bool {
        let check = Position::new(
            pos.x + (ctx.target_pos.x - pos.x).signum(),
            pos.y + (ctx.target_pos.y - pos.y).signum(),
        );
        ctx.trails.contains(check)
    }

    /// Validate the move; reroute around trails and dead ends.
    fn clever_handling(&self, ctx: &DecisionContext<'_>, intended: Direction) -> Direction {
        let next = ctx.self_pos.step(intended);

        if ctx.trails.contains(next) || self.is_dead_end(ctx, next) {
            return self.clever_alternative(ctx, intended);
        }

        intended
    }

    /// A cell with three or more blocked neighbors is not worth entering.
    fn is_dead_end(&self, ctx: &DecisionContext<'_>, pos: Position) -> bool {
        Direction::ALL
            .iter()
            .filter(|dir| ctx.trails.contains(pos.step(**dir)))
            .count()
            >= DEAD_END_THRESHOLD
    }

    /// Perpendiculars first, preferring the one closer to the target.
    fn clever_alternative(&self, ctx: &DecisionContext<'_>, blocked: Direction) -> Direction {
        let cw = blocked.rotate_cw();
        let ccw = blocked.rotate_ccw();
        let cw_pos = ctx.self_pos.step(cw);
        let ccw_pos = ctx.self_pos.step(ccw);
        let cw_clear = !ctx.trails.contains(cw_pos);
        let ccw_clear = !ctx.trails.contains(ccw_pos);

        match (cw_clear, ccw_clear) {
            (true, true) => {
                if cw_pos.manhattan_distance(ctx.target_pos)
                    < ccw_pos.manhattan_distance(ctx.target_pos)
                {
                    cw
                } else {
                    ccw
                }
            }
            (true, false) => cw,
            (false, true) => ccw,
            (false, false) => blocked.opposite(),
        }
    }

    fn track(&mut self, self_pos: Position, target_pos: Position) {
        self.decisions += 1;
        self.path_history.push_back(self_pos);
        self.target_history.push_back(target_pos);
        if self.path_history.len() > PATTERN_MEMORY {
            self.path_history.pop_front();
        }
        if self.target_history.len() > PATTERN_MEMORY {
            self.target_history.pop_front();
        }
    }
}
