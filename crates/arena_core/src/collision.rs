//! Move classification and trap detection.
//!
//! The resolver is a state-free classifier: it inspects an attempted
//! move against the grid and the disc field and reports what happened.
//! The tick scheduler applies the life-cost consequences, in strict
//! precedence order: void fall, trail strike, solid block, disc strike,
//! free move.

use crate::arena::{Arena, Cell};
use crate::discs::DiscSystem;
use crate::math::{Direction, Fixed, Position, HALF};

/// Life cost of striking any trail cell.
pub const TRAIL_COST: Fixed = HALF;
/// Life cost of stepping onto a hostile in-flight disc.
pub const DISC_COST: Fixed = Fixed::ONE;
/// Life cost the player pays for sharing a cell with an enemy.
pub const FACE_TO_FACE_COST: Fixed = Fixed::ONE;
/// Forced life cost per tick while trapped.
pub const TRAPPED_COST: Fixed = HALF;

/// What an attempted move ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveClass {
    /// Destination is empty; the move goes through.
    Free,
    /// Destination is off an open arena's rim: instant derez.
    VoidFall,
    /// Destination is a trail cell; blocked, half a life, all trails go.
    TrailStrike,
    /// Destination is a wall or obstacle, or out of a closed arena.
    Blocked,
}

/// Full classification of one attempted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveVerdict {
    /// Primary outcome, in precedence order.
    pub class: MoveClass,
    /// Owner of a hostile in-flight disc on the destination, if any.
    ///
    /// Disc damage applies on top of the primary outcome and never
    /// blocks traversal by itself.
    pub disc_strike: Option<u64>,
}

impl MoveVerdict {
    /// True when the mover actually changes cell.
    #[must_use]
    pub const fn permits_movement(&self) -> bool {
        matches!(self.class, MoveClass::Free)
    }
}

/// Classify a move by `mover` from its current cell to `dest`.
#[must_use]
pub fn classify_move(
    arena: &Arena,
    discs: &DiscSystem,
    mover: u64,
    dest: Position,
) -> MoveVerdict {
    let disc_strike = discs.hostile_disc_at(dest, mover).map(|d| d.owner);

    let class = match arena.cell_at(dest) {
        Some(Cell::Void) => MoveClass::VoidFall,
        None => MoveClass::Blocked,
        Some(Cell::Trail { .. }) => MoveClass::TrailStrike,
        Some(Cell::Wall | Cell::Obstacle) => MoveClass::Blocked,
        Some(Cell::Empty) => MoveClass::Free,
    };

    MoveVerdict { class, disc_strike }
}

/// The flavor of forced damage a trapped entity takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrappedKind {
    /// At least one surrounding cell is a trail.
    TrailPressure,
    /// Boxed in by solids alone.
    Crushed,
}

/// Check whether an entity whose move was just blocked is fully trapped.
///
/// Trapped means all 4 neighbors are simultaneously non-traversable
/// (wall, obstacle, trail, or out of a closed arena). Open-arena rim
/// cells are an escape, not a blocker. Returns the damage flavor, or
/// `None` when at least one neighbor is free.
#[must_use]
pub fn trapped_state(arena: &Arena, pos: Position) -> Option<TrappedKind> {
    if arena.blocked_neighbor_count(pos) < 4 {
        return None;
    }
    let next_to_trail = Direction::ALL
        .iter()
        .any(|dir| matches!(arena.cell_at(pos.step(*dir)), Some(cell) if cell.is_trail()));
    Some(if next_to_trail {
        TrappedKind::TrailPressure
    } else {
        TrappedKind::Crushed
    })
}
