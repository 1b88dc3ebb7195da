//! Disc throw and recapture physics.
//!
//! Every disc is created at roster registration and persists for the
//! whole level, transitioning only between held and in-flight. An
//! in-flight disc never moves on its own; it sits on the grid as a
//! hazard until its owner recaptures it from an adjacent cell.

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Cell};
use crate::math::{Direction, Position};

/// Maximum requested throw distance.
pub const MAX_THROW_DISTANCE: i32 = 3;

/// Held or flying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscState {
    /// Carried by the owner; follows the owner's position.
    Held,
    /// Landed on the grid after a throw.
    InFlight {
        /// Direction the disc was thrown in.
        direction: Direction,
        /// Cells actually traveled (may be less than requested).
        distance: i32,
    },
}

/// One disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disc {
    /// Entity the disc belongs to, for its whole lifetime.
    pub owner: u64,
    /// Current cell.
    pub position: Position,
    /// Held or in-flight.
    pub state: DiscState,
}

impl Disc {
    /// True while the disc sits on the grid.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self.state, DiscState::InFlight { .. })
    }
}

/// All discs on the level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscSystem {
    discs: Vec<Disc>,
}

impl DiscSystem {
    /// Create an empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` held discs for an entity at its spawn position.
    ///
    /// # Panics
    ///
    /// Panics if the entity already has discs registered.
    pub fn register(&mut self, owner: u64, position: Position, count: u32) {
        assert!(
            !self.discs.iter().any(|d| d.owner == owner),
            "entity {owner} registered twice for discs"
        );
        for _ in 0..count {
            self.discs.push(Disc {
                owner,
                position,
                state: DiscState::Held,
            });
        }
    }

    /// Add one held disc to an already registered owner.
    ///
    /// Used by level-up rewards.
    pub fn grant(&mut self, owner: u64, position: Position) {
        self.discs.push(Disc {
            owner,
            position,
            state: DiscState::Held,
        });
    }

    /// True if the owner has at least one held disc to throw.
    #[must_use]
    pub fn can_throw(&self, owner: u64) -> bool {
        self.discs
            .iter()
            .any(|d| d.owner == owner && d.state == DiscState::Held)
    }

    /// Number of discs the owner currently holds.
    #[must_use]
    pub fn held_count(&self, owner: u64) -> u32 {
        self.discs
            .iter()
            .filter(|d| d.owner == owner && d.state == DiscState::Held)
            .count() as u32
    }

    /// Throw one held disc from `from` and return its landing cell.
    ///
    /// Walks up to `requested_distance` steps (clamped to `[1, 3]`);
    /// a step is blocked by Wall, Obstacle, or any Trail. A blocked
    /// first step fails the throw outright and leaves the disc held.
    ///
    /// # Panics
    ///
    /// Panics if the owner has no discs registered at all; an owner
    /// whose discs are merely all in flight just fails the throw.
    pub fn throw(
        &mut self,
        arena: &Arena,
        owner: u64,
        from: Position,
        direction: Direction,
        requested_distance: i32,
    ) -> Option<Position> {
        assert!(
            self.discs.iter().any(|d| d.owner == owner),
            "entity {owner} throwing with no discs registered"
        );
        if !self.can_throw(owner) {
            return None;
        }

        let distance = requested_distance.clamp(1, MAX_THROW_DISTANCE);
        let mut landed = from;
        let mut traveled = 0;
        for _ in 0..distance {
            let next = landed.step(direction);
            if throw_blocked(arena, next) {
                break;
            }
            landed = next;
            traveled += 1;
        }

        if traveled == 0 {
            return None;
        }

        let disc = self
            .discs
            .iter_mut()
            .find(|d| d.owner == owner && d.state == DiscState::Held)?;
        disc.position = landed;
        disc.state = DiscState::InFlight {
            direction,
            distance: traveled,
        };
        tracing::debug!(owner, ?landed, traveled, "Disc thrown");
        Some(landed)
    }

    /// Attempt to recapture one of `entity`'s in-flight discs.
    ///
    /// Succeeds only for the disc's owner standing within Chebyshev
    /// distance 1 of the disc (adjacent including diagonals, or the same
    /// cell); the disc snaps to the owner's cell and becomes held. Any
    /// other call is a no-op returning `false`.
    pub fn recapture(&mut self, entity: u64, entity_pos: Position) -> bool {
        let Some(disc) = self.discs.iter_mut().find(|d| {
            d.owner == entity
                && d.is_in_flight()
                && d.position.chebyshev_distance(entity_pos) <= 1
        }) else {
            return false;
        };
        disc.position = entity_pos;
        disc.state = DiscState::Held;
        tracing::debug!(owner = entity, ?entity_pos, "Disc recaptured");
        true
    }

    /// Keep held discs co-located with their owner.
    pub fn follow_owner(&mut self, owner: u64, position: Position) {
        for disc in &mut self.discs {
            if disc.owner == owner && disc.state == DiscState::Held {
                disc.position = position;
            }
        }
    }

    /// An in-flight disc at `pos` not owned by `mover`, if any.
    #[must_use]
    pub fn hostile_disc_at(&self, pos: Position, mover: u64) -> Option<&Disc> {
        self.discs
            .iter()
            .find(|d| d.is_in_flight() && d.position == pos && d.owner != mover)
    }

    /// All discs, held and in-flight.
    #[must_use]
    pub fn discs(&self) -> &[Disc] {
        &self.discs
    }
}

/// A disc stops before walls, obstacles, and any trail.
fn throw_blocked(arena: &Arena, pos: Position) -> bool {
    match arena.cell_at(pos) {
        Some(Cell::Empty) => false,
        Some(Cell::Wall | Cell::Obstacle | Cell::Trail { .. } | Cell::Void) | None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaVariant;

    fn open_field() -> Arena {
        Arena::generate(ArenaVariant::Classic, 0)
    }

    fn arena_with_obstacle(pos: Position) -> Arena {
        Arena::with_layout(false, |arena| {
            arena.place_static(pos, Cell::Obstacle);
        })
    }

    #[test]
    fn test_throw_lands_before_obstacle() {
        let arena = arena_with_obstacle(Position::new(13, 10));
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(10, 10), 3);

        let landed = discs.throw(&arena, 1, Position::new(10, 10), Direction::Right, 3);
        assert_eq!(landed, Some(Position::new(12, 10)));
        let disc = discs.discs().iter().find(|d| d.is_in_flight()).unwrap();
        assert_eq!(
            disc.state,
            DiscState::InFlight {
                direction: Direction::Right,
                distance: 2
            }
        );
    }

    #[test]
    fn test_throw_fails_when_first_step_blocked() {
        let arena = arena_with_obstacle(Position::new(11, 10));
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(10, 10), 3);

        let landed = discs.throw(&arena, 1, Position::new(10, 10), Direction::Right, 3);
        assert_eq!(landed, None);
        assert_eq!(discs.held_count(1), 3);
        assert!(discs.discs().iter().all(|d| d.position == Position::new(10, 10)));
    }

    #[test]
    fn test_throw_full_distance_on_clear_ground() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(10, 10), 1);

        let landed = discs.throw(&arena, 1, Position::new(10, 10), Direction::Down, 3);
        assert_eq!(landed, Some(Position::new(10, 13)));
        assert!(!discs.can_throw(1));
    }

    #[test]
    fn test_throw_with_all_discs_in_flight_fails() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(10, 10), 1);
        discs.throw(&arena, 1, Position::new(10, 10), Direction::Right, 2);

        assert_eq!(
            discs.throw(&arena, 1, Position::new(10, 10), Direction::Left, 2),
            None
        );
    }

    #[test]
    #[should_panic(expected = "no discs registered")]
    fn test_throw_without_registration_panics() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.throw(&arena, 9, Position::new(10, 10), Direction::Right, 1);
    }

    #[test]
    fn test_recapture_adjacent_succeeds() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(5, 8), 1);
        discs.throw(&arena, 1, Position::new(5, 8), Direction::Up, 3);
        // Disc now at (5,5); owner stands at (5,6)
        assert!(discs.recapture(1, Position::new(5, 6)));
        let disc = &discs.discs()[0];
        assert_eq!(disc.state, DiscState::Held);
        assert_eq!(disc.position, Position::new(5, 6));
    }

    #[test]
    fn test_recapture_too_far_fails() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(5, 9), 1);
        discs.throw(&arena, 1, Position::new(5, 9), Direction::Up, 3);
        // Disc at (5,6); owner at (5,8) is two cells away
        assert!(!discs.recapture(1, Position::new(5, 8)));
        assert!(discs.discs()[0].is_in_flight());
    }

    #[test]
    fn test_recapture_by_non_owner_fails() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(5, 8), 1);
        discs.register(2, Position::new(20, 20), 1);
        discs.throw(&arena, 1, Position::new(5, 8), Direction::Up, 3);

        // Entity 2 standing on the disc's own cell still cannot take it
        assert!(!discs.recapture(2, Position::new(5, 5)));
    }

    #[test]
    fn test_recapture_diagonal_succeeds() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(5, 8), 1);
        discs.throw(&arena, 1, Position::new(5, 8), Direction::Up, 3);
        // Disc at (5,5); diagonal neighbor (6,6) is Chebyshev 1
        assert!(discs.recapture(1, Position::new(6, 6)));
    }

    #[test]
    fn test_held_discs_follow_owner() {
        let arena = open_field();
        let mut discs = DiscSystem::new();
        discs.register(1, Position::new(5, 5), 2);
        discs.throw(&arena, 1, Position::new(5, 5), Direction::Right, 1);

        discs.follow_owner(1, Position::new(5, 6));
        let held: Vec<_> = discs
            .discs()
            .iter()
            .filter(|d| d.state == DiscState::Held)
            .collect();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].position, Position::new(5, 6));
        // The in-flight disc stays put
        assert!(discs.hostile_disc_at(Position::new(6, 5), 2).is_some());
    }
}
