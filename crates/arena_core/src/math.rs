//! Grid math: positions, directions, and fixed-point numbers.
//!
//! All simulation arithmetic uses fixed-point numbers to ensure
//! deterministic behavior across platforms. Floating-point operations
//! can produce different results on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Lives are tracked in half-unit steps, speeds and accumulators in
/// arbitrary fractions; both fit this type exactly.
pub type Fixed = I32F32;

/// One half in fixed-point (the granularity of life deductions).
pub const HALF: Fixed = Fixed::from_bits(1 << 31);

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// A cell coordinate on the arena grid.
///
/// Immutable value type; arithmetic goes through [`Direction`] deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column, increasing rightward.
    pub x: i32,
    /// Row, increasing downward.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position one step in `direction` from here.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The position `steps` cells in `direction` from here.
    #[must_use]
    pub const fn step_by(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }

    /// Manhattan distance: |dx| + |dy|.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance: max(|dx|, |dy|).
    ///
    /// Used for disc recapture adjacency (diagonals count).
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The axis-priority direction from `self` toward `target`.
    ///
    /// Prefers the axis with the greater absolute distance; returns
    /// `None` when the positions coincide.
    #[must_use]
    pub fn direction_toward(self, target: Self) -> Option<Direction> {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if dy > 0 { Direction::Down } else { Direction::Up })
        }
    }
}

/// One of the four cardinal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Negative Y.
    Up,
    /// Positive Y.
    Down,
    /// Negative X.
    Left,
    /// Positive X.
    Right,
}

impl Direction {
    /// All directions in canonical iteration order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The (dx, dy) cell delta for one step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Rotate 90 degrees clockwise (screen coordinates, Y down).
    #[must_use]
    pub const fn rotate_cw(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Rotate 90 degrees counter-clockwise.
    #[must_use]
    pub const fn rotate_ccw(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// Stable index into [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_step_by() {
        let p = Position::new(10, 10);
        assert_eq!(p.step(Direction::Up), Position::new(10, 9));
        assert_eq!(p.step(Direction::Right), Position::new(11, 10));
        assert_eq!(p.step_by(Direction::Down, 3), Position::new(10, 13));
    }

    #[test]
    fn test_distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, -4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(a.chebyshev_distance(b), 4);
        // Chebyshev counts diagonals as one step
        assert_eq!(Position::new(5, 5).chebyshev_distance(Position::new(6, 6)), 1);
    }

    #[test]
    fn test_direction_toward_prefers_longer_axis() {
        let from = Position::new(0, 0);
        assert_eq!(from.direction_toward(Position::new(5, 2)), Some(Direction::Right));
        assert_eq!(from.direction_toward(Position::new(-1, -6)), Some(Direction::Up));
        // Equal axes fall to the vertical branch
        assert_eq!(from.direction_toward(Position::new(2, 2)), Some(Direction::Down));
        assert_eq!(from.direction_toward(from), None);
    }

    #[test]
    fn test_rotations_are_inverse() {
        for dir in Direction::ALL {
            assert_eq!(dir.rotate_cw().rotate_ccw(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.rotate_cw().rotate_cw(), dir.opposite());
        }
    }

    #[test]
    fn test_half_constant() {
        assert_eq!(HALF + HALF, Fixed::ONE);
    }
}
