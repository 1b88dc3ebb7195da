//! The arena grid: static layout plus the dynamic trail overlay.
//!
//! An arena is a fixed 40x40 cell grid generated once at construction.
//! Walls, obstacles, and the open/closed flag never change afterwards;
//! trail cells are the only mutable cell kind. Entities and discs are
//! overlaid on top of the grid by the simulation, never stored in cells.

use serde::{Deserialize, Serialize};

use crate::math::{Direction, Position};
use crate::rng::SimRng;

/// Canonical grid width in cells.
pub const GRID_WIDTH: i32 = 40;
/// Canonical grid height in cells.
pub const GRID_HEIGHT: i32 = 40;

/// Display color assigned to an entity and its trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorTag(pub u8);

impl ColorTag {
    /// Player blue.
    pub const BLUE: Self = Self(0);
    /// Erratic green.
    pub const GREEN: Self = Self(1);
    /// Enforcer yellow.
    pub const YELLOW: Self = Self(2);
    /// Hunter red.
    pub const RED: Self = Self(3);
    /// Boss gold.
    pub const GOLD: Self = Self(4);
}

/// One grid cell.
///
/// Exactly one kind occupies a position at a time. `Wall`, `Obstacle`,
/// and `Void` are fixed at generation time; `Trail` comes and goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Traversable floor.
    #[default]
    Empty,
    /// Solid boundary or divider.
    Wall,
    /// Solid interior block.
    Obstacle,
    /// Light-trail left by an entity; destructible hazard.
    Trail {
        /// Entity that laid this trail segment.
        owner: u64,
        /// Color of the owning entity.
        color: ColorTag,
    },
    /// The drop beyond an open arena's rim.
    Void,
}

impl Cell {
    /// True for the trail variant, any owner.
    #[must_use]
    pub const fn is_trail(self) -> bool {
        matches!(self, Self::Trail { .. })
    }

    /// True if an entity may stand here.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The four one-time generation routines.
///
/// Variants differ only in generation; the grid contract is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArenaVariant {
    /// Closed square with solid perimeter walls and an empty interior.
    Classic,
    /// Closed room-grid maze with wide corridors.
    Maze,
    /// No boundary at all; stepping off the rim derezzes the mover.
    Open,
    /// Closed arena with seeded obstacle scatter.
    Procedural,
}

impl ArenaVariant {
    /// Human-readable variant name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic Grid",
            Self::Maze => "Neon Maze",
            Self::Open => "Open Frontier",
            Self::Procedural => "Procedural Arena",
        }
    }
}

/// Fixed 40x40 cell grid with an open/closed flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    open: bool,
    /// Set once generation finishes; static placement afterwards panics.
    sealed: bool,
}

impl Arena {
    fn empty(open: bool) -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            cells: vec![Cell::Empty; (GRID_WIDTH * GRID_HEIGHT) as usize],
            open,
            sealed: false,
        }
    }

    /// Build a bespoke arena layout.
    ///
    /// Starts from an all-empty grid, hands it to `build` for static
    /// placement, then seals it. Used for scripted scenarios and tests;
    /// campaign levels go through [`Arena::generate`].
    #[must_use]
    pub fn with_layout(open: bool, build: impl FnOnce(&mut Self)) -> Self {
        let mut arena = Self::empty(open);
        build(&mut arena);
        arena.sealed = true;
        arena
    }

    /// Generate an arena of the given variant.
    ///
    /// Only the procedural variant reads `seed`; the fixed layouts
    /// ignore it.
    #[must_use]
    pub fn generate(variant: ArenaVariant, seed: u64) -> Self {
        let mut arena = match variant {
            ArenaVariant::Classic => Self::generate_classic(),
            ArenaVariant::Maze => Self::generate_maze(),
            ArenaVariant::Open => Self::generate_open(),
            ArenaVariant::Procedural => Self::generate_procedural(seed),
        };
        arena.sealed = true;
        arena
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// True when out-of-grid coordinates are a lethal drop.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Check if a position lies on the grid.
    #[must_use]
    pub const fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Cell at a position.
    ///
    /// Out-of-bounds positions read as `Some(Void)` in an open arena and
    /// `None` in a closed one.
    #[must_use]
    pub fn cell_at(&self, pos: Position) -> Option<Cell> {
        if self.is_in_bounds(pos) {
            Some(self.cells[self.index(pos)])
        } else if self.open {
            Some(Cell::Void)
        } else {
            None
        }
    }

    /// True if an entity may stand at `pos` (in-bounds and `Empty`).
    #[must_use]
    pub fn is_traversable(&self, pos: Position) -> bool {
        self.is_in_bounds(pos) && self.cells[self.index(pos)].is_traversable()
    }

    /// True if stepping to `pos` means falling off an open arena.
    #[must_use]
    pub const fn falls_to_void(&self, pos: Position) -> bool {
        self.open && !self.is_in_bounds(pos)
    }

    /// Place a static cell during generation.
    ///
    /// # Panics
    ///
    /// Panics if the arena is already sealed or `kind` is not a static
    /// cell kind; both indicate a generation bug.
    pub fn place_static(&mut self, pos: Position, kind: Cell) {
        assert!(!self.sealed, "static placement after arena generation");
        assert!(
            matches!(kind, Cell::Wall | Cell::Obstacle | Cell::Void),
            "place_static requires a static cell kind"
        );
        if self.is_in_bounds(pos) {
            let idx = self.index(pos);
            self.cells[idx] = kind;
        }
    }

    /// Lay a trail cell at `pos` if that cell is currently empty.
    pub(crate) fn lay_trail(&mut self, pos: Position, owner: u64, color: ColorTag) {
        if self.is_traversable(pos) {
            let idx = self.index(pos);
            self.cells[idx] = Cell::Trail { owner, color };
        }
    }

    /// Convert every trail cell back to empty.
    pub(crate) fn clear_all_trails(&mut self) {
        for cell in &mut self.cells {
            if cell.is_trail() {
                *cell = Cell::Empty;
            }
        }
    }

    /// Convert only trail cells owned by `owner` back to empty.
    pub(crate) fn clear_trails_owned_by(&mut self, owner: u64) {
        for cell in &mut self.cells {
            if matches!(*cell, Cell::Trail { owner: o, .. } if o == owner) {
                *cell = Cell::Empty;
            }
        }
    }

    /// Number of trail cells currently on the grid.
    #[must_use]
    pub fn trail_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_trail()).count()
    }

    /// Count of `pos`'s 4 neighbors that cannot be stood on.
    ///
    /// Out-of-bounds neighbors count as blocked in a closed arena; in an
    /// open arena they are a drop, not a blocker.
    #[must_use]
    pub fn blocked_neighbor_count(&self, pos: Position) -> usize {
        Direction::ALL
            .iter()
            .filter(|dir| {
                let next = pos.step(**dir);
                if self.is_in_bounds(next) {
                    !self.cells[self.index(next)].is_traversable()
                } else {
                    !self.open
                }
            })
            .count()
    }

    /// True if any of `pos`'s 4 neighbors is a trail cell.
    #[must_use]
    pub fn has_adjacent_trail(&self, pos: Position) -> bool {
        Direction::ALL
            .iter()
            .any(|dir| matches!(self.cell_at(pos.step(*dir)), Some(cell) if cell.is_trail()))
    }

    // --- generation routines ---

    fn perimeter_walls(arena: &mut Arena) {
        for x in 0..GRID_WIDTH {
            arena.place_static(Position::new(x, 0), Cell::Wall);
            arena.place_static(Position::new(x, GRID_HEIGHT - 1), Cell::Wall);
        }
        for y in 0..GRID_HEIGHT {
            arena.place_static(Position::new(0, y), Cell::Wall);
            arena.place_static(Position::new(GRID_WIDTH - 1, y), Cell::Wall);
        }
    }

    fn generate_classic() -> Self {
        let mut arena = Self::empty(false);
        Self::perimeter_walls(&mut arena);
        arena
    }

    fn generate_maze() -> Self {
        const ROOM_SIZE: i32 = 10;
        const CORRIDOR_WIDTH: i32 = 4;

        let mut arena = Self::empty(false);
        Self::perimeter_walls(&mut arena);

        // Horizontal dividers with corridor gaps centered in each room span.
        let mut y = ROOM_SIZE;
        while y < GRID_HEIGHT - 1 {
            for x in 1..GRID_WIDTH - 1 {
                let section_mid = (x / ROOM_SIZE) * ROOM_SIZE + ROOM_SIZE / 2;
                if (x - section_mid).abs() > CORRIDOR_WIDTH / 2 {
                    arena.place_static(Position::new(x, y), Cell::Wall);
                }
            }
            y += ROOM_SIZE;
        }

        // Vertical dividers, gaps offset away from the horizontal walls.
        let mut x = ROOM_SIZE;
        while x < GRID_WIDTH - 1 {
            for y in 1..GRID_HEIGHT - 1 {
                let section_mid = (y / ROOM_SIZE) * ROOM_SIZE + ROOM_SIZE / 2;
                let near_horizontal_wall =
                    (y % ROOM_SIZE) < 2 || (y % ROOM_SIZE) > ROOM_SIZE - 3;
                if (y - section_mid).abs() > CORRIDOR_WIDTH / 2 && !near_horizontal_wall {
                    arena.place_static(Position::new(x, y), Cell::Wall);
                }
            }
            x += ROOM_SIZE;
        }

        // Strategic obstacles at alternating room intersections.
        let mut ox = ROOM_SIZE;
        while ox < GRID_WIDTH - ROOM_SIZE {
            let mut oy = ROOM_SIZE;
            while oy < GRID_HEIGHT - ROOM_SIZE {
                arena.place_static(Position::new(ox, oy), Cell::Obstacle);
                oy += ROOM_SIZE * 2;
            }
            ox += ROOM_SIZE * 2;
        }

        arena
    }

    fn generate_open() -> Self {
        // 45-degree steps around a radius-12 ring, truncated to cells.
        const RING_OFFSETS: [(i32, i32); 8] = [
            (12, 0),
            (8, 8),
            (0, 12),
            (-8, 8),
            (-12, 0),
            (-8, -8),
            (0, -12),
            (8, -8),
        ];

        let mut arena = Self::empty(true);
        let center_x = GRID_WIDTH / 2;
        let center_y = GRID_HEIGHT / 2;

        // Central cross-shaped formation.
        for i in -3..=3 {
            arena.place_static(Position::new(center_x + i, center_y), Cell::Obstacle);
            arena.place_static(Position::new(center_x, center_y + i), Cell::Obstacle);
        }

        // Hollow corner platforms, inset from the rim.
        Self::hollow_platform(&mut arena, 5, 5, 4);
        Self::hollow_platform(&mut arena, GRID_WIDTH - 9, 5, 4);
        Self::hollow_platform(&mut arena, 5, GRID_HEIGHT - 9, 4);
        Self::hollow_platform(&mut arena, GRID_WIDTH - 9, GRID_HEIGHT - 9, 4);

        // Mid-edge platforms.
        Self::hollow_platform(&mut arena, center_x - 2, 5, 3);
        Self::hollow_platform(&mut arena, center_x - 2, GRID_HEIGHT - 8, 3);
        Self::hollow_platform(&mut arena, 5, center_y - 2, 3);
        Self::hollow_platform(&mut arena, GRID_WIDTH - 8, center_y - 2, 3);

        // Scattered singles.
        for (x, y) in [(15, 15), (25, 15), (15, 25), (25, 25)] {
            arena.place_static(Position::new(x, y), Cell::Obstacle);
        }

        for (dx, dy) in RING_OFFSETS {
            let pos = Position::new(center_x + dx, center_y + dy);
            if arena.is_in_bounds(pos) {
                arena.place_static(pos, Cell::Obstacle);
            }
        }

        arena
    }

    /// Square outline of walls; interior left open.
    fn hollow_platform(arena: &mut Arena, start_x: i32, start_y: i32, size: i32) {
        for x in start_x..(start_x + size).min(GRID_WIDTH) {
            for y in start_y..(start_y + size).min(GRID_HEIGHT) {
                if x == start_x || x == start_x + size - 1 || y == start_y || y == start_y + size - 1
                {
                    arena.place_static(Position::new(x, y), Cell::Wall);
                }
            }
        }
    }

    fn generate_procedural(seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut arena = Self::empty(false);
        Self::perimeter_walls(&mut arena);

        let spacing = 6 + rng.next_range(0, 4); // 6-9 cells between sites
        let mut x = spacing;
        while x < GRID_WIDTH - spacing {
            let mut y = spacing;
            while y < GRID_HEIGHT - spacing {
                if rng.chance(40) {
                    arena.place_static(Position::new(x, y), Cell::Obstacle);

                    let cluster = rng.next_range(0, 100);
                    if cluster < 15 {
                        // 2x2 block
                        arena.place_static(Position::new(x + 1, y), Cell::Obstacle);
                        arena.place_static(Position::new(x, y + 1), Cell::Obstacle);
                        arena.place_static(Position::new(x + 1, y + 1), Cell::Obstacle);
                    } else if cluster < 25 {
                        // L-shape in one of four orientations
                        let (ax, ay) = match rng.next_range(0, 4) {
                            0 => (1, -1),
                            1 => (1, 1),
                            2 => (-1, 1),
                            _ => (-1, -1),
                        };
                        arena.place_static(Position::new(x + ax, y), Cell::Obstacle);
                        arena.place_static(Position::new(x, y + ay), Cell::Obstacle);
                    }
                }
                y += spacing;
            }
            x += spacing;
        }

        // Loose singles between grid sites.
        let extras = 5 + rng.next_range(0, 10);
        for _ in 0..extras {
            let pos = Position::new(
                5 + rng.next_range(0, GRID_WIDTH - 10),
                5 + rng.next_range(0, GRID_HEIGHT - 10),
            );
            if arena.is_traversable(pos) {
                arena.place_static(pos, Cell::Obstacle);
            }
        }

        arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_has_full_perimeter() {
        let arena = Arena::generate(ArenaVariant::Classic, 0);
        for x in 0..GRID_WIDTH {
            assert_eq!(arena.cell_at(Position::new(x, 0)), Some(Cell::Wall));
            assert_eq!(
                arena.cell_at(Position::new(x, GRID_HEIGHT - 1)),
                Some(Cell::Wall)
            );
        }
        for y in 0..GRID_HEIGHT {
            assert_eq!(arena.cell_at(Position::new(0, y)), Some(Cell::Wall));
            assert_eq!(
                arena.cell_at(Position::new(GRID_WIDTH - 1, y)),
                Some(Cell::Wall)
            );
        }
        // Interior stays clear
        assert_eq!(arena.cell_at(Position::new(20, 20)), Some(Cell::Empty));
        assert!(!arena.is_open());
    }

    #[test]
    fn test_closed_arena_rejects_out_of_bounds() {
        let arena = Arena::generate(ArenaVariant::Classic, 0);
        assert_eq!(arena.cell_at(Position::new(-1, 5)), None);
        assert_eq!(arena.cell_at(Position::new(5, GRID_HEIGHT)), None);
        assert!(!arena.falls_to_void(Position::new(-1, 5)));
    }

    #[test]
    fn test_open_arena_edge_is_void() {
        let arena = Arena::generate(ArenaVariant::Open, 0);
        assert!(arena.is_open());
        assert_eq!(arena.cell_at(Position::new(-1, 0)), Some(Cell::Void));
        assert_eq!(arena.cell_at(Position::new(40, 39)), Some(Cell::Void));
        assert!(arena.falls_to_void(Position::new(0, -1)));
        // No perimeter wall on the rim row
        assert_eq!(arena.cell_at(Position::new(0, 0)), Some(Cell::Empty));
    }

    #[test]
    fn test_open_arena_central_cross() {
        let arena = Arena::generate(ArenaVariant::Open, 0);
        assert_eq!(arena.cell_at(Position::new(20, 20)), Some(Cell::Obstacle));
        assert_eq!(arena.cell_at(Position::new(23, 20)), Some(Cell::Obstacle));
        assert_eq!(arena.cell_at(Position::new(20, 17)), Some(Cell::Obstacle));
    }

    #[test]
    fn test_maze_has_corridor_gaps() {
        let arena = Arena::generate(ArenaVariant::Maze, 0);
        // Divider at y=10 with a gap centered at x=5
        assert_eq!(arena.cell_at(Position::new(5, 10)), Some(Cell::Empty));
        assert_eq!(arena.cell_at(Position::new(1, 10)), Some(Cell::Wall));
        assert_eq!(arena.cell_at(Position::new(8, 10)), Some(Cell::Wall));
    }

    #[test]
    fn test_procedural_is_seed_deterministic() {
        let a = Arena::generate(ArenaVariant::Procedural, 99);
        let b = Arena::generate(ArenaVariant::Procedural, 99);
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let pos = Position::new(x, y);
                assert_eq!(a.cell_at(pos), b.cell_at(pos));
            }
        }
    }

    #[test]
    #[should_panic(expected = "static placement after arena generation")]
    fn test_place_static_after_seal_panics() {
        let mut arena = Arena::generate(ArenaVariant::Classic, 0);
        arena.place_static(Position::new(5, 5), Cell::Wall);
    }

    #[test]
    fn test_trail_overlay_and_clears() {
        let mut arena = Arena::generate(ArenaVariant::Classic, 0);
        arena.lay_trail(Position::new(5, 5), 1, ColorTag::BLUE);
        arena.lay_trail(Position::new(6, 5), 2, ColorTag::RED);
        // Laying over a wall is a no-op
        arena.lay_trail(Position::new(0, 0), 1, ColorTag::BLUE);
        assert_eq!(arena.trail_count(), 2);

        arena.clear_trails_owned_by(1);
        assert_eq!(arena.trail_count(), 1);
        assert_eq!(arena.cell_at(Position::new(5, 5)), Some(Cell::Empty));

        arena.clear_all_trails();
        assert_eq!(arena.trail_count(), 0);
    }

    #[test]
    fn test_blocked_neighbor_count() {
        let arena = Arena::generate(ArenaVariant::Classic, 0);
        // Corner interior cell: wall above and to the left
        assert_eq!(arena.blocked_neighbor_count(Position::new(1, 1)), 2);
        assert_eq!(arena.blocked_neighbor_count(Position::new(20, 20)), 0);
    }
}
