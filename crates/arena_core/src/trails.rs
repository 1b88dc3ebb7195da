//! Light-trail lifecycle.
//!
//! Tracks each registered entity's previously occupied cell and converts
//! it to a trail cell when the entity moves on. Trails are permanent
//! hazards until cleared: all at once when anyone collides with a trail,
//! or scoped to one owner when that owner dies or falls off the grid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ColorTag};
use crate::math::Position;

/// Per-entity previous-cell tracking and trail bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailManager {
    tracked: HashMap<u64, Tracked>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tracked {
    position: Position,
    color: ColorTag,
}

impl TrailManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking an entity at its spawn position.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered; that is a roster bug.
    pub fn register(&mut self, id: u64, color: ColorTag, start: Position) {
        let prev = self.tracked.insert(
            id,
            Tracked {
                position: start,
                color,
            },
        );
        assert!(prev.is_none(), "entity {id} registered twice for trails");
    }

    /// Stop tracking an entity. Its existing trails stay on the grid.
    pub fn unregister(&mut self, id: u64) {
        self.tracked.remove(&id);
    }

    /// Record a successful move.
    ///
    /// Lays a trail at the previously tracked cell if it is still empty,
    /// then updates the tracked position regardless.
    pub fn on_entity_moved(&mut self, arena: &mut Arena, id: u64, new_pos: Position) {
        if let Some(tracked) = self.tracked.get_mut(&id) {
            let vacated = tracked.position;
            arena.lay_trail(vacated, id, tracked.color);
            tracked.position = new_pos;
        }
    }

    /// Clear every trail cell on the grid, any owner.
    pub fn clear_all(&mut self, arena: &mut Arena) {
        let count = arena.trail_count();
        if count > 0 {
            tracing::debug!(cleared = count, "All trails cleared");
        }
        arena.clear_all_trails();
    }

    /// Clear only the trail cells owned by `id`.
    pub fn clear_owned(&mut self, arena: &mut Arena, id: u64) {
        arena.clear_trails_owned_by(id);
    }

    /// Currently tracked position for an entity, if registered.
    #[must_use]
    pub fn tracked_position(&self, id: u64) -> Option<Position> {
        self.tracked.get(&id).map(|t| t.position)
    }
}
