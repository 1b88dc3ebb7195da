//! Deterministic random number generation.
//!
//! A single seeded stream drives every probabilistic decision in the
//! simulation: AI mode draws, erratic wandering, procedural arena
//! scatter, spawn placement, and enemy disc throws. Two simulations
//! built from the same seed and fed the same commands stay bit-identical.
//!
//! Percent checks use integer arithmetic; no floats enter the stream.

use serde::{Deserialize, Serialize};

/// Seeded linear-congruential stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a stream from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Advance the stream and return the next raw value.
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// True with probability `percent`/100.
    pub fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }

    /// Uniform draw in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let range = (max - min) as u64;
        min + (self.next() % range) as i32
    }

    /// Uniform choice from a slice. Returns `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = (self.next() % items.len() as u64) as usize;
            Some(&items[idx])
        }
    }
}
