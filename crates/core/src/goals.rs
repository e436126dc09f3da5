//! Collection goals - per-fruit removal targets
//!
//! Every level asks for the same count of each of the seven fruits, scaling
//! with the level number. Counts are capped at the target, and every removal
//! path contributes: plain matches, special blasts, and the completion sweep
//! all record the fruits they take off the board.

use jelly_crush_types::{Fruit, COLLECTION_TARGET_BASE, FRUIT_COUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalTracker {
    target: u32,
    collected: [u32; FRUIT_COUNT],
}

impl GoalTracker {
    pub fn for_level(level: u32) -> Self {
        Self {
            target: COLLECTION_TARGET_BASE + level,
            collected: [0; FRUIT_COUNT],
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn collected(&self, fruit: Fruit) -> u32 {
        self.collected[fruit.index()]
    }

    /// Record one removed fruit. Returns the new count if it advanced, or
    /// None when the goal was already full.
    pub fn record(&mut self, fruit: Fruit) -> Option<u32> {
        let slot = &mut self.collected[fruit.index()];
        if *slot >= self.target {
            return None;
        }
        *slot += 1;
        Some(*slot)
    }

    pub fn all_met(&self) -> bool {
        self.collected.iter().all(|&c| c >= self.target)
    }

    pub fn write_counts(&self, out: &mut [u32; FRUIT_COUNT]) {
        *out = self.collected;
    }
}
