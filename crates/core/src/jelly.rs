//! Jelly layer - per-cell overlay cleared by removals
//!
//! Each level starts with a fixed jelly pattern. A jelly cell is cleared the
//! first time a piece is removed from it (match, special blast, or sweep);
//! clearing every jelly cell is half of the level's win condition.
//!
//! Patterns are stored as one bitmask per row, bit `c` set means column `c`
//! carries jelly. Levels beyond the last authored pattern cover the full
//! board.

use jelly_crush_types::{Coord, GRID_SIZE};

/// Authored patterns for levels 1..=15. Jelly counts step up by four per
/// level: 4, 8, 12, ... 60.
const PATTERNS: [[u8; GRID_SIZE]; 15] = [
    [0x00, 0x00, 0x00, 0x18, 0x18, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00, 0x66, 0x66, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0x18, 0x3C, 0x3C, 0x18, 0x00, 0x00],
    [0xC3, 0xC3, 0x00, 0x00, 0x00, 0x00, 0xC3, 0xC3],
    [0x10, 0x10, 0x18, 0x3F, 0xFC, 0x18, 0x08, 0x08],
    [0x18, 0x18, 0x18, 0xE7, 0xE7, 0x18, 0x18, 0x18],
    [0xC3, 0xC3, 0x3C, 0x24, 0x24, 0x3C, 0xC3, 0xC3],
    [0xE7, 0xE7, 0xC3, 0x00, 0x00, 0xC3, 0xE7, 0xE7],
    [0xFF, 0x80, 0xBE, 0xA2, 0xAA, 0xBA, 0x82, 0xFE],
    [0x18, 0x7E, 0x7E, 0x7E, 0x7E, 0x7E, 0x7E, 0x18],
    [0xE7, 0xFF, 0xC3, 0x5A, 0x5A, 0xC3, 0xFF, 0xE7],
    [0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xFF, 0xFF],
    [0x3C, 0x7E, 0xFF, 0xFF, 0xFF, 0xFF, 0x7E, 0x3C],
    [0xFF, 0xFF, 0x7E, 0x7E, 0x7E, 0x7E, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xE7, 0xE7, 0xFF, 0xFF, 0xFF],
];

/// Jelly overlay for one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JellyField {
    rows: [u8; GRID_SIZE],
}

impl JellyField {
    /// The authored pattern for a level (1-based). Levels past the authored
    /// set get full coverage.
    pub fn for_level(level: u32) -> Self {
        let rows = match level {
            0 => [0; GRID_SIZE],
            1..=15 => PATTERNS[(level - 1) as usize],
            _ => [0xFF; GRID_SIZE],
        };
        Self { rows }
    }

    /// An empty overlay, for grids constructed by a host or test harness.
    pub fn empty() -> Self {
        Self { rows: [0; GRID_SIZE] }
    }

    pub fn has(&self, coord: Coord) -> bool {
        coord.in_bounds() && self.rows[coord.row as usize] & (1 << coord.col) != 0
    }

    /// Clear jelly at a cell. Returns true if jelly was present.
    pub fn clear(&mut self, coord: Coord) -> bool {
        if !self.has(coord) {
            return false;
        }
        self.rows[coord.row as usize] &= !(1 << coord.col);
        true
    }

    pub fn remaining(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }

    pub fn is_clear(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    /// Write the overlay into a row-major byte grid, 1 = jelly.
    pub fn write_u8_grid(&self, out: &mut [[u8; GRID_SIZE]; GRID_SIZE]) {
        for (row, mask) in self.rows.iter().enumerate() {
            for col in 0..GRID_SIZE {
                out[row][col] = u8::from(mask & (1 << col) != 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authored_counts_step_by_four() {
        for level in 1..=15u32 {
            let field = JellyField::for_level(level);
            assert_eq!(field.remaining(), level * 4, "level {level}");
        }
    }

    #[test]
    fn late_levels_cover_the_board() {
        assert_eq!(JellyField::for_level(16).remaining(), 64);
        assert_eq!(JellyField::for_level(99).remaining(), 64);
    }

    #[test]
    fn level_one_is_the_center_square() {
        let field = JellyField::for_level(1);
        for coord in [
            Coord::new(3, 3),
            Coord::new(3, 4),
            Coord::new(4, 3),
            Coord::new(4, 4),
        ] {
            assert!(field.has(coord));
        }
        assert!(!field.has(Coord::new(0, 0)));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut field = JellyField::for_level(1);
        let coord = Coord::new(3, 3);
        assert!(field.clear(coord));
        assert!(!field.clear(coord));
        assert_eq!(field.remaining(), 3);
    }

    #[test]
    fn clearing_everything_wins() {
        let mut field = JellyField::for_level(2);
        for coord in (0..8).flat_map(|r| (0..8).map(move |c| Coord::new(r, c))) {
            field.clear(coord);
        }
        assert!(field.is_clear());
    }
}
