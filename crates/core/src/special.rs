//! Special piece activation
//!
//! Resolves the blast region of rockets, bombs and color bombs into a
//! deduplicated removal set. When a blast region covers another special,
//! that special activates too, recursively, so a whole chain detonates in
//! one pass. The visited set guarantees each special fires at most once per
//! cycle even when blast regions overlap.

use jelly_crush_types::{Axis, Coord, SpecialKind, GRID_CELLS, GRID_SIZE};

use crate::grid::Grid;

/// Accumulated result of one activation cascade.
///
/// Cells keep discovery order so downstream event emission is stable for a
/// given grid and trigger.
#[derive(Debug, Clone)]
pub struct ActivationSet {
    member: [bool; GRID_CELLS],
    visited: [bool; GRID_CELLS],
    cells: Vec<Coord>,
    activated: Vec<(Coord, SpecialKind)>,
}

impl Default for ActivationSet {
    fn default() -> Self {
        Self {
            member: [false; GRID_CELLS],
            visited: [false; GRID_CELLS],
            cells: Vec::new(),
            activated: Vec::new(),
        }
    }
}

impl ActivationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.member[coord.index()]
    }

    pub fn add_cell(&mut self, coord: Coord) {
        if !self.member[coord.index()] {
            self.member[coord.index()] = true;
            self.cells.push(coord);
        }
    }

    /// Removal targets in discovery order.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Every special that fired, in activation order.
    pub fn activated(&self) -> &[(Coord, SpecialKind)] {
        &self.activated
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Activate the special at `at`, chaining into any special its blast covers.
///
/// `swap_axis` is the axis of the player swap that triggered this special,
/// if any. A swapped rocket fires along the swap axis regardless of its own
/// orientation; chained rockets always use their own.
pub fn activate(grid: &Grid, at: Coord, swap_axis: Option<Axis>, set: &mut ActivationSet) {
    if !at.in_bounds() || set.visited[at.index()] {
        return;
    }
    set.visited[at.index()] = true;

    let Some(kind) = grid.piece(at).and_then(|p| p.as_special()) else {
        return;
    };
    set.activated.push((at, kind));

    match kind {
        SpecialKind::RocketH | SpecialKind::RocketV => {
            let axis = match swap_axis {
                Some(Axis::Horizontal) => Axis::Horizontal,
                Some(Axis::Vertical) => Axis::Vertical,
                None => match kind {
                    SpecialKind::RocketH => Axis::Horizontal,
                    _ => Axis::Vertical,
                },
            };
            match axis {
                Axis::Horizontal => {
                    for col in 0..GRID_SIZE as u8 {
                        blast(grid, Coord::new(at.row, col), at, set);
                    }
                }
                Axis::Vertical => {
                    for row in 0..GRID_SIZE as u8 {
                        blast(grid, Coord::new(row, at.col), at, set);
                    }
                }
            }
        }
        SpecialKind::Bomb => {
            let r0 = at.row.saturating_sub(1);
            let c0 = at.col.saturating_sub(1);
            let r1 = (at.row + 1).min(GRID_SIZE as u8 - 1);
            let c1 = (at.col + 1).min(GRID_SIZE as u8 - 1);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    blast(grid, Coord::new(row, col), at, set);
                }
            }
        }
        SpecialKind::ColorBomb => {
            for col in 0..GRID_SIZE as u8 {
                blast(grid, Coord::new(at.row, col), at, set);
            }
            for row in 0..GRID_SIZE as u8 {
                blast(grid, Coord::new(row, at.col), at, set);
            }
        }
    }
}

fn blast(grid: &Grid, target: Coord, origin: Coord, set: &mut ActivationSet) {
    set.add_cell(target);
    if target == origin {
        return;
    }
    if grid.piece(target).is_some_and(|p| p.is_special()) {
        activate(grid, target, None, set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jelly_crush_types::Piece;

    fn fruit_grid() -> Grid {
        Grid::from_rows([
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
        ])
    }

    #[test]
    fn horizontal_rocket_clears_its_row() {
        let mut grid = fruit_grid();
        let at = Coord::new(3, 2);
        grid.set(at, Some(Piece::special(SpecialKind::RocketH)));

        let mut set = ActivationSet::new();
        activate(&grid, at, None, &mut set);

        assert_eq!(set.cells().len(), 8);
        assert!(set.cells().iter().all(|c| c.row == 3));
        assert_eq!(set.activated(), &[(at, SpecialKind::RocketH)]);
    }

    #[test]
    fn swap_axis_overrides_rocket_orientation() {
        let mut grid = fruit_grid();
        let at = Coord::new(3, 2);
        grid.set(at, Some(Piece::special(SpecialKind::RocketH)));

        let mut set = ActivationSet::new();
        activate(&grid, at, Some(Axis::Vertical), &mut set);

        assert_eq!(set.cells().len(), 8);
        assert!(set.cells().iter().all(|c| c.col == 2));
    }

    #[test]
    fn bomb_clips_at_the_corner() {
        let mut grid = fruit_grid();
        let at = Coord::new(0, 0);
        grid.set(at, Some(Piece::special(SpecialKind::Bomb)));

        let mut set = ActivationSet::new();
        activate(&grid, at, None, &mut set);

        assert_eq!(set.cells().len(), 4);
        for coord in [
            Coord::new(0, 0),
            Coord::new(0, 1),
            Coord::new(1, 0),
            Coord::new(1, 1),
        ] {
            assert!(set.contains(coord));
        }
    }

    #[test]
    fn color_bomb_covers_row_and_column() {
        let mut grid = fruit_grid();
        let at = Coord::new(4, 5);
        grid.set(at, Some(Piece::special(SpecialKind::ColorBomb)));

        let mut set = ActivationSet::new();
        activate(&grid, at, None, &mut set);

        // 8 + 8 minus the shared center.
        assert_eq!(set.cells().len(), 15);
    }

    #[test]
    fn chained_special_detonates_too() {
        let mut grid = fruit_grid();
        let rocket = Coord::new(2, 1);
        let bomb = Coord::new(2, 6);
        grid.set(rocket, Some(Piece::special(SpecialKind::RocketH)));
        grid.set(bomb, Some(Piece::special(SpecialKind::Bomb)));

        let mut set = ActivationSet::new();
        activate(&grid, rocket, None, &mut set);

        assert_eq!(set.activated().len(), 2);
        // Bomb corner below the rocket's row only reachable via the chain.
        assert!(set.contains(Coord::new(3, 7)));
        assert!(set.contains(Coord::new(1, 5)));
    }

    #[test]
    fn mutual_chain_terminates_and_fires_each_once() {
        let mut grid = fruit_grid();
        let a = Coord::new(5, 0);
        let b = Coord::new(5, 7);
        grid.set(a, Some(Piece::special(SpecialKind::RocketH)));
        grid.set(b, Some(Piece::special(SpecialKind::RocketH)));

        let mut set = ActivationSet::new();
        activate(&grid, a, None, &mut set);

        assert_eq!(set.activated().len(), 2);
        assert_eq!(set.cells().len(), 8);
    }

    #[test]
    fn repeat_activation_is_a_no_op() {
        let mut grid = fruit_grid();
        let at = Coord::new(1, 1);
        grid.set(at, Some(Piece::special(SpecialKind::Bomb)));

        let mut set = ActivationSet::new();
        activate(&grid, at, None, &mut set);
        let cells_before = set.cells().len();
        activate(&grid, at, None, &mut set);

        assert_eq!(set.cells().len(), cells_before);
        assert_eq!(set.activated().len(), 1);
    }

    #[test]
    fn fruit_cell_does_not_activate() {
        let grid = fruit_grid();
        let mut set = ActivationSet::new();
        activate(&grid, Coord::new(0, 0), None, &mut set);
        assert!(set.is_empty());
        assert!(set.activated().is_empty());
    }
}
