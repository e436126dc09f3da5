//! Match detector - pure scan over a grid snapshot
//!
//! Finds all maximal runs of 3+ identical fruits, horizontally then
//! vertically, and merges intersecting horizontal/vertical runs into a
//! single corner-tagged match. Special pieces never participate: a special
//! ends a run exactly like a different fruit would.
//!
//! Deterministic for a given grid; performs no mutation.

use arrayvec::ArrayVec;

use jelly_crush_types::{Axis, Coord, Fruit, Piece, GRID_CELLS, GRID_SIZE};

use crate::grid::Grid;

/// A merged corner match can span a full row plus a full column.
pub const MAX_MATCH_CELLS: usize = 2 * GRID_SIZE - 1;

/// Shape tag of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchShape {
    /// A straight run along one axis.
    Line(Axis),
    /// A merged T/L intersection; the coordinate is the overlap cell.
    Corner(Coord),
}

/// A maximal run (or merged intersection) of identical fruits.
///
/// Ephemeral: produced and consumed within one resolution cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub fruit: Fruit,
    pub cells: ArrayVec<Coord, MAX_MATCH_CELLS>,
    pub shape: MatchShape,
}

impl Match {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_corner(&self) -> bool {
        matches!(self.shape, MatchShape::Corner(_))
    }

    pub fn orientation(&self) -> Option<Axis> {
        match self.shape {
            MatchShape::Line(axis) => Some(axis),
            MatchShape::Corner(_) => None,
        }
    }

    /// Middle cell of the run, the fallback anchor for special creation.
    pub fn middle(&self) -> Coord {
        self.cells[self.cells.len() / 2]
    }
}

fn matchable_fruit(grid: &Grid, coord: Coord) -> Option<Fruit> {
    grid.piece(coord).and_then(Piece::as_fruit)
}

/// Find all matches on the grid.
///
/// Scan order is rows top-to-bottom (left-to-right runs), then columns
/// left-to-right (top-to-bottom runs). A cell already consumed by an earlier
/// run is never used as a new run start, but it may still be absorbed into a
/// perpendicular run's extension; that is what produces T/L intersections.
pub fn find_matches(grid: &Grid) -> Vec<Match> {
    let mut matches: Vec<Match> = Vec::new();
    let mut consumed = [false; GRID_CELLS];

    // Horizontal pass.
    for row in 0..GRID_SIZE as u8 {
        let mut col = 0u8;
        while col + 2 < GRID_SIZE as u8 {
            let start = Coord::new(row, col);
            if consumed[start.index()] {
                col += 1;
                continue;
            }
            let Some(fruit) = matchable_fruit(grid, start) else {
                col += 1;
                continue;
            };
            let mut cells: ArrayVec<Coord, MAX_MATCH_CELLS> = ArrayVec::new();
            cells.push(start);
            for k in col + 1..GRID_SIZE as u8 {
                let next = Coord::new(row, k);
                if matchable_fruit(grid, next) == Some(fruit) {
                    cells.push(next);
                } else {
                    break;
                }
            }
            if cells.len() >= 3 {
                for c in &cells {
                    consumed[c.index()] = true;
                }
                col += cells.len() as u8;
                matches.push(Match {
                    fruit,
                    cells,
                    shape: MatchShape::Line(Axis::Horizontal),
                });
            } else {
                col += 1;
            }
        }
    }

    // Vertical pass. Note the start-cell check uses the shared consumed set:
    // a vertical run whose start cell sits inside a horizontal match is
    // skipped, matching the reference scanner.
    for col in 0..GRID_SIZE as u8 {
        let mut row = 0u8;
        while row + 2 < GRID_SIZE as u8 {
            let start = Coord::new(row, col);
            if consumed[start.index()] {
                row += 1;
                continue;
            }
            let Some(fruit) = matchable_fruit(grid, start) else {
                row += 1;
                continue;
            };
            let mut cells: ArrayVec<Coord, MAX_MATCH_CELLS> = ArrayVec::new();
            cells.push(start);
            for k in row + 1..GRID_SIZE as u8 {
                let next = Coord::new(k, col);
                if matchable_fruit(grid, next) == Some(fruit) {
                    cells.push(next);
                } else {
                    break;
                }
            }
            if cells.len() >= 3 {
                for c in &cells {
                    consumed[c.index()] = true;
                }
                row += cells.len() as u8;
                matches.push(Match {
                    fruit,
                    cells,
                    shape: MatchShape::Line(Axis::Vertical),
                });
            } else {
                row += 1;
            }
        }
    }

    merge_intersections(&mut matches);
    matches
}

/// Merge each coordinate shared by a horizontal and a vertical match into a
/// single corner-tagged match. Ties (a coordinate whose contributing match
/// was already merged away) resolve first-found-wins in discovery order;
/// later overlap coordinates that can no longer find both a horizontal and
/// a vertical line match are skipped.
fn merge_intersections(matches: &mut Vec<Match>) {
    let mut count = [0u8; GRID_CELLS];
    let mut order: Vec<Coord> = Vec::new();
    for m in matches.iter() {
        for &c in &m.cells {
            if count[c.index()] == 0 {
                order.push(c);
            }
            count[c.index()] += 1;
        }
    }

    for corner in order {
        if count[corner.index()] < 2 {
            continue;
        }
        let h_idx = matches.iter().position(|m| {
            m.orientation() == Some(Axis::Horizontal) && m.cells.contains(&corner)
        });
        let v_idx = matches.iter().position(|m| {
            m.orientation() == Some(Axis::Vertical) && m.cells.contains(&corner)
        });
        let (Some(h_idx), Some(v_idx)) = (h_idx, v_idx) else {
            continue;
        };

        // Remove higher index first so the lower one stays valid.
        let (first, second) = if h_idx > v_idx {
            (h_idx, v_idx)
        } else {
            (v_idx, h_idx)
        };
        let a = matches.remove(first);
        let b = matches.remove(second);

        let mut cells: ArrayVec<Coord, MAX_MATCH_CELLS> = ArrayVec::new();
        for &c in a.cells.iter().chain(b.cells.iter()) {
            if !cells.contains(&c) {
                cells.push(c);
            }
        }
        matches.push(Match {
            fruit: a.fruit,
            cells,
            shape: MatchShape::Corner(corner),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jelly_crush_types::SpecialKind;

    // A 8x8 checker-ish fill with no 3-runs in either direction.
    const STABLE: [&str; 8] = [
        "bkbkbkbk",
        "kbkbkbkb",
        "bkbkbkbk",
        "kbkbkbkb",
        "bkbkbkbk",
        "kbkbkbkb",
        "bkbkbkbk",
        "kbkbkbkb",
    ];

    #[test]
    fn stable_grid_has_no_matches() {
        let grid = Grid::from_rows(STABLE);
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn horizontal_run_of_three() {
        let mut rows = STABLE;
        rows[2] = "gggkbkbk";
        let grid = Grid::from_rows(rows);

        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.fruit, Fruit::Grape);
        assert_eq!(m.orientation(), Some(Axis::Horizontal));
        assert_eq!(
            m.cells.as_slice(),
            &[Coord::new(2, 0), Coord::new(2, 1), Coord::new(2, 2)]
        );
    }

    #[test]
    fn run_is_maximal_not_split() {
        let mut rows = STABLE;
        rows[5] = "wwwwwkbk";
        let grid = Grid::from_rows(rows);

        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 5);
    }

    #[test]
    fn vertical_run_of_four() {
        let mut grid = Grid::from_rows(STABLE);
        for row in 1..5 {
            grid.set(Coord::new(row, 6), Some(Piece::fruit(Fruit::Cherry)));
        }

        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.orientation(), Some(Axis::Vertical));
        assert_eq!(m.len(), 4);
        assert_eq!(m.middle(), Coord::new(3, 6));
    }

    #[test]
    fn special_piece_breaks_a_run() {
        let mut rows = STABLE;
        rows[2] = "ggggkbkb";
        let mut grid = Grid::from_rows(rows);
        // Punch a bomb into the middle of the would-be run of 4.
        grid.set(Coord::new(2, 1), Some(Piece::special(SpecialKind::Bomb)));

        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn l_intersection_merges_into_corner_match() {
        let mut grid = Grid::from_rows(STABLE);
        // Vertical run rows 0..=2 in col 2, horizontal run row 2 cols 2..=4.
        // The vertical start (0,2) is scanned after the horizontal pass has
        // consumed only row 2, so both runs are found and share (2,2).
        for row in 0..2 {
            grid.set(Coord::new(row, 2), Some(Piece::fruit(Fruit::Watermelon)));
        }
        for col in 2..5 {
            grid.set(Coord::new(2, col), Some(Piece::fruit(Fruit::Watermelon)));
        }

        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert!(m.is_corner());
        assert_eq!(m.shape, MatchShape::Corner(Coord::new(2, 2)));
        // 3 + 3 cells minus the shared corner.
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn vertical_start_inside_horizontal_match_is_skipped() {
        let mut grid = Grid::from_rows(STABLE);
        // Horizontal run at row 2 cols 2..=4; vertical continuation hangs
        // BELOW it (rows 2..=4 in col 3). The vertical scan would have to
        // start at (2,3), which the horizontal pass already consumed, so no
        // merge happens. Pins the reference scanner's behavior.
        for col in 2..5 {
            grid.set(Coord::new(2, col), Some(Piece::fruit(Fruit::Watermelon)));
        }
        for row in 3..5 {
            grid.set(Coord::new(row, 3), Some(Piece::fruit(Fruit::Watermelon)));
        }

        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].orientation(), Some(Axis::Horizontal));
        assert_eq!(matches[0].len(), 3);
    }

    #[test]
    fn detection_is_pure() {
        let mut rows = STABLE;
        rows[0] = "ooobkbkb";
        let grid = Grid::from_rows(rows);
        let before = grid.clone();
        let _ = find_matches(&grid);
        assert_eq!(grid, before);
    }
}
