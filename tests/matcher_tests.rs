//! Match detection scenarios driven through the public facade.

use jelly_crush::core::{find_matches, Grid, MatchShape};
use jelly_crush::types::{Axis, Coord, Fruit, Piece, SpecialKind};

const CHECKER: [&str; 8] = [
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
fn checker_board_is_match_free() {
    let grid = Grid::from_rows(CHECKER);
    assert!(find_matches(&grid).is_empty());
}

#[test]
fn two_in_a_row_is_not_a_match() {
    let mut rows = CHECKER;
    rows[4] = "wwkbkbkb";
    let grid = Grid::from_rows(rows);
    assert!(find_matches(&grid).is_empty());
}

#[test]
fn separate_runs_are_reported_separately() {
    let mut rows = CHECKER;
    rows[0] = "gggkwwwk";
    let grid = Grid::from_rows(rows);

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().any(|m| m.fruit == Fruit::Grape));
    assert!(matches.iter().any(|m| m.fruit == Fruit::Watermelon));
}

#[test]
fn horizontal_and_vertical_runs_coexist() {
    let mut grid = Grid::from_rows(CHECKER);
    // Horizontal grapes on row 0, vertical cherries in col 7; no overlap.
    for col in 0..3 {
        grid.set(Coord::new(0, col), Some(Piece::fruit(Fruit::Grape)));
    }
    for row in 4..7 {
        grid.set(Coord::new(row, 7), Some(Piece::fruit(Fruit::Cherry)));
    }

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 2);
    let axes: Vec<_> = matches.iter().map(|m| m.orientation()).collect();
    assert!(axes.contains(&Some(Axis::Horizontal)));
    assert!(axes.contains(&Some(Axis::Vertical)));
}

#[test]
fn l_shape_with_arm_above_merges() {
    let mut grid = Grid::from_rows(CHECKER);
    for row in 0..3 {
        grid.set(Coord::new(row, 5), Some(Piece::fruit(Fruit::Lemon)));
    }
    for col in 5..8 {
        grid.set(Coord::new(2, col), Some(Piece::fruit(Fruit::Lemon)));
    }

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].shape, MatchShape::Corner(Coord::new(2, 5)));
    assert_eq!(matches[0].len(), 5);
}

#[test]
fn full_row_is_one_match() {
    let mut rows = CHECKER;
    rows[6] = "cccccccc";
    let grid = Grid::from_rows(rows);

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].len(), 8);
    assert_eq!(matches[0].fruit, Fruit::Cherry);
}

#[test]
fn specials_never_join_a_run() {
    let mut rows = CHECKER;
    rows[3] = "kwwwbkbk";
    let mut grid = Grid::from_rows(rows);
    assert_eq!(find_matches(&grid).len(), 1);

    grid.set(Coord::new(3, 2), Some(Piece::special(SpecialKind::ColorBomb)));
    assert!(find_matches(&grid).is_empty());
}
