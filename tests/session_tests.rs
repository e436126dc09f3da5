//! End-to-end gameplay scenarios against the level session.

use jelly_crush::core::{find_matches, GoalTracker, Grid, JellyField, LevelSession};
use jelly_crush::types::{
    Coord, Fruit, GameEvent, LevelConfig, Piece, SpecialKind, SwapOutcome,
};

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

fn session_over(rows: [&str; 8]) -> LevelSession {
    LevelSession::from_grid(Grid::from_rows(rows), 1, LevelConfig::default()).unwrap()
}

#[test]
fn fresh_boards_are_full_and_match_free_across_seeds() {
    for seed in [1, 7, 42, 1000, 0xDEAD_BEEF] {
        let config = LevelConfig {
            seed,
            ..Default::default()
        };
        for level in [1, 5, 16] {
            let session = LevelSession::start_level(level, config).unwrap();
            assert_eq!(session.grid().piece_count(), 64, "seed {seed} level {level}");
            assert!(
                find_matches(session.grid()).is_empty(),
                "seed {seed} level {level}"
            );
        }
    }
}

#[test]
fn rejected_swap_leaves_no_trace() {
    let mut session = session_over(CHECKER);
    let before = session.grid().clone();

    let outcome = session
        .attempt_swap(Coord::new(6, 3), Coord::new(6, 4))
        .unwrap();

    assert_eq!(outcome, SwapOutcome::Rejected);
    assert_eq!(session.grid(), &before);
    assert_eq!(session.score(), 0);
    assert!(session.drain_events().is_empty());
    assert!(!session.is_busy());
}

#[test]
fn four_run_swap_creates_a_perpendicular_rocket() {
    let mut rows = CHECKER;
    // Vertical watermelons in col 2 with a gap at row 4; the fourth sits
    // one cell to the right.
    rows[2] = "bkwkbkbk";
    rows[3] = "kbwbkbkb";
    rows[4] = "bkbwbkbk";
    rows[5] = "kbwgkbkb";
    let mut session = session_over(rows);

    let outcome = session
        .attempt_swap(Coord::new(4, 3), Coord::new(4, 2))
        .unwrap();
    assert_eq!(outcome, SwapOutcome::Resolved);

    let events = session.drain_events();
    // First batch: the four watermelons leave, four goal steps, 80 points,
    // then the rocket appears at the swapped cell. A vertical run spawns a
    // horizontal rocket.
    match &events[0] {
        GameEvent::PiecesRemoved {
            coords,
            caused_by_jelly,
        } => {
            assert_eq!(coords.len(), 4);
            assert!(coords.iter().all(|c| c.col == 2));
            assert!(!caused_by_jelly);
        }
        other => panic!("expected PiecesRemoved first, got {other:?}"),
    }
    for event in &events[1..5] {
        assert!(matches!(
            event,
            GameEvent::GoalProgressed {
                fruit: Fruit::Watermelon,
                ..
            }
        ));
    }
    assert!(matches!(
        events[5],
        GameEvent::ScoreChanged { delta: 80, .. }
    ));
    assert_eq!(
        events[6],
        GameEvent::SpecialCreated {
            at: Coord::new(4, 2),
            kind: SpecialKind::RocketH,
        }
    );
}

#[test]
fn corner_swap_creates_a_color_bomb_at_the_intersection() {
    let mut rows = CHECKER;
    // Vertical arm above the horizontal run; swapping (3,2) up completes
    // both at once.
    rows[0] = "bkwkbkbk";
    rows[1] = "kbwbkbkb";
    rows[2] = "bkbwwkbk";
    rows[3] = "kbwgkbkb";
    let mut session = session_over(rows);

    let outcome = session
        .attempt_swap(Coord::new(3, 2), Coord::new(2, 2))
        .unwrap();
    assert_eq!(outcome, SwapOutcome::Resolved);

    let events = session.drain_events();
    let created: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::SpecialCreated { at, kind } => Some((*at, *kind)),
            _ => None,
        })
        .collect();
    assert!(created.contains(&(Coord::new(2, 2), SpecialKind::ColorBomb)));

    // Merged 3+3 sharing one corner: 5 cells at 150 points.
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::ScoreChanged { delta: 150, .. })));
}

#[test]
fn color_bomb_swap_activates_and_counts_collection() {
    let mut grid = Grid::from_rows(CHECKER);
    grid.set(Coord::new(4, 5), Some(Piece::special(SpecialKind::ColorBomb)));
    let mut session = LevelSession::from_grid(grid, 1, LevelConfig::default()).unwrap();

    let outcome = session
        .attempt_swap(Coord::new(4, 4), Coord::new(4, 5))
        .unwrap();
    assert_eq!(outcome, SwapOutcome::Resolved);

    let events = session.drain_events();
    // The swap moves the bomb onto the partner cell before it fires.
    assert_eq!(
        events[0],
        GameEvent::SpecialActivated {
            at: Coord::new(4, 4),
            kind: SpecialKind::ColorBomb,
        }
    );
    // Activation bonus plus the color-bomb premium.
    assert!(matches!(
        events[1],
        GameEvent::ScoreChanged { delta: 150, .. }
    ));
    match &events[2] {
        GameEvent::PiecesRemoved { coords, .. } => {
            // Row 4 and column 4 minus the shared cell.
            assert_eq!(coords.len(), 15);
            assert!(coords.iter().all(|c| c.row == 4 || c.col == 4));
        }
        other => panic!("expected PiecesRemoved, got {other:?}"),
    }

    // Special-blast removals count toward goals, capped at the target.
    assert_eq!(session.goals().collected(Fruit::Banana), 5);
    assert_eq!(session.goals().collected(Fruit::Kiwi), 5);
}

#[test]
fn swap_axis_redirects_a_rocket() {
    let mut grid = Grid::from_rows(CHECKER);
    grid.set(Coord::new(3, 3), Some(Piece::special(SpecialKind::RocketV)));
    let mut session = LevelSession::from_grid(grid, 1, LevelConfig::default()).unwrap();

    // A horizontal swap fires the rocket along the row despite its own
    // vertical orientation.
    session
        .attempt_swap(Coord::new(3, 3), Coord::new(3, 4))
        .unwrap();

    let events = session.drain_events();
    let removed = events
        .iter()
        .find_map(|e| match e {
            GameEvent::PiecesRemoved { coords, .. } => Some(coords.clone()),
            _ => None,
        })
        .expect("a removal batch");
    assert_eq!(removed.len(), 8);
    assert!(removed.iter().all(|c| c.row == 3));
}

#[test]
fn matching_over_jelly_clears_it() {
    let mut rows = CHECKER;
    // Horizontal run through (3,3) and (3,4) once (2,4) swaps down.
    rows[2] = "bkbkwkbk";
    rows[3] = "kbwwgbkb";
    let mut session = LevelSession::from_parts(
        Grid::from_rows(rows),
        JellyField::for_level(1),
        GoalTracker::for_level(1),
        1,
        LevelConfig::default(),
    )
    .unwrap();
    assert_eq!(session.jelly().remaining(), 4);

    session
        .attempt_swap(Coord::new(2, 4), Coord::new(3, 4))
        .unwrap();

    let events = session.drain_events();
    match &events[0] {
        GameEvent::PiecesRemoved {
            coords,
            caused_by_jelly,
        } => {
            assert!(caused_by_jelly);
            assert!(coords.contains(&Coord::new(3, 3)));
            assert!(coords.contains(&Coord::new(3, 4)));
        }
        other => panic!("expected PiecesRemoved, got {other:?}"),
    }
    assert!(!session.jelly().has(Coord::new(3, 3)));
    assert!(!session.jelly().has(Coord::new(3, 4)));
}

#[test]
fn completing_the_level_awards_the_bonus_breakdown() {
    let mut rows = CHECKER;
    rows[2] = "bkbkwkbk";
    rows[3] = "kbwwgbkb";
    let mut goals = GoalTracker::for_level(1);
    for fruit in Fruit::ALL {
        let quota = if fruit == Fruit::Watermelon { 2 } else { 5 };
        for _ in 0..quota {
            goals.record(fruit);
        }
    }
    let mut session = LevelSession::from_parts(
        Grid::from_rows(rows),
        JellyField::empty(),
        goals,
        1,
        LevelConfig::default(),
    )
    .unwrap();

    session
        .attempt_swap(Coord::new(2, 4), Coord::new(3, 4))
        .unwrap();

    assert!(session.is_level_completing());
    let events = session.drain_events();
    let breakdown = events
        .iter()
        .find_map(|e| match e {
            GameEvent::LevelCompleted { breakdown } => Some(*breakdown),
            _ => None,
        })
        .expect("a LevelCompleted event");

    assert_eq!(breakdown.level, 1);
    // No ticks elapsed: full 180s converts to 1800 points.
    assert_eq!(breakdown.time_bonus, 1_800);
    assert_eq!(breakdown.level_bonus, 100);
    assert_eq!(
        breakdown.total_bonus,
        breakdown.time_bonus + breakdown.level_bonus + breakdown.special_bonus
    );
    assert!(session.score() >= 30 + breakdown.total_bonus);

    // Further swaps are dropped until the host advances the level.
    let outcome = session
        .attempt_swap(Coord::new(0, 0), Coord::new(0, 1))
        .unwrap();
    assert_eq!(outcome, SwapOutcome::Busy);

    session.advance_level();
    assert_eq!(session.level(), 2);
    assert!(!session.is_level_completing());
    assert_eq!(session.jelly().remaining(), 8);
    assert_eq!(session.goals().target(), 6);
    assert!(find_matches(session.grid()).is_empty());
    // Score carries across levels.
    assert!(session.score() > 0);
}

#[test]
fn settle_reports_zero_batches_on_a_stable_board() {
    let mut session = session_over(CHECKER);
    assert_eq!(session.settle(), 0);
    assert!(session.drain_events().is_empty());
}
