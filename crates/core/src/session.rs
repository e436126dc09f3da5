//! Level session - the authoritative rules state machine
//!
//! Owns the grid, jelly overlay, collection goals, RNG, score and countdown
//! for one level, and drives every gameplay transition: swap attempts, the
//! cascade/refill resolution loop, special activation, idle hints and
//! reshuffles, and level completion. The session never blocks and never
//! schedules callbacks; each entry point runs its full resolution
//! synchronously and leaves emitted events for the host to drain.

use jelly_crush_types::{
    Axis, CompletionBreakdown, Coord, Fruit, GameEvent, IdleOutcome, LevelConfig, Piece,
    SpecialKind, SwapOutcome, TickOutcome, GRID_SIZE,
};

use crate::error::CoreError;
use crate::goals::GoalTracker;
use crate::grid::Grid;
use crate::jelly::JellyField;
use crate::matcher::{self, Match, MatchShape};
use crate::rng::SimpleRng;
use crate::scoring;
use crate::snapshot::SessionSnapshot;
use crate::special::{self, ActivationSet};

#[derive(Debug, Clone)]
pub struct LevelSession {
    grid: Grid,
    jelly: JellyField,
    goals: GoalTracker,
    rng: SimpleRng,
    level: u32,
    score: u32,
    time_left_ms: u64,
    max_time_ms: u64,
    fruit_match_probability: f64,
    seed: u32,
    busy: bool,
    game_over: bool,
    level_completing: bool,
    events: Vec<GameEvent>,
}

impl LevelSession {
    /// Start a fresh level: authored jelly pattern, per-fruit goals, full
    /// countdown, and a board repopulated until it contains no matches.
    pub fn start_level(level: u32, config: LevelConfig) -> Result<Self, CoreError> {
        let mut session = Self::from_parts(
            Grid::new(),
            JellyField::for_level(level),
            GoalTracker::for_level(level),
            level,
            config,
        )?;
        session.populate_until_stable();
        Ok(session)
    }

    /// Build a session over a host-supplied grid, taken as-is. The level's
    /// authored jelly pattern and goals still apply.
    pub fn from_grid(grid: Grid, level: u32, config: LevelConfig) -> Result<Self, CoreError> {
        Self::from_parts(
            grid,
            JellyField::for_level(level),
            GoalTracker::for_level(level),
            level,
            config,
        )
    }

    /// Resume-from-parts hook: grid, jelly and goal progress all supplied by
    /// the host.
    pub fn from_parts(
        grid: Grid,
        jelly: JellyField,
        goals: GoalTracker,
        level: u32,
        config: LevelConfig,
    ) -> Result<Self, CoreError> {
        if level == 0 {
            return Err(CoreError::InvalidConfig("level must be >= 1".into()));
        }
        let p = config.fruit_match_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(CoreError::InvalidConfig(format!(
                "fruit_match_probability {p} outside [0, 1]"
            )));
        }
        let max_time = u64::from(jelly_crush_types::max_time_ms(level));
        Ok(Self {
            grid,
            jelly,
            goals,
            rng: SimpleRng::new(config.seed),
            level,
            score: 0,
            time_left_ms: max_time,
            max_time_ms: max_time,
            fruit_match_probability: p,
            seed: config.seed,
            busy: false,
            game_over: false,
            level_completing: false,
            events: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn jelly(&self) -> &JellyField {
        &self.jelly
    }

    pub fn goals(&self) -> &GoalTracker {
        &self.goals
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left_ms(&self) -> u64 {
        self.time_left_ms
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_level_completing(&self) -> bool {
        self.level_completing
    }

    /// Take all events emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snap = SessionSnapshot {
            goal_target: self.goals.target(),
            level: self.level,
            score: self.score,
            time_left_ms: self.time_left_ms,
            max_time_ms: self.max_time_ms,
            busy: self.busy,
            level_completing: self.level_completing,
            game_over: self.game_over,
            seed: self.seed,
            ..SessionSnapshot::default()
        };
        self.grid.write_u8_grid(&mut snap.board);
        self.jelly.write_u8_grid(&mut snap.jelly);
        self.goals.write_counts(&mut snap.goal_collected);
        snap
    }

    /// Attempt a player swap of two adjacent cells.
    ///
    /// A swap involving a special always resolves by activating it along the
    /// swap axis. A plain swap must produce at least one match or it is
    /// rolled back and `Rejected`. Intents arriving while a resolution is in
    /// flight (or the level is over) are dropped as `Busy`.
    pub fn attempt_swap(&mut self, from: Coord, to: Coord) -> Result<SwapOutcome, CoreError> {
        if !from.in_bounds() || !to.in_bounds() || !from.is_adjacent(to) {
            return Err(CoreError::InvalidCoordinate(from, to));
        }
        if self.busy || self.game_over || self.level_completing {
            return Ok(SwapOutcome::Busy);
        }
        let (Some(a), Some(b)) = (self.grid.piece(from), self.grid.piece(to)) else {
            return Err(CoreError::InvalidCoordinate(from, to));
        };

        self.busy = true;
        self.grid.swap(from, to);

        let outcome = if a.is_special() || b.is_special() {
            let axis = if from.row == to.row {
                Axis::Horizontal
            } else {
                Axis::Vertical
            };
            let mut set = ActivationSet::new();
            // Both swapped pieces leave the board, special or not.
            set.add_cell(to);
            set.add_cell(from);
            special::activate(&self.grid, to, Some(axis), &mut set);
            special::activate(&self.grid, from, Some(axis), &mut set);
            self.apply_activation(&set);
            self.resolve_board();
            SwapOutcome::Resolved
        } else {
            self.grid.mark_swapped(from);
            self.grid.mark_swapped(to);
            if matcher::find_matches(&self.grid).is_empty() {
                self.grid.swap(from, to);
                SwapOutcome::Rejected
            } else {
                self.resolve_board();
                SwapOutcome::Resolved
            }
        };

        self.grid.clear_swapped_flags();
        self.busy = false;
        if outcome == SwapOutcome::Resolved {
            self.check_completion();
        }
        Ok(outcome)
    }

    /// Advance the countdown. Ignored while the level is completing or
    /// already over.
    pub fn tick(&mut self, delta_ms: u64) -> TickOutcome {
        if self.game_over || self.level_completing {
            return TickOutcome::Running;
        }
        self.time_left_ms = self.time_left_ms.saturating_sub(delta_ms);
        if self.time_left_ms == 0 {
            self.game_over = true;
            self.events.push(GameEvent::GameOver {
                final_score: self.score,
                final_level: self.level,
            });
            return TickOutcome::TimeExpired;
        }
        TickOutcome::Running
    }

    /// Idle-time check: find a legal move to hint at, or reshuffle the
    /// board when none exists.
    pub fn check_idle(&mut self) -> IdleOutcome {
        if self.busy || self.game_over || self.level_completing {
            return IdleOutcome::Busy;
        }
        if let Some((a, b)) = self.find_possible_move() {
            self.events.push(GameEvent::HintAvailable { a, b });
            return IdleOutcome::Hint(a, b);
        }
        self.reshuffle();
        IdleOutcome::Reshuffled
    }

    /// Run the cascade/refill loop to its fixed point. Returns the number
    /// of match batches processed; an already-stable board returns 0.
    pub fn settle(&mut self) -> u32 {
        let batches = self.resolve_board();
        self.check_completion();
        batches
    }

    /// Reset for the next level, keeping the score and the RNG stream.
    /// Meant to be called after `LevelCompleted` has been observed.
    pub fn advance_level(&mut self) {
        self.level += 1;
        self.jelly = JellyField::for_level(self.level);
        self.goals = GoalTracker::for_level(self.level);
        self.max_time_ms = u64::from(jelly_crush_types::max_time_ms(self.level));
        self.time_left_ms = self.max_time_ms;
        self.level_completing = false;
        self.populate_until_stable();
    }

    fn populate_until_stable(&mut self) {
        loop {
            for coord in Grid::coords() {
                let fruit = self.rng.fruit();
                self.grid.set(coord, Some(Piece::fruit(fruit)));
            }
            if matcher::find_matches(&self.grid).is_empty() {
                break;
            }
        }
    }

    /// The resolution loop: process matches, cascade, refill, repeat until
    /// a pass neither matched nor moved nor spawned anything.
    fn resolve_board(&mut self) -> u32 {
        let mut batches = 0u32;
        loop {
            let matches = matcher::find_matches(&self.grid);
            if !matches.is_empty() {
                self.process_matches(matches);
                batches += 1;
                continue;
            }
            let cascaded = self.grid.cascade();
            let refilled = self.refill();
            let matches = matcher::find_matches(&self.grid);
            if !matches.is_empty() {
                self.process_matches(matches);
                batches += 1;
                continue;
            }
            if !cascaded && !refilled {
                break;
            }
        }
        batches
    }

    fn process_matches(&mut self, matches: Vec<Match>) {
        let creations = if self.level_completing {
            Vec::new()
        } else {
            self.plan_creations(&matches)
        };

        let mut removed: Vec<Coord> = Vec::new();
        for m in &matches {
            removed.extend_from_slice(&m.cells);
        }
        self.apply_removals(&removed);
        self.add_score(scoring::batch_points(&matches));

        for (at, kind) in creations {
            self.grid.set(at, Some(Piece::special(kind)));
            self.events.push(GameEvent::SpecialCreated { at, kind });
        }
    }

    /// Decide which specials this batch spawns. A merged corner yields a
    /// color bomb at the intersection; a 4-run a rocket perpendicular to
    /// the run; a 5-run or longer a bomb. The spawn cell is the swapped
    /// cell when the triggering swap sits inside the match, else the run's
    /// middle cell.
    fn plan_creations(&self, matches: &[Match]) -> Vec<(Coord, SpecialKind)> {
        let mut creations = Vec::new();
        for m in matches {
            match m.shape {
                MatchShape::Corner(corner) => {
                    creations.push((corner, SpecialKind::ColorBomb));
                }
                MatchShape::Line(axis) => {
                    let kind = match m.len() {
                        4 => Some(match axis {
                            Axis::Horizontal => SpecialKind::RocketV,
                            Axis::Vertical => SpecialKind::RocketH,
                        }),
                        n if n >= 5 => Some(SpecialKind::Bomb),
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        creations.push((self.creation_anchor(m), kind));
                    }
                }
            }
        }
        creations
    }

    fn creation_anchor(&self, m: &Match) -> Coord {
        m.cells
            .iter()
            .copied()
            .find(|&c| self.grid.piece(c).is_some_and(|p| p.is_swapped))
            .unwrap_or_else(|| m.middle())
    }

    /// Emit activation events and bonuses, then remove the blast cells.
    fn apply_activation(&mut self, set: &ActivationSet) {
        for &(at, kind) in set.activated() {
            self.events.push(GameEvent::SpecialActivated { at, kind });
            self.add_score(scoring::activation_bonus(kind));
        }
        self.apply_removals(set.cells());
    }

    /// Take pieces off the board, clearing jelly underneath and recording
    /// collection progress for every removed fruit.
    fn apply_removals(&mut self, coords: &[Coord]) {
        if coords.is_empty() {
            return;
        }
        let caused_by_jelly = coords.iter().any(|&c| self.jelly.has(c));
        self.events.push(GameEvent::PiecesRemoved {
            coords: coords.to_vec(),
            caused_by_jelly,
        });
        for &coord in coords {
            if let Some(piece) = self.grid.take(coord) {
                if let Some(fruit) = piece.as_fruit() {
                    self.record_goal(fruit);
                }
            }
            self.jelly.clear(coord);
        }
    }

    fn record_goal(&mut self, fruit: Fruit) {
        if let Some(collected) = self.goals.record(fruit) {
            self.events.push(GameEvent::GoalProgressed {
                fruit,
                collected,
                target: self.goals.target(),
            });
        }
    }

    fn add_score(&mut self, delta: u32) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        self.events.push(GameEvent::ScoreChanged {
            delta,
            total: self.score,
        });
    }

    /// Top up empty cells column by column, bottom-up. The first new piece
    /// in a column is biased to match the topmost fruit that survived below
    /// it, which keeps cascades flowing on generous configurations.
    fn refill(&mut self) -> bool {
        let mut refilled = false;
        for col in 0..GRID_SIZE as u8 {
            let survivor = (0..GRID_SIZE as u8).find_map(|row| {
                self.grid
                    .piece(Coord::new(row, col))
                    .and_then(Piece::as_fruit)
            });
            let mut new_count = 0u32;
            for row in (0..GRID_SIZE as u8).rev() {
                let coord = Coord::new(row, col);
                if !self.grid.is_empty_cell(coord) {
                    continue;
                }
                new_count += 1;
                let fruit = match survivor {
                    Some(f) if new_count == 1 && self.rng.chance(self.fruit_match_probability) => f,
                    _ => self.rng.fruit(),
                };
                self.grid.set(coord, Some(Piece::fruit(fruit)));
                refilled = true;
            }
        }
        refilled
    }

    /// Completion fires once jelly is gone and every goal is met: sweep the
    /// leftover specials, settle the board, then award the bonus breakdown.
    fn check_completion(&mut self) {
        if self.level_completing || self.game_over {
            return;
        }
        if !self.jelly.is_clear() || !self.goals.all_met() {
            return;
        }
        self.level_completing = true;

        let mut special_bonus = 0u32;
        let swept: Vec<Coord> = Grid::coords()
            .filter(|&c| self.grid.piece(c).is_some_and(|p| p.is_special()))
            .collect();
        for coord in swept {
            // A chain from an earlier sweep step may have consumed it.
            let Some(kind) = self.grid.piece(coord).and_then(|p| p.as_special()) else {
                continue;
            };
            special_bonus += scoring::sweep_bonus(kind);
            let mut set = ActivationSet::new();
            special::activate(&self.grid, coord, None, &mut set);
            self.apply_activation(&set);
            self.resolve_board();
        }
        self.resolve_board();

        let breakdown = CompletionBreakdown {
            level: self.level,
            time_bonus: scoring::time_bonus(self.time_left_ms),
            level_bonus: scoring::level_bonus(self.level),
            special_bonus,
            total_bonus: scoring::time_bonus(self.time_left_ms)
                + scoring::level_bonus(self.level)
                + special_bonus,
        };
        self.add_score(breakdown.total_bonus);
        self.events.push(GameEvent::LevelCompleted { breakdown });
    }

    /// Scan for any pair of adjacent plain fruits whose swap would match.
    /// Right and down neighbors cover every unordered pair exactly once.
    fn find_possible_move(&self) -> Option<(Coord, Coord)> {
        let mut scratch = self.grid.clone();
        for a in Grid::coords() {
            if !self.is_plain_fruit(a) {
                continue;
            }
            for b in [
                Coord::new(a.row, a.col + 1),
                Coord::new(a.row + 1, a.col),
            ] {
                if !b.in_bounds() || !self.is_plain_fruit(b) {
                    continue;
                }
                scratch.swap(a, b);
                let found = !matcher::find_matches(&scratch).is_empty();
                scratch.swap(a, b);
                if found {
                    return Some((a, b));
                }
            }
        }
        None
    }

    fn is_plain_fruit(&self, coord: Coord) -> bool {
        self.grid
            .piece(coord)
            .is_some_and(|p| p.as_fruit().is_some())
    }

    /// Permute the plain fruits in place, leaving specials and jelly where
    /// they are. Any matches the permutation happens to create resolve
    /// immediately.
    fn reshuffle(&mut self) {
        let cells: Vec<Coord> = Grid::coords().filter(|&c| self.is_plain_fruit(c)).collect();
        let mut fruits: Vec<Fruit> = cells
            .iter()
            .filter_map(|&c| self.grid.piece(c).and_then(Piece::as_fruit))
            .collect();
        self.rng.shuffle(&mut fruits);
        for (&coord, &fruit) in cells.iter().zip(fruits.iter()) {
            self.grid.set(coord, Some(Piece::fruit(fruit)));
        }
        self.events.push(GameEvent::Reshuffled);

        if !matcher::find_matches(&self.grid).is_empty() {
            self.busy = true;
            self.resolve_board();
            self.busy = false;
            self.check_completion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stable_rows() -> [&'static str; 8] {
        [
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
            "bkbkbkbk",
            "kbkbkbkb",
        ]
    }

    #[test]
    fn start_level_board_is_full_and_stable() {
        let session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        assert_eq!(session.grid().piece_count(), 64);
        assert!(matcher::find_matches(session.grid()).is_empty());
    }

    #[test]
    fn start_level_is_deterministic_per_seed() {
        let a = LevelSession::start_level(3, LevelConfig { seed: 77, ..Default::default() })
            .unwrap();
        let b = LevelSession::start_level(3, LevelConfig { seed: 77, ..Default::default() })
            .unwrap();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn zero_level_is_rejected() {
        let err = LevelSession::start_level(0, LevelConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn bad_probability_is_rejected() {
        let config = LevelConfig {
            fruit_match_probability: 1.5,
            ..Default::default()
        };
        let err = LevelSession::start_level(1, config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn non_adjacent_swap_is_an_error() {
        let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        let err = session
            .attempt_swap(Coord::new(0, 0), Coord::new(0, 2))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidCoordinate(_, _)));
    }

    #[test]
    fn out_of_bounds_swap_is_an_error() {
        let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        assert!(session
            .attempt_swap(Coord::new(7, 7), Coord::new(7, 8))
            .is_err());
    }

    #[test]
    fn matchless_swap_rolls_back() {
        let grid = Grid::from_rows(stable_rows());
        let mut session =
            LevelSession::from_grid(grid.clone(), 1, LevelConfig::default()).unwrap();
        let outcome = session
            .attempt_swap(Coord::new(0, 0), Coord::new(0, 1))
            .unwrap();
        assert_eq!(outcome, SwapOutcome::Rejected);
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn tick_counts_down_and_expires() {
        let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        assert_eq!(session.tick(1_000), TickOutcome::Running);
        assert_eq!(session.time_left_ms(), 179_000);
        assert_eq!(session.tick(u64::MAX), TickOutcome::TimeExpired);
        assert!(session.is_game_over());
        let events = session.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn tick_after_game_over_is_inert() {
        let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        session.tick(u64::MAX);
        session.drain_events();
        assert_eq!(session.tick(1_000), TickOutcome::Running);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn swap_after_game_over_is_busy() {
        let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
        session.tick(u64::MAX);
        let outcome = session
            .attempt_swap(Coord::new(0, 0), Coord::new(0, 1))
            .unwrap();
        assert_eq!(outcome, SwapOutcome::Busy);
    }

    // Three fruits striped along diagonals: match-free, and no single swap
    // can line up three of a kind.
    fn no_move_rows() -> [&'static str; 8] {
        [
            "bkgbkgbk",
            "kgbkgbkg",
            "gbkgbkgb",
            "bkgbkgbk",
            "kgbkgbkg",
            "gbkgbkgb",
            "bkgbkgbk",
            "kgbkgbkg",
        ]
    }

    #[test]
    fn hint_found_when_a_move_exists() {
        // Swapping (0,1) down into row 1 lines up three kiwis.
        let grid = Grid::from_rows(stable_rows());
        let mut session = LevelSession::from_grid(grid, 1, LevelConfig::default()).unwrap();
        let outcome = session.check_idle();
        assert!(matches!(outcome, IdleOutcome::Hint(_, _)));
        let events = session.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::HintAvailable { .. }]
        ));
    }

    #[test]
    fn reshuffle_conserves_the_fruit_multiset() {
        let grid = Grid::from_rows(no_move_rows());
        let histogram = grid.fruit_histogram();
        let mut session = LevelSession::from_grid(grid, 1, LevelConfig::default()).unwrap();

        let outcome = session.check_idle();
        assert_eq!(outcome, IdleOutcome::Reshuffled);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Reshuffled));
        // A post-shuffle cascade may remove fruits, but if none resolved
        // the multiset must be identical.
        if session.grid().piece_count() == 64 {
            assert_eq!(session.grid().fruit_histogram(), histogram);
        }
    }

    #[test]
    fn settle_on_stable_board_is_zero_batches() {
        let grid = Grid::from_rows(stable_rows());
        let mut session = LevelSession::from_grid(grid, 1, LevelConfig::default()).unwrap();
        assert_eq!(session.settle(), 0);
        assert!(session.drain_events().is_empty());
    }
}
