//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (rules engine, host protocol, test harnesses).
//!
//! # Board Dimensions
//!
//! The playfield is a fixed 8x8 grid. Coordinates are `(row, col)` with
//! `(0, 0)` at the top-left; `row` grows downward, `col` grows rightward.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `INITIAL_TIME_MS` | 180000 | Level 1 countdown (3 minutes) |
//! | `TIME_DECREASE_PER_LEVEL_MS` | 5000 | Each level is 5s shorter |
//! | `MIN_TIME_MS` | 20000 | Countdown floor |
//! | `MOVE_CHECK_DELAY_MS` | 1000 | Host idle delay before the no-move check |
//! | `HINT_DELAY_MS` | 8000 | Host idle delay before showing a hint |
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MATCH_UNIT_SCORE` | 10 | Per-piece factor in the match formula |
//! | `SPECIAL_ACTIVATION_BONUS` | 50 | Awarded on every special activation |
//! | `COLOR_BOMB_EXTRA_BONUS` | 100 | Added on top for a color bomb |
//! | `LEVEL_BONUS_PER_LEVEL` | 100 | Level-completion bonus multiplier |
//! | `TIME_BONUS_PER_SECOND` | 10 | Level-completion time bonus rate |
//!
//! A plain match scores `len * 10 * (len - 2)`: a 3-match is worth 30,
//! a 4-match 80, a 5-match 150.
//!
//! # Examples
//!
//! ```
//! use jelly_crush_types::{Coord, Fruit, SpecialKind, GRID_SIZE};
//!
//! let a = Coord::new(3, 4);
//! let b = Coord::new(3, 5);
//! assert!(a.is_adjacent(b));
//! assert!(!a.is_adjacent(Coord::new(4, 5)));
//!
//! // String round-trips used by the host protocol.
//! assert_eq!(Fruit::from_str("kiwi"), Some(Fruit::Kiwi));
//! assert_eq!(SpecialKind::Bomb.as_str(), "bomb");
//! assert_eq!(GRID_SIZE, 8);
//! ```

/// Board side length (the grid is square).
pub const GRID_SIZE: usize = 8;

/// Total number of cells on the board.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Number of fruit kinds in the palette.
pub const FRUIT_COUNT: usize = 7;

/// Level 1 countdown in milliseconds (3 minutes).
pub const INITIAL_TIME_MS: u32 = 180_000;

/// Countdown reduction per level in milliseconds.
pub const TIME_DECREASE_PER_LEVEL_MS: u32 = 5_000;

/// Countdown floor in milliseconds.
pub const MIN_TIME_MS: u32 = 20_000;

/// Host-side idle delay before running the no-move check.
pub const MOVE_CHECK_DELAY_MS: u32 = 1_000;

/// Host-side idle delay before surfacing a hint.
pub const HINT_DELAY_MS: u32 = 8_000;

/// Per-piece factor in the match score formula `len * 10 * (len - 2)`.
pub const MATCH_UNIT_SCORE: u32 = 10;

/// Flat bonus awarded immediately on every special activation.
pub const SPECIAL_ACTIVATION_BONUS: u32 = 50;

/// Extra bonus a color bomb adds on top of the activation bonus.
pub const COLOR_BOMB_EXTRA_BONUS: u32 = 100;

/// Level-completion bonus: `level * 100`.
pub const LEVEL_BONUS_PER_LEVEL: u32 = 100;

/// Level-completion time bonus: 10 points per remaining second.
pub const TIME_BONUS_PER_SECOND: u32 = 10;

/// Collection target for every fruit is `COLLECTION_TARGET_BASE + level`.
pub const COLLECTION_TARGET_BASE: u32 = 4;

/// End-of-level sweep bonus for a leftover rocket.
pub const ROCKET_SWEEP_BONUS: u32 = 500;

/// End-of-level sweep bonus for a leftover bomb.
pub const BOMB_SWEEP_BONUS: u32 = 750;

/// End-of-level sweep bonus for a leftover color bomb.
pub const COLOR_BOMB_SWEEP_BONUS: u32 = 1_000;

/// The seven fruit kinds in the palette.
///
/// The palette order is fixed; `index()` is stable and used for goal
/// bookkeeping and board snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fruit {
    Banana,
    Kiwi,
    Lemon,
    Watermelon,
    Grape,
    Cherry,
    Coconut,
}

impl Fruit {
    pub const ALL: [Self; FRUIT_COUNT] = [
        Self::Banana,
        Self::Kiwi,
        Self::Lemon,
        Self::Watermelon,
        Self::Grape,
        Self::Cherry,
        Self::Coconut,
    ];

    /// Stable palette index, 0-based.
    pub fn index(self) -> usize {
        match self {
            Self::Banana => 0,
            Self::Kiwi => 1,
            Self::Lemon => 2,
            Self::Watermelon => 3,
            Self::Grape => 4,
            Self::Cherry => 5,
            Self::Coconut => 6,
        }
    }

    /// Parse a fruit from its lowercase protocol name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "banana" => Some(Self::Banana),
            "kiwi" => Some(Self::Kiwi),
            "lemon" => Some(Self::Lemon),
            "watermelon" => Some(Self::Watermelon),
            "grape" => Some(Self::Grape),
            "cherry" => Some(Self::Cherry),
            "coconut" => Some(Self::Coconut),
            _ => None,
        }
    }

    /// Lowercase protocol name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banana => "banana",
            Self::Kiwi => "kiwi",
            Self::Lemon => "lemon",
            Self::Watermelon => "watermelon",
            Self::Grape => "grape",
            Self::Cherry => "cherry",
            Self::Coconut => "coconut",
        }
    }
}

/// The four special piece kinds.
///
/// - `RocketH` / `RocketV`: clear a full row or column
/// - `Bomb`: clears the 3x3 block around itself
/// - `ColorBomb`: clears its full row AND full column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    RocketH,
    RocketV,
    Bomb,
    ColorBomb,
}

impl SpecialKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rocket_h" | "rocketh" => Some(Self::RocketH),
            "rocket_v" | "rocketv" => Some(Self::RocketV),
            "bomb" => Some(Self::Bomb),
            "color_bomb" | "colorbomb" => Some(Self::ColorBomb),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RocketH => "rocket_h",
            Self::RocketV => "rocket_v",
            Self::Bomb => "bomb",
            Self::ColorBomb => "color_bomb",
        }
    }
}

/// What occupies a cell: a plain fruit or a special piece, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Fruit(Fruit),
    Special(SpecialKind),
}

/// A board piece.
///
/// `is_swapped` is a transient per-cycle flag marking "just moved by the
/// triggering swap"; it only influences the anchor cell chosen for special
/// creation and is cleared at the end of every swap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub is_swapped: bool,
}

impl Piece {
    pub fn fruit(fruit: Fruit) -> Self {
        Self {
            kind: PieceKind::Fruit(fruit),
            is_swapped: false,
        }
    }

    pub fn special(kind: SpecialKind) -> Self {
        Self {
            kind: PieceKind::Special(kind),
            is_swapped: false,
        }
    }

    pub fn as_fruit(self) -> Option<Fruit> {
        match self.kind {
            PieceKind::Fruit(f) => Some(f),
            PieceKind::Special(_) => None,
        }
    }

    pub fn as_special(self) -> Option<SpecialKind> {
        match self.kind {
            PieceKind::Special(s) => Some(s),
            PieceKind::Fruit(_) => None,
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self.kind, PieceKind::Special(_))
    }
}

/// A cell on the board: empty or holding exactly one piece.
pub type Cell = Option<Piece>;

/// A board coordinate, always expected to satisfy `row, col < GRID_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (self.row as usize) < GRID_SIZE && (self.col as usize) < GRID_SIZE
    }

    /// Manhattan-distance-1 adjacency.
    pub fn is_adjacent(self, other: Coord) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }

    /// Row-major flat index.
    pub fn index(self) -> usize {
        self.row as usize * GRID_SIZE + self.col as usize
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Axis of a swap or a match run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Result of a swap attempt.
///
/// `Rejected` is the normal no-match rollback, not an error; the grid is
/// guaranteed untouched. `Busy` means a resolution cycle was in flight and
/// the intent was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Resolved,
    Rejected,
    Busy,
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    TimeExpired,
}

/// Result of an idle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// A legal move exists; the pair is also emitted as `HintAvailable`.
    Hint(Coord, Coord),
    /// No legal move existed; the board was reshuffled.
    Reshuffled,
    /// A resolution cycle was in flight; nothing was checked.
    Busy,
}

/// Per-level configuration supplied by the host at `start_level`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    /// RNG seed; the whole session is deterministic given the seed.
    pub seed: u32,
    /// Probability in `[0, 1]` that the first refill piece in a column
    /// matches the topmost surviving fruit below it. Difficulty knob;
    /// 1.0 biases cascades toward continuing chains.
    pub fruit_match_probability: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            fruit_match_probability: 1.0,
        }
    }
}

/// Score breakdown reported with `LevelCompleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionBreakdown {
    pub level: u32,
    pub time_bonus: u32,
    pub level_bonus: u32,
    pub special_bonus: u32,
    pub total_bonus: u32,
}

/// Events emitted to the presentation/host collaborator.
///
/// The core never schedules time-based callbacks; it returns these events
/// and the host sequences animation and audio against them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PiecesRemoved {
        coords: Vec<Coord>,
        caused_by_jelly: bool,
    },
    SpecialCreated {
        at: Coord,
        kind: SpecialKind,
    },
    SpecialActivated {
        at: Coord,
        kind: SpecialKind,
    },
    ScoreChanged {
        delta: u32,
        total: u32,
    },
    GoalProgressed {
        fruit: Fruit,
        collected: u32,
        target: u32,
    },
    LevelCompleted {
        breakdown: CompletionBreakdown,
    },
    GameOver {
        final_score: u32,
        final_level: u32,
    },
    Reshuffled,
    HintAvailable {
        a: Coord,
        b: Coord,
    },
}

/// Countdown length for a level: 3 minutes minus 5 seconds per level,
/// floored at 20 seconds.
pub fn max_time_ms(level: u32) -> u32 {
    let decrease = TIME_DECREASE_PER_LEVEL_MS.saturating_mul(level.saturating_sub(1));
    INITIAL_TIME_MS.saturating_sub(decrease).max(MIN_TIME_MS)
}
