//! Core rules engine - pure, deterministic, and testable
//!
//! All the match-3 rules live here: match detection, swap resolution,
//! special piece activation, the cascade/refill loop, jelly clearing,
//! collection goals and level completion. The crate has **zero
//! dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical sessions (for replay
//!   and remote drivers)
//! - **Testable**: Every rule is exercised without a frontend
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`grid`]: 8x8 board with gravity compaction and flat-array storage
//! - [`matcher`]: run detection and T/L intersection merging
//! - [`special`]: rocket/bomb/color-bomb blast regions with chained
//!   activation
//! - [`session`]: the authoritative state machine driving one level
//! - [`scoring`]: point formulas for matches, activations and bonuses
//! - [`goals`]: per-fruit collection targets
//! - [`jelly`]: the per-level jelly overlay
//! - [`rng`]: seeded LCG behind every random decision
//!
//! # Example
//!
//! ```
//! use jelly_crush_core::LevelSession;
//! use jelly_crush_types::{Coord, LevelConfig, SwapOutcome};
//!
//! let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
//!
//! // A fresh board never contains a ready-made match.
//! assert_eq!(session.settle(), 0);
//!
//! // Swaps either resolve, roll back, or are dropped while busy.
//! let outcome = session.attempt_swap(Coord::new(4, 3), Coord::new(4, 4)).unwrap();
//! assert!(matches!(
//!     outcome,
//!     SwapOutcome::Resolved | SwapOutcome::Rejected
//! ));
//!
//! // The host drains events and sequences presentation against them.
//! for event in session.drain_events() {
//!     let _ = event;
//! }
//! ```

pub mod error;
pub mod goals;
pub mod grid;
pub mod jelly;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod special;

pub use jelly_crush_types as types;

// Re-export commonly used types for convenience
pub use error::CoreError;
pub use goals::GoalTracker;
pub use grid::{fruit_from_char, Grid};
pub use jelly::JellyField;
pub use matcher::{find_matches, Match, MatchShape};
pub use rng::SimpleRng;
pub use session::LevelSession;
pub use snapshot::SessionSnapshot;
pub use special::{activate, ActivationSet};
