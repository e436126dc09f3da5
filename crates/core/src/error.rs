//! Error taxonomy for the rules engine
//!
//! Only genuinely invalid input is an error. Gameplay refusals (rejected
//! swaps, busy engine, expired timer) are outcome values, not errors.

use jelly_crush_types::Coord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A swap endpoint is outside the board or the pair is not adjacent.
    #[error("invalid swap coordinates: {0} -> {1}")]
    InvalidCoordinate(Coord, Coord),

    /// A session parameter is out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
