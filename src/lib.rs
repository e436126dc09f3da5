//! Jelly Crush (workspace facade crate).
//!
//! This package keeps a single `jelly_crush::{core,adapter,types}` public
//! API while the implementation lives in dedicated crates under `crates/`.

pub use jelly_crush_adapter as adapter;
pub use jelly_crush_core as core;
pub use jelly_crush_types as types;
