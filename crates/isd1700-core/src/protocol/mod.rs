//! Command sequences over a [`Link`](crate::link::Link)
//!
//! Free functions implementing the chip's transaction shapes; the session
//! state machine composes them into full operations.

mod commands;

pub use commands::*;
