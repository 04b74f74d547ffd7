//! Input/output helpers.
//!
//! - estimate exports (JSON) (`export`)

pub mod export;

pub use export::*;
