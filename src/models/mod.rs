//! Model artifact handling.
//!
//! - `pipeline`: the inference trait and the JSON-backed linear pipeline
//! - `store`: once-per-process loading and caching

pub mod pipeline;
pub mod store;

pub use pipeline::*;
pub use store::*;
