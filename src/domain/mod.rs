//! Domain types used throughout the estimator.
//!
//! This module defines:
//!
//! - the form field bounds (`SQFT_BOUNDS`, `BHK_BOUNDS`, `BATH_BOUNDS`)
//! - the configurable location domain (`LocationSet`)
//! - checked prediction inputs (`PredictionRequest`)

pub mod types;

pub use types::*;
