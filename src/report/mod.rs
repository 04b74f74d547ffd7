//! Reporting utilities: derived metrics and formatted terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::PredictionRequest;

/// Rupees per Lakh.
pub const RUPEES_PER_LAKH: f64 = 100_000.0;

/// Lakhs to Millions (1 Lakh = 0.1 Million).
pub const LAKH_TO_MILLION: f64 = 0.1;

/// A successful prediction plus the metrics derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceReport {
    /// Predicted price in Lakhs.
    pub price: f64,
    pub price_million: f64,
    /// Rupees per square foot.
    pub price_per_sqft: f64,
    /// Lakhs per bedroom.
    pub price_per_bhk: f64,
    /// Square feet per bedroom.
    pub area_per_bhk: f64,
}

impl PriceReport {
    pub fn new(price: f64, request: &PredictionRequest) -> Self {
        let bhk = request.bhk().get() as f64;
        let sqft = request.total_sqft();
        Self {
            price,
            price_million: price * LAKH_TO_MILLION,
            price_per_sqft: price * RUPEES_PER_LAKH / sqft,
            price_per_bhk: price / bhk,
            area_per_bhk: sqft / bhk,
        }
    }
}
