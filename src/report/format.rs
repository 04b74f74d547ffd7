//! Formatted output for an estimate.
//!
//! Formatting lives in one place so the TUI and the `predict` subcommand show
//! exactly the same strings.

use crate::app::estimate::Estimate;
use crate::report::PriceReport;

pub const PAGE_TITLE: &str = "Bengaluru House Price Predictor";
pub const PAGE_DESCRIPTION: &str = "This app predicts house prices in Bengaluru based on location, size, and amenities. Enter your requirements below to get an estimated price!";
pub const DATA_SOURCE: &str = "Data source: Bengaluru House Price Dataset";

/// A labelled metric for the insights panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
    pub help: &'static str,
}

pub fn format_price_lakhs(price: f64) -> String {
    format!("₹ {price:.2} Lakhs")
}

pub fn format_price_million(report: &PriceReport) -> String {
    format!("₹ {:.2} Million", report.price_million)
}

/// The three insight tiles, in display order.
pub fn metric_tiles(report: &PriceReport) -> [MetricTile; 3] {
    [
        MetricTile {
            label: "Price per Sq.ft",
            value: format!("₹ {:.2}", report.price_per_sqft),
            help: "Price per square feet",
        },
        MetricTile {
            label: "Price per BHK",
            value: format!("₹ {:.2} Lakhs", report.price_per_bhk),
            help: "Price per bedroom",
        },
        MetricTile {
            label: "Area per BHK",
            value: format!("{:.2} sq.ft", report.area_per_bhk),
            help: "Square feet per bedroom",
        },
    ]
}

pub fn format_inference_error(err: &impl std::fmt::Display) -> String {
    format!("Error making prediction: {err}")
}

/// Format a full estimate for terminal output.
///
/// A failed prediction contributes only the inputs and warnings.
pub fn format_estimate(estimate: &Estimate) -> String {
    let mut out = String::new();
    let req = &estimate.request;

    out.push_str(&format!("=== {PAGE_TITLE} ===\n"));
    out.push_str(&format!(
        "Location: {} | Area: {:.0} sq.ft | BHK: {} | Bathrooms: {}\n",
        req.location(),
        req.total_sqft(),
        req.bhk(),
        req.bath()
    ));

    for advisory in &estimate.advisories {
        out.push_str(&format!("warning: {advisory}\n"));
    }

    match &estimate.outcome {
        Ok(report) => {
            out.push_str("\nEstimated Price\n");
            out.push_str(&format!("{}\n", format_price_lakhs(report.price)));
            out.push_str(&format!("({})\n", format_price_million(report)));

            out.push_str("\nPrice Insights:\n");
            for tile in metric_tiles(report) {
                out.push_str(&format!("- {:<16} {}\n", tile.label, tile.value));
            }
        }
        // Reported by the caller, once.
        Err(_) => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationSet, PredictionRequest};
    use crate::models::pipeline::InferenceError;
    use crate::validate::Advisory;

    fn request() -> PredictionRequest {
        PredictionRequest::new("Whitefield", 1000.0, 2, 2, &LocationSet::default()).unwrap()
    }

    #[test]
    fn price_strings() {
        let r = PriceReport::new(75.3, &request());
        assert_eq!(format_price_lakhs(r.price), "₹ 75.30 Lakhs");
        assert_eq!(format_price_million(&r), "₹ 7.53 Million");
    }

    #[test]
    fn tiles_use_two_decimals_and_units() {
        let r = PriceReport::new(85.0, &request());
        let tiles = metric_tiles(&r);
        assert_eq!(tiles[0].value, "₹ 8500.00");
        assert_eq!(tiles[1].value, "₹ 42.50 Lakhs");
        assert_eq!(tiles[2].value, "500.00 sq.ft");
    }

    #[test]
    fn failed_estimate_text_has_warnings_but_no_error_line() {
        let estimate = Estimate {
            request: request(),
            advisories: vec![Advisory::LowAreaPerBedroom],
            outcome: Err(InferenceError::EmptyOutput),
        };
        let text = format_estimate(&estimate);
        assert!(text.contains("warning: The square feet per bedroom seems to be very low."));
        assert!(!text.contains("Error making prediction"));
        assert!(!text.contains("Estimated Price"));
    }
}
