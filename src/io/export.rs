//! Export an estimate to JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::estimate::Estimate;
use crate::error::{AppError, EXIT_INPUT, EXIT_IO};
use crate::report::PriceReport;

#[derive(Debug, Clone, Serialize)]
pub struct EstimateRecord<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub location: &'a str,
    pub total_sqft: f64,
    pub bhk: u32,
    pub bath: u32,
    #[serde(flatten)]
    pub report: PriceReport,
    pub warnings: Vec<&'static str>,
}

impl<'a> EstimateRecord<'a> {
    /// Build a record from a successful estimate.
    pub fn from_estimate(estimate: &'a Estimate, generated_at: DateTime<Utc>) -> Result<Self, AppError> {
        let report = estimate.report().copied().ok_or_else(|| {
            AppError::new(EXIT_INPUT, "No successful estimate to export.")
        })?;
        let req = &estimate.request;
        Ok(Self {
            tool: "hpp",
            generated_at,
            location: req.location(),
            total_sqft: req.total_sqft(),
            bhk: req.bhk().get(),
            bath: req.bath(),
            report,
            warnings: estimate.advisories.iter().map(|a| a.message()).collect(),
        })
    }
}

/// Write an estimate as pretty JSON.
pub fn write_estimate_json(path: &Path, estimate: &Estimate) -> Result<(), AppError> {
    let record = EstimateRecord::from_estimate(estimate, Utc::now())?;

    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to create export '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationSet, PredictionRequest};
    use crate::models::pipeline::InferenceError;
    use crate::validate::Advisory;

    fn estimate(outcome: Result<f64, InferenceError>) -> Estimate {
        let request = PredictionRequest::new("Hebbal", 1000.0, 5, 2, &LocationSet::default()).unwrap();
        Estimate {
            outcome: outcome.map(|p| PriceReport::new(p, &request)),
            request,
            advisories: vec![Advisory::BathroomsExceedBedrooms],
        }
    }

    #[test]
    fn writes_flat_json_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimate.json");
        write_estimate_json(&path, &estimate(Ok(85.0))).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["location"], "Hebbal");
        assert_eq!(value["price"], 85.0);
        assert_eq!(value["price_per_sqft"], 8500.0);
        assert_eq!(value["area_per_bhk"], 500.0);
        assert_eq!(value["bhk"], 2);
        assert_eq!(
            value["warnings"][0],
            "Having bathrooms more than BHK+2 is unusual. Are you sure?"
        );
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn failed_estimate_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimate.json");
        let err = write_estimate_json(&path, &estimate(Err(InferenceError::EmptyOutput))).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(!path.exists());
    }
}
