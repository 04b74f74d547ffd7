//! Shared estimate flow used by both CLI and TUI front-ends.
//!
//! validate (advisory) -> predict -> derive metrics
//!
//! The CLI and the TUI then only deal with presentation.

use log::{info, warn};

use crate::domain::PredictionRequest;
use crate::models::pipeline::{Column, FeatureFrame, InferenceError};
use crate::models::store::LoadedModel;
use crate::predict::predict_price;
use crate::report::PriceReport;
use crate::validate::{self, Advisory};

/// Everything produced by one "Calculate Price" press.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub request: PredictionRequest,
    pub advisories: Vec<Advisory>,
    pub outcome: Result<PriceReport, InferenceError>,
}

impl Estimate {
    pub fn report(&self) -> Option<&PriceReport> {
        self.outcome.as_ref().ok()
    }
}

/// Run one pass of the estimate flow.
pub fn run_estimate(request: &PredictionRequest, model: &LoadedModel) -> Estimate {
    let advisories = validate::check(request);
    for advisory in &advisories {
        warn!("advisory: {advisory}");
    }

    let outcome = predict_price(request, model.pipeline.as_ref())
        .map(|price| PriceReport::new(price, request));
    if let Ok(report) = &outcome {
        info!(
            "estimate for {} ({:.0} sq.ft, {} BHK, {} bath): {:.2} lakhs",
            request.location(),
            request.total_sqft(),
            request.bhk(),
            request.bath(),
            report.price
        );
    }

    Estimate {
        request: request.clone(),
        advisories,
        outcome,
    }
}

/// Predicted price across a range of areas, holding the other inputs fixed.
///
/// All rows go through the pipeline in one batch.
pub fn price_curve(
    request: &PredictionRequest,
    model: &LoadedModel,
    sqft_min: f64,
    sqft_max: f64,
    n: usize,
) -> Result<Vec<(f64, f64)>, InferenceError> {
    let n = n.max(2);
    let areas: Vec<f64> = (0..n)
        .map(|i| sqft_min + (sqft_max - sqft_min) * i as f64 / (n as f64 - 1.0))
        .collect();

    let frame = FeatureFrame::new()
        .with_column("location", Column::Categorical(vec![request.location().to_string(); n]))
        .with_column("total_sqft", Column::Numeric(areas.clone()))
        .with_column("bath", Column::Numeric(vec![request.bath() as f64; n]))
        .with_column("bhk", Column::Numeric(vec![request.bhk().get() as f64; n]));

    let prices = model.pipeline.predict(&frame)?;
    if prices.len() != n {
        return Err(InferenceError::Other(format!(
            "expected {n} predictions, got {}",
            prices.len()
        )));
    }
    Ok(areas.into_iter().zip(prices).collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::domain::LocationSet;
    use crate::models::pipeline::Pipeline;
    use crate::models::store::{ArtifactLoader, ModelLoader};
    use crate::report::{format_price_lakhs, format_price_million};

    struct Constant(f64);

    impl Pipeline for Constant {
        fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![self.0; frame.n_rows()?])
        }
    }

    fn stub_model(price: f64) -> LoadedModel {
        LoadedModel {
            pipeline: Arc::new(Constant(price)),
            locations: LocationSet::default(),
        }
    }

    #[test]
    fn whitefield_end_to_end_with_stub() {
        let model = stub_model(75.3);
        let req = PredictionRequest::new("Whitefield", 1000.0, 2, 2, &model.locations).unwrap();
        let estimate = run_estimate(&req, &model);

        assert!(estimate.advisories.is_empty());
        let report = estimate.report().unwrap();
        assert_eq!(format_price_lakhs(report.price), "₹ 75.30 Lakhs");
        assert_eq!(format_price_million(report), "₹ 7.53 Million");
    }

    #[test]
    fn advisories_do_not_block_prediction() {
        let model = stub_model(40.0);
        let req = PredictionRequest::new("Hebbal", 300.0, 6, 2, &model.locations).unwrap();
        let estimate = run_estimate(&req, &model);

        assert_eq!(
            estimate.advisories,
            [Advisory::BathroomsExceedBedrooms, Advisory::LowAreaPerBedroom]
        );
        assert!(estimate.report().is_some());
    }

    #[test]
    fn bundled_model_produces_plausible_prices() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model_pipeline.json");
        let model = ArtifactLoader::new(path, None).load().unwrap();

        for name in model.locations.names() {
            let req = PredictionRequest::new(name, 1000.0, 2, 2, &model.locations).unwrap();
            let price = run_estimate(&req, &model).outcome.unwrap().price;
            assert!(price > 0.0 && price < 500.0, "{name}: {price}");
        }
    }

    #[test]
    fn price_curve_spans_requested_range() {
        let model = stub_model(10.0);
        let req = PredictionRequest::new("Hebbal", 1000.0, 2, 2, &model.locations).unwrap();
        let curve = price_curve(&req, &model, 100.0, 2200.0, 22).unwrap();
        assert_eq!(curve.len(), 22);
        assert_eq!(curve[0], (100.0, 10.0));
        assert!((curve[21].0 - 2200.0).abs() < 1e-9);
    }
}
