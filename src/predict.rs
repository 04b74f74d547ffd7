//! Single-row price prediction.
//!
//! The predictor is the boundary around the external model: whatever goes
//! wrong inside the pipeline (bad column, unknown category, a panic) comes
//! back as an [`InferenceError`] and never unwinds into the caller.
//!
//! While the pipeline runs, panics raised on the calling thread are logged at
//! debug level instead of going through the process panic hook, which would
//! print over the TUI.

use std::panic::{self, AssertUnwindSafe, PanicHookInfo, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use log::{debug, warn};

use crate::domain::PredictionRequest;
use crate::models::pipeline::{Column, FeatureFrame, InferenceError, Pipeline};

/// Build the one-row input frame the pipeline expects.
///
/// Counts are passed as floats, matching the training-time dtypes.
pub fn request_frame(request: &PredictionRequest) -> FeatureFrame {
    FeatureFrame::new()
        .with_column("location", Column::Categorical(vec![request.location().to_string()]))
        .with_column("total_sqft", Column::Numeric(vec![request.total_sqft()]))
        .with_column("bath", Column::Numeric(vec![request.bath() as f64]))
        .with_column("bhk", Column::Numeric(vec![request.bhk().get() as f64]))
}

/// Predict the price (in Lakhs) for one request.
pub fn predict_price(request: &PredictionRequest, pipeline: &dyn Pipeline) -> Result<f64, InferenceError> {
    let frame = request_frame(request);
    debug!("predicting for {request:?}");

    let result = {
        let _quiet = QuietPanics::install();
        catch_unwind(AssertUnwindSafe(|| pipeline.predict(&frame)))
    };
    let result = match result {
        Ok(result) => result,
        Err(payload) => Err(InferenceError::Panicked(panic_message(payload.as_ref()))),
    };

    let price = result.and_then(|values| {
        let first = *values.first().ok_or(InferenceError::EmptyOutput)?;
        if !first.is_finite() {
            return Err(InferenceError::NonFiniteOutput(first));
        }
        Ok(first)
    });

    if let Err(err) = &price {
        warn!("prediction failed for {}: {err}", request.location());
    }
    price
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Serializes hook swaps so concurrent predictions restore hooks in order.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

/// Replaces the panic hook for the current thread until dropped.
///
/// Panics on other threads still reach the previous hook.
struct QuietPanics {
    previous: Option<Arc<PanicHook>>,
    _lock: MutexGuard<'static, ()>,
}

impl QuietPanics {
    fn install() -> Self {
        let lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = Arc::new(panic::take_hook());
        let fallback = Arc::clone(&previous);
        let owner = thread::current().id();
        panic::set_hook(Box::new(move |info| {
            if thread::current().id() == owner {
                debug!("pipeline panicked: {info}");
            } else {
                fallback(info);
            }
        }));
        Self {
            previous: Some(previous),
            _lock: lock,
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        // Dropping the quiet hook releases its clone of `previous`.
        drop(panic::take_hook());
        if let Some(previous) = self.previous.take() {
            match Arc::try_unwrap(previous) {
                Ok(hook) => panic::set_hook(hook),
                Err(shared) => panic::set_hook(Box::new(move |info| shared(info))),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}
