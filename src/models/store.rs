//! Once-per-process model loading.
//!
//! [`ModelStore`] wraps a [`ModelLoader`] and memoizes its outcome. The first
//! call to [`ModelStore::load`] runs the loader; every later call returns the
//! same `Arc` (or the same error) without touching storage again. There is no
//! invalidation: a new model requires a new process.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use log::{debug, info};
use thiserror::Error;

use crate::domain::{LocationFileError, LocationSet};
use crate::models::pipeline::{ArtifactError, LinearPipeline, Pipeline};

/// The loaded pipeline plus the location domain offered by the form.
pub struct LoadedModel {
    pub pipeline: Arc<dyn Pipeline>,
    pub locations: LocationSet,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("locations", &self.locations)
            .finish_non_exhaustive()
    }
}

/// A load failure. Cloneable so the memoized outcome can be handed out repeatedly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<ArtifactError> for LoadError {
    fn from(value: ArtifactError) -> Self {
        Self::new(value.to_string())
    }
}

impl From<LocationFileError> for LoadError {
    fn from(value: LocationFileError) -> Self {
        Self::new(value.to_string())
    }
}

/// Produces a [`LoadedModel`] from persistent storage.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<LoadedModel, LoadError>;
}

/// Memoizing wrapper around a loader.
pub struct ModelStore {
    loader: Box<dyn ModelLoader>,
    cell: OnceLock<Result<Arc<LoadedModel>, LoadError>>,
}

impl ModelStore {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceLock::new(),
        }
    }

    /// Return the cached model, loading it on first use.
    pub fn load(&self) -> Result<Arc<LoadedModel>, LoadError> {
        self.cell
            .get_or_init(|| {
                debug!("model store: first load");
                self.loader.load().map(Arc::new)
            })
            .clone()
    }

    /// Whether a load has already been attempted.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Loads a [`LinearPipeline`] artifact and an optional location file.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    pub model_path: PathBuf,
    pub locations_path: Option<PathBuf>,
}

impl ArtifactLoader {
    pub fn new(model_path: impl Into<PathBuf>, locations_path: Option<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            locations_path,
        }
    }
}

impl ModelLoader for ArtifactLoader {
    fn load(&self) -> Result<LoadedModel, LoadError> {
        let pipeline = LinearPipeline::from_json_file(&self.model_path)?;
        info!(
            "loaded model pipeline from {} ({} categories)",
            self.model_path.display(),
            pipeline.categories().len()
        );

        let locations = match &self.locations_path {
            Some(path) => {
                let set = LocationSet::from_json_file(path)?;
                info!("loaded {} locations from {}", set.len(), path.display());
                set
            }
            None => LocationSet::default(),
        };

        Ok(LoadedModel {
            pipeline: Arc::new(pipeline),
            locations,
        })
    }
}
