//! Inference pipelines.
//!
//! A pipeline maps a column-oriented [`FeatureFrame`] to one prediction per
//! row. The crate ships one concrete implementation, [`LinearPipeline`], which
//! is deserialized from the JSON artifact produced by the training process:
//!
//! ```text
//! features = [one_hot(location)..., (x_j - mean_j) / scale_j ...]
//! price    = intercept + coefficients · features
//! ```
//!
//! The trait exists so the predictor can be exercised against stub models.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Artifact format understood by [`LinearPipeline`].
pub const LINEAR_PIPELINE_FORMAT: &str = "linear-pipeline/v1";

/// A single column of input features.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Categorical(Vec<String>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named columns of equal length (a tiny data frame).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Column)>,
}

impl FeatureFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = column,
            None => self.columns.push((name, column)),
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Number of rows, or an error if the columns disagree.
    pub fn n_rows(&self) -> Result<usize, InferenceError> {
        let mut rows: Option<usize> = None;
        for (name, col) in &self.columns {
            match rows {
                None => rows = Some(col.len()),
                Some(n) if n != col.len() => {
                    return Err(InferenceError::RaggedFrame {
                        column: name.clone(),
                        expected: n,
                        got: col.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(rows.unwrap_or(0))
    }
}

/// Anything that can turn a feature frame into predictions.
pub trait Pipeline: Send + Sync {
    /// Predict one value per row of `frame`.
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, InferenceError>;
}

/// Failures raised by a pipeline while predicting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("missing input column '{0}'")]
    MissingColumn(String),
    #[error("column '{column}' has the wrong type (expected {expected})")]
    ColumnType { column: String, expected: &'static str },
    #[error("column '{column}' has {got} rows, expected {expected}")]
    RaggedFrame { column: String, expected: usize, got: usize },
    #[error("found unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
    #[error("non-finite value in column '{0}'")]
    NonFiniteInput(String),
    #[error("model returned no predictions")]
    EmptyOutput,
    #[error("model returned a non-finite prediction ({0})")]
    NonFiniteOutput(f64),
    #[error("model panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

/// How the one-hot encoder treats categories it was not trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    Error,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalSpec {
    pub column: String,
    pub categories: Vec<String>,
    pub handle_unknown: HandleUnknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSpec {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// On-disk layout of a linear pipeline artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPipelineFile {
    pub format: String,
    #[serde(default)]
    pub target: Option<String>,
    pub categorical: CategoricalSpec,
    pub numeric: Vec<NumericSpec>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Why an artifact could not be turned into a pipeline.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open model artifact '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact '{path}' is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// One-hot + standardize + linear regression.
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    categorical: CategoricalSpec,
    category_index: HashMap<String, usize>,
    numeric: Vec<NumericSpec>,
    coefficients: DVector<f64>,
    intercept: f64,
}

impl LinearPipeline {
    /// Read and validate an artifact file.
    pub fn from_json_file(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let spec: LinearPipelineFile = serde_json::from_reader(file).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_file(spec)
    }

    /// Validate a deserialized artifact.
    pub fn from_file(spec: LinearPipelineFile) -> Result<Self, ArtifactError> {
        if spec.format != LINEAR_PIPELINE_FORMAT {
            return Err(ArtifactError::Invalid(format!(
                "unsupported format '{}' (expected '{LINEAR_PIPELINE_FORMAT}')",
                spec.format
            )));
        }

        let mut category_index = HashMap::with_capacity(spec.categorical.categories.len());
        for (idx, cat) in spec.categorical.categories.iter().enumerate() {
            if category_index.insert(cat.clone(), idx).is_some() {
                return Err(ArtifactError::Invalid(format!("duplicate category '{cat}'")));
            }
        }

        for n in &spec.numeric {
            if n.column == spec.categorical.column {
                return Err(ArtifactError::Invalid(format!(
                    "column '{}' is both categorical and numeric",
                    n.column
                )));
            }
            if !n.mean.is_finite() {
                return Err(ArtifactError::Invalid(format!("non-finite mean for '{}'", n.column)));
            }
            if !(n.scale.is_finite() && n.scale != 0.0) {
                return Err(ArtifactError::Invalid(format!(
                    "scale for '{}' must be finite and non-zero",
                    n.column
                )));
            }
        }

        let expected = spec.categorical.categories.len() + spec.numeric.len();
        if spec.coefficients.len() != expected {
            return Err(ArtifactError::Invalid(format!(
                "expected {expected} coefficients ({} categories + {} numeric), got {}",
                spec.categorical.categories.len(),
                spec.numeric.len(),
                spec.coefficients.len()
            )));
        }
        if !spec.intercept.is_finite() || spec.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid("non-finite coefficient".to_string()));
        }

        Ok(Self {
            categorical: spec.categorical,
            category_index,
            numeric: spec.numeric,
            coefficients: DVector::from_vec(spec.coefficients),
            intercept: spec.intercept,
        })
    }

    /// Categories the encoder was trained on.
    pub fn categories(&self) -> &[String] {
        &self.categorical.categories
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Build the encoded feature vector for one row.
    fn encode_row(
        &self,
        row: usize,
        categories: &[String],
        numerics: &[&[f64]],
    ) -> Result<DVector<f64>, InferenceError> {
        let mut x = DVector::zeros(self.n_features());
        let n_cat = self.categorical.categories.len();

        let value = &categories[row];
        match self.category_index.get(value) {
            Some(&idx) => x[idx] = 1.0,
            None => match self.categorical.handle_unknown {
                HandleUnknown::Ignore => {}
                HandleUnknown::Error => {
                    return Err(InferenceError::UnknownCategory {
                        column: self.categorical.column.clone(),
                        value: value.clone(),
                    });
                }
            },
        }

        for (j, (spec, col)) in self.numeric.iter().zip(numerics).enumerate() {
            let v = col[row];
            if !v.is_finite() {
                return Err(InferenceError::NonFiniteInput(spec.column.clone()));
            }
            x[n_cat + j] = (v - spec.mean) / spec.scale;
        }

        Ok(x)
    }
}

impl Pipeline for LinearPipeline {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, InferenceError> {
        let n_rows = frame.n_rows()?;

        let categories = match frame.column(&self.categorical.column) {
            Some(Column::Categorical(v)) => v,
            Some(Column::Numeric(_)) => {
                return Err(InferenceError::ColumnType {
                    column: self.categorical.column.clone(),
                    expected: "categorical",
                });
            }
            None => return Err(InferenceError::MissingColumn(self.categorical.column.clone())),
        };

        let mut numerics: Vec<&[f64]> = Vec::with_capacity(self.numeric.len());
        for spec in &self.numeric {
            match frame.column(&spec.column) {
                Some(Column::Numeric(v)) => numerics.push(v),
                Some(Column::Categorical(_)) => {
                    return Err(InferenceError::ColumnType {
                        column: spec.column.clone(),
                        expected: "numeric",
                    });
                }
                None => return Err(InferenceError::MissingColumn(spec.column.clone())),
            }
        }

        let mut out = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            let x = self.encode_row(row, categories, &numerics)?;
            out.push(self.intercept + self.coefficients.dot(&x));
        }
        Ok(out)
    }
}
