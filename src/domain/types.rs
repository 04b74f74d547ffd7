//! Shared domain types.
//!
//! These types are intentionally kept small so they can be:
//!
//! - built from the TUI form or from CLI flags
//! - handed to the predictor without further checks
//! - exported to JSON alongside the estimate

use std::fs::File;
use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bounds (and default) for a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FieldBounds {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

/// Total area in square feet.
pub const SQFT_BOUNDS: FieldBounds = FieldBounds { min: 100.0, max: 2200.0, default: 1000.0 };

/// Bedroom count (BHK).
pub const BHK_BOUNDS: FieldBounds = FieldBounds { min: 1.0, max: 10.0, default: 2.0 };

/// Bathroom count.
pub const BATH_BOUNDS: FieldBounds = FieldBounds { min: 1.0, max: 10.0, default: 2.0 };

/// Locations the bundled pipeline was trained on (most frequent areas first).
pub const DEFAULT_LOCATIONS: [&str; 14] = [
    "Whitefield",
    "Electronic City",
    "Kanakpura Road",
    "Thanisandra",
    "Yelahanka",
    "Uttarahalli",
    "Hebbal",
    "Marathahalli",
    "Raja Rajeshwari Nagar",
    "Bannerghatta Road",
    "Hennur Road",
    "7th Phase JP Nagar",
    "Haralur Road",
    "Electronic City Phase II",
];

/// Ordered set of location names offered by the form.
///
/// The list is configuration: it is not derived from the model, and may be
/// replaced with a JSON array of strings when the trained categories change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LocationSet {
    names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationSetError {
    #[error("location list is empty")]
    Empty,
    #[error("duplicate location '{0}'")]
    Duplicate(String),
    #[error("blank location name at position {0}")]
    Blank(usize),
}

impl LocationSet {
    pub fn new(names: Vec<String>) -> Result<Self, LocationSetError> {
        if names.is_empty() {
            return Err(LocationSetError::Empty);
        }
        for (idx, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(LocationSetError::Blank(idx));
            }
            if names[..idx].contains(name) {
                return Err(LocationSetError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Read a JSON array of location names.
    pub fn from_json_file(path: &Path) -> Result<Self, LocationFileError> {
        let file = File::open(path).map_err(|source| LocationFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let set: LocationSet = serde_json::from_reader(file).map_err(|source| LocationFileError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(set)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

impl Default for LocationSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for LocationSet {
    type Error = LocationSetError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationSet> for Vec<String> {
    fn from(value: LocationSet) -> Self {
        value.names
    }
}

#[derive(Debug, Error)]
pub enum LocationFileError {
    #[error("failed to open location file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid location file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a set of raw inputs could not become a [`PredictionRequest`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// A fully checked set of inputs for one prediction.
///
/// All four fields are present and inside their declared bounds, and the
/// location belongs to the active [`LocationSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    location: String,
    total_sqft: f64,
    bath: u32,
    bhk: NonZeroU32,
}

impl PredictionRequest {
    pub fn new(
        location: &str,
        total_sqft: f64,
        bath: u32,
        bhk: u32,
        locations: &LocationSet,
    ) -> Result<Self, RequestError> {
        if !locations.contains(location) {
            return Err(RequestError::UnknownLocation(location.to_string()));
        }
        check_range("total_sqft", total_sqft, &SQFT_BOUNDS)?;
        check_range("bath", bath as f64, &BATH_BOUNDS)?;
        check_range("bhk", bhk as f64, &BHK_BOUNDS)?;

        let bhk = NonZeroU32::new(bhk).ok_or(RequestError::OutOfRange {
            field: "bhk",
            value: 0.0,
            min: BHK_BOUNDS.min,
            max: BHK_BOUNDS.max,
        })?;

        Ok(Self {
            location: location.to_string(),
            total_sqft,
            bath,
            bhk,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn total_sqft(&self) -> f64 {
        self.total_sqft
    }

    pub fn bath(&self) -> u32 {
        self.bath
    }

    pub fn bhk(&self) -> NonZeroU32 {
        self.bhk
    }
}

fn check_range(field: &'static str, value: f64, bounds: &FieldBounds) -> Result<(), RequestError> {
    if bounds.contains(value) {
        return Ok(());
    }
    Err(RequestError::OutOfRange {
        field,
        value,
        min: bounds.min,
        max: bounds.max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locations_are_ordered_and_unique() {
        let set = LocationSet::default();
        assert_eq!(set.len(), 14);
        assert_eq!(set.get(0), Some("Whitefield"));
        assert_eq!(set.get(13), Some("Electronic City Phase II"));
        assert!(LocationSet::new(set.names().to_vec()).is_ok());
    }

    #[test]
    fn location_set_rejects_duplicates_and_empty() {
        assert_eq!(LocationSet::new(vec![]), Err(LocationSetError::Empty));
        let dup = LocationSet::new(vec!["Hebbal".to_string(), "Hebbal".to_string()]);
        assert_eq!(dup, Err(LocationSetError::Duplicate("Hebbal".to_string())));
    }

    #[test]
    fn location_set_parses_json_array() {
        let set: LocationSet = serde_json::from_str(r#"["Hebbal", "Yelahanka"]"#).unwrap();
        assert_eq!(set.names(), ["Hebbal", "Yelahanka"]);
        assert!(serde_json::from_str::<LocationSet>("[]").is_err());
    }

    #[test]
    fn request_accepts_bounds_inclusive() {
        let set = LocationSet::default();
        assert!(PredictionRequest::new("Hebbal", 100.0, 1, 1, &set).is_ok());
        assert!(PredictionRequest::new("Hebbal", 2200.0, 10, 10, &set).is_ok());
    }

    #[test]
    fn request_rejects_out_of_range_and_unknown_location() {
        let set = LocationSet::default();
        assert!(matches!(
            PredictionRequest::new("Hebbal", 1000.0, 2, 0, &set),
            Err(RequestError::OutOfRange { field: "bhk", .. })
        ));
        assert!(matches!(
            PredictionRequest::new("Hebbal", 99.0, 2, 2, &set),
            Err(RequestError::OutOfRange { field: "total_sqft", .. })
        ));
        assert!(matches!(
            PredictionRequest::new("Hebbal", f64::NAN, 2, 2, &set),
            Err(RequestError::OutOfRange { field: "total_sqft", .. })
        ));
        assert_eq!(
            PredictionRequest::new("Atlantis", 1000.0, 2, 2, &set),
            Err(RequestError::UnknownLocation("Atlantis".to_string()))
        );
    }

    #[test]
    fn bounds_clamp_falls_back_to_default_for_nan() {
        assert_eq!(SQFT_BOUNDS.clamp(50.0), 100.0);
        assert_eq!(SQFT_BOUNDS.clamp(5000.0), 2200.0);
        assert_eq!(SQFT_BOUNDS.clamp(f64::NAN), 1000.0);
    }
}
