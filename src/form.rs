//! The property details form.
//!
//! Holds the four inputs with their declared bounds. Every mutation clamps
//! into range, so [`InputForm::request`] only fails if the location set does
//! not contain the selected name (which cannot happen for a form built from
//! that set).

use crate::domain::{
    BATH_BOUNDS, BHK_BOUNDS, FieldBounds, LocationSet, PredictionRequest, RequestError, SQFT_BOUNDS,
};

/// Arrow-key step for the area field.
pub const SQFT_STEP: f64 = 50.0;

/// Form fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Location,
    TotalSqft,
    Bhk,
    Bath,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Location, Field::TotalSqft, Field::Bhk, Field::Bath];

    pub fn label(self) -> &'static str {
        match self {
            Field::Location => "Select Location",
            Field::TotalSqft => "Total Square Feet",
            Field::Bhk => "Number of Bedrooms (BHK)",
            Field::Bath => "Number of Bathrooms",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Field::Location => "Choose the area where you want to buy a house",
            Field::TotalSqft => "Enter the total area in square feet",
            Field::Bhk => "Enter the number of bedrooms",
            Field::Bath => "Enter the number of bathrooms",
        }
    }

    /// Bounds for numeric fields.
    pub fn bounds(self) -> Option<FieldBounds> {
        match self {
            Field::Location => None,
            Field::TotalSqft => Some(SQFT_BOUNDS),
            Field::Bhk => Some(BHK_BOUNDS),
            Field::Bath => Some(BATH_BOUNDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputForm {
    locations: LocationSet,
    location_idx: usize,
    total_sqft: f64,
    bhk: u32,
    bath: u32,
}

impl InputForm {
    pub fn new(locations: LocationSet) -> Self {
        Self {
            locations,
            location_idx: 0,
            total_sqft: SQFT_BOUNDS.default,
            bhk: BHK_BOUNDS.default as u32,
            bath: BATH_BOUNDS.default as u32,
        }
    }

    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    pub fn location(&self) -> &str {
        self.locations.get(self.location_idx).unwrap_or_default()
    }

    pub fn total_sqft(&self) -> f64 {
        self.total_sqft
    }

    pub fn bhk(&self) -> u32 {
        self.bhk
    }

    pub fn bath(&self) -> u32 {
        self.bath
    }

    /// Select a location by name. Unknown names leave the selection unchanged.
    pub fn select_location(&mut self, name: &str) -> bool {
        match self.locations.position(name) {
            Some(idx) => {
                self.location_idx = idx;
                true
            }
            None => false,
        }
    }

    pub fn set_total_sqft(&mut self, value: f64) {
        self.total_sqft = SQFT_BOUNDS.clamp(value);
    }

    pub fn set_bhk(&mut self, value: u32) {
        self.bhk = BHK_BOUNDS.clamp(value as f64) as u32;
    }

    pub fn set_bath(&mut self, value: u32) {
        self.bath = BATH_BOUNDS.clamp(value as f64) as u32;
    }

    /// Set a numeric field from typed text. Returns `false` if it does not parse.
    pub fn set_from_text(&mut self, field: Field, text: &str) -> bool {
        let Ok(value) = text.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        match field {
            Field::Location => return false,
            Field::TotalSqft => self.set_total_sqft(value.round()),
            Field::Bhk => self.set_bhk(value.round().max(0.0) as u32),
            Field::Bath => self.set_bath(value.round().max(0.0) as u32),
        }
        true
    }

    /// Step a field up (`delta > 0`) or down. Locations wrap around.
    pub fn step(&mut self, field: Field, delta: i32) {
        match field {
            Field::Location => {
                let n = self.locations.len() as i64;
                if n > 0 {
                    let idx = (self.location_idx as i64 + delta as i64).rem_euclid(n);
                    self.location_idx = idx as usize;
                }
            }
            Field::TotalSqft => self.set_total_sqft(self.total_sqft + SQFT_STEP * delta as f64),
            Field::Bhk => self.set_bhk(self.bhk.saturating_add_signed(delta)),
            Field::Bath => self.set_bath(self.bath.saturating_add_signed(delta)),
        }
    }

    /// Display value of a field.
    pub fn value_text(&self, field: Field) -> String {
        match field {
            Field::Location => self.location().to_string(),
            Field::TotalSqft => format!("{:.0}", self.total_sqft),
            Field::Bhk => self.bhk.to_string(),
            Field::Bath => self.bath.to_string(),
        }
    }

    pub fn request(&self) -> Result<PredictionRequest, RequestError> {
        PredictionRequest::new(
            self.location(),
            self.total_sqft,
            self.bath,
            self.bhk,
            &self.locations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_bounds() {
        let form = InputForm::new(LocationSet::default());
        let req = form.request().unwrap();
        assert_eq!(req.location(), "Whitefield");
        assert_eq!(req.total_sqft(), 1000.0);
        assert_eq!(req.bhk().get(), 2);
        assert_eq!(req.bath(), 2);
    }

    #[test]
    fn steps_clamp_into_range() {
        let mut form = InputForm::new(LocationSet::default());
        for _ in 0..20 {
            form.step(Field::Bhk, -1);
            form.step(Field::Bath, 1);
        }
        assert_eq!(form.bhk(), 1);
        assert_eq!(form.bath(), 10);

        for _ in 0..100 {
            form.step(Field::TotalSqft, 1);
        }
        assert_eq!(form.total_sqft(), 2200.0);
        assert!(form.request().is_ok());
    }

    #[test]
    fn location_step_wraps() {
        let mut form = InputForm::new(LocationSet::default());
        form.step(Field::Location, -1);
        assert_eq!(form.location(), "Electronic City Phase II");
        form.step(Field::Location, 1);
        assert_eq!(form.location(), "Whitefield");
        assert!(form.select_location("Hebbal"));
        assert!(!form.select_location("Atlantis"));
        assert_eq!(form.location(), "Hebbal");
    }

    #[test]
    fn typed_values_are_clamped() {
        let mut form = InputForm::new(LocationSet::default());
        assert!(form.set_from_text(Field::TotalSqft, "5000"));
        assert_eq!(form.total_sqft(), 2200.0);
        assert!(form.set_from_text(Field::Bhk, "0"));
        assert_eq!(form.bhk(), 1);
        assert!(!form.set_from_text(Field::Bath, "abc"));
        assert_eq!(form.bath(), 2);
    }
}
