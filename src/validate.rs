//! Advisory sanity checks on the form inputs.
//!
//! These never block a prediction; they only surface a warning next to it.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::domain::PredictionRequest;

/// Minimum plausible area per bedroom (square feet).
pub const MIN_SQFT_PER_BHK: f64 = 200.0;

/// How many bathrooms beyond the bedroom count are considered plausible.
pub const MAX_EXTRA_BATHS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    BathroomsExceedBedrooms,
    LowAreaPerBedroom,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::BathroomsExceedBedrooms => {
                "Having bathrooms more than BHK+2 is unusual. Are you sure?"
            }
            Advisory::LowAreaPerBedroom => {
                "The square feet per bedroom seems to be very low. Please verify the input."
            }
        }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Run both ratio checks on raw values.
pub fn advisories(bath: u32, bhk: NonZeroU32, total_sqft: f64) -> Vec<Advisory> {
    let mut out = Vec::new();
    if bath > bhk.get().saturating_add(MAX_EXTRA_BATHS) {
        out.push(Advisory::BathroomsExceedBedrooms);
    }
    if total_sqft / (bhk.get() as f64) < MIN_SQFT_PER_BHK {
        out.push(Advisory::LowAreaPerBedroom);
    }
    out
}

/// Run both ratio checks on a checked request.
pub fn check(request: &PredictionRequest) -> Vec<Advisory> {
    advisories(request.bath(), request.bhk(), request.total_sqft())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn nz(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    #[rstest]
    #[case(2, 2, false)]
    #[case(4, 2, false)]
    #[case(5, 2, true)]
    #[case(3, 1, false)]
    #[case(4, 1, true)]
    #[case(10, 8, false)]
    #[case(10, 7, true)]
    fn bathroom_warning_iff_bath_exceeds_bhk_plus_two(
        #[case] bath: u32,
        #[case] bhk: u32,
        #[case] expected: bool,
    ) {
        let got = advisories(bath, nz(bhk), 2000.0).contains(&Advisory::BathroomsExceedBedrooms);
        assert_eq!(got, expected);
    }

    #[rstest]
    #[case(1000.0, 2, false)]
    #[case(400.0, 2, false)]
    #[case(399.0, 2, true)]
    #[case(199.0, 1, true)]
    #[case(200.0, 1, false)]
    #[case(1999.0, 10, true)]
    fn area_warning_iff_sqft_per_bhk_below_200(
        #[case] sqft: f64,
        #[case] bhk: u32,
        #[case] expected: bool,
    ) {
        let got = advisories(1, nz(bhk), sqft).contains(&Advisory::LowAreaPerBedroom);
        assert_eq!(got, expected);
    }

    #[test]
    fn exhaustive_small_grid_matches_rules() {
        for bhk in 1..=10u32 {
            for bath in 1..=10u32 {
                for sqft in (100..=2200).step_by(50) {
                    let sqft = sqft as f64;
                    let got = advisories(bath, nz(bhk), sqft);
                    assert_eq!(got.contains(&Advisory::BathroomsExceedBedrooms), bath > bhk + 2);
                    assert_eq!(got.contains(&Advisory::LowAreaPerBedroom), sqft / (bhk as f64) < 200.0);
                }
            }
        }
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            Advisory::BathroomsExceedBedrooms.to_string(),
            "Having bathrooms more than BHK+2 is unusual. Are you sure?"
        );
    }
}
