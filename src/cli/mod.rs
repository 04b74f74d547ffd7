//! Command-line parsing for the house price estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the prediction code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{BATH_BOUNDS, BHK_BOUNDS, SQFT_BOUNDS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hpp", version, about = "Bengaluru House Price Predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui(ModelArgs),
    /// Predict a single price and print the estimate.
    Predict(PredictArgs),
    /// List the locations accepted by the model.
    Locations(ModelArgs),
}

/// Where to load the model and location list from.
#[derive(Debug, Args, Clone, Default)]
pub struct ModelArgs {
    /// Model pipeline artifact (JSON). Overrides HPP_MODEL_PATH.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// JSON array of location names. Overrides HPP_LOCATIONS_PATH.
    #[arg(long, value_name = "JSON")]
    pub locations: Option<PathBuf>,
}

/// Inputs for a single prediction.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Location (must be one of `hpp locations`).
    #[arg(short = 'l', long)]
    pub location: String,

    /// Total area in square feet (100-2200).
    #[arg(long, default_value_t = SQFT_BOUNDS.default)]
    pub sqft: f64,

    /// Number of bedrooms (1-10).
    #[arg(long, default_value_t = BHK_BOUNDS.default as u32)]
    pub bhk: u32,

    /// Number of bathrooms (1-10).
    #[arg(long, default_value_t = BATH_BOUNDS.default as u32)]
    pub bath: u32,

    /// Write the estimate to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_defaults() {
        let cli = Cli::parse_from(["hpp", "predict", "-l", "Hebbal"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.location, "Hebbal");
        assert_eq!(args.sqft, 1000.0);
        assert_eq!(args.bhk, 2);
        assert_eq!(args.bath, 2);
        assert!(args.model.model.is_none());
    }

    #[test]
    fn tui_accepts_model_override() {
        let cli = Cli::parse_from(["hpp", "tui", "--model", "m.json"]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!(args.model, Some(PathBuf::from("m.json")));
    }
}
