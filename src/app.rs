//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments and resolves configuration
//! - loads the model once
//! - dispatches to the TUI or prints an estimate

use std::path::Path;

use clap::Parser;
use log::info;

use crate::cli::{Command, ModelArgs, PredictArgs};
use crate::config::AppConfig;
use crate::domain::PredictionRequest;
use crate::error::{AppError, EXIT_FAILURE};
use crate::models::store::{ArtifactLoader, ModelStore};

pub mod estimate;

use estimate::Estimate;

/// Entry point for the `hpp` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `hpp` and `hpp --model m.json` behave like `hpp tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Predict(args) => handle_predict(args),
        Command::Locations(args) => handle_locations(args),
    }
}

fn init_logging() {
    // Defaults to warnings only so log lines do not clobber the TUI.
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Build the process-wide model store from configuration and CLI overrides.
pub fn model_store(args: &ModelArgs) -> ModelStore {
    let config = AppConfig::from_env().with_overrides(args.model.clone(), args.locations.clone());
    info!("model artifact: {}", config.model_path.display());
    ModelStore::new(ArtifactLoader::new(config.model_path, config.locations_path))
}

fn handle_tui(args: ModelArgs) -> Result<(), AppError> {
    let store = model_store(&args);
    // A load failure is fatal for the session: report it before touching the terminal.
    let model = store.load()?;
    crate::tui::run(model)
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let store = model_store(&args.model);
    let model = store.load()?;

    let request = PredictionRequest::new(&args.location, args.sqft, args.bath, args.bhk, &model.locations)?;
    let estimate = estimate::run_estimate(&request, &model);

    println!("{}", crate::report::format_estimate(&estimate));
    finish_predict(&estimate, args.export.as_deref())
}

/// Turn the estimate outcome into the command result, exporting on success only.
///
/// The inference error is reported once, through the returned `AppError`.
fn finish_predict(estimate: &Estimate, export: Option<&Path>) -> Result<(), AppError> {
    if let Err(err) = &estimate.outcome {
        return Err(AppError::new(EXIT_FAILURE, crate::report::format_inference_error(err)));
    }
    if let Some(path) = export {
        crate::io::export::write_estimate_json(path, estimate)?;
        info!("wrote estimate to {}", path.display());
    }
    Ok(())
}

fn handle_locations(args: ModelArgs) -> Result<(), AppError> {
    let store = model_store(&args);
    let model = store.load()?;
    for name in model.locations.names() {
        println!("{name}");
    }
    Ok(())
}

/// Rewrite argv so `hpp` defaults to `hpp tui`.
///
/// Rules:
/// - `hpp`                      -> `hpp tui`
/// - `hpp --model m.json ...`   -> `hpp tui --model m.json ...`
/// - `hpp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "locations");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocationSet;
    use crate::models::pipeline::InferenceError;
    use crate::report::PriceReport;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(args(&["hpp"])), args(&["hpp", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(args(&["hpp", "--model", "m.json"])),
            args(&["hpp", "tui", "--model", "m.json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(args(&["hpp", "predict", "-l", "Hebbal"])),
            args(&["hpp", "predict", "-l", "Hebbal"])
        );
        assert_eq!(rewrite_args(args(&["hpp", "--help"])), args(&["hpp", "--help"]));
    }

    fn estimate(outcome: Result<f64, InferenceError>) -> Estimate {
        let request = PredictionRequest::new("Hebbal", 1000.0, 2, 2, &LocationSet::default()).unwrap();
        Estimate {
            outcome: outcome.map(|p| PriceReport::new(p, &request)),
            request,
            advisories: Vec::new(),
        }
    }

    #[test]
    fn failed_prediction_with_export_reports_inference_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimate.json");
        let failed = estimate(Err(InferenceError::UnknownCategory {
            column: "location".to_string(),
            value: "Hebbal".to_string(),
        }));

        let err = finish_predict(&failed, Some(&path)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert_eq!(
            err.to_string(),
            "Error making prediction: found unknown category 'Hebbal' in column 'location'"
        );
        assert!(!path.exists());
    }

    #[test]
    fn successful_prediction_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimate.json");
        finish_predict(&estimate(Ok(85.0)), Some(&path)).unwrap();
        assert!(path.exists());
        assert!(finish_predict(&estimate(Ok(85.0)), None).is_ok());
    }
}
