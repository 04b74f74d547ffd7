//! `house-price-predictor` library crate.
//!
//! The binary (`hpp`) is a thin wrapper around this library so that:
//!
//! - the load -> validate -> predict -> format flow is testable without a terminal
//! - the TUI and the `predict` subcommand share one implementation

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod form;
pub mod io;
pub mod models;
pub mod predict;
pub mod report;
pub mod tui;
pub mod validate;
