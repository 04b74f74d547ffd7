//! Top-level application error.
//!
//! Module errors (`LoadError`, `RequestError`, ...) are converted into an
//! `AppError` at the command boundary; `main` prints the message and exits
//! with the carried code.

use crate::domain::RequestError;
use crate::models::store::LoadError;

/// Generic failure.
pub const EXIT_FAILURE: u8 = 1;
/// Bad input or unusable model/data files.
pub const EXIT_INPUT: u8 = 2;
/// Terminal or output I/O failure.
pub const EXIT_IO: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(value: LoadError) -> Self {
        AppError::new(
            EXIT_INPUT,
            format!(
                "Error loading model or data: {value}\nFailed to load necessary components. Please check the model and data files."
            ),
        )
    }
}

impl From<RequestError> for AppError {
    fn from(value: RequestError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid input: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_is_blocking_input_error() {
        let err = AppError::from(LoadError::new("missing file"));
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().starts_with("Error loading model or data: missing file"));
        assert!(err.to_string().contains("Please check the model and data files."));
    }
}
