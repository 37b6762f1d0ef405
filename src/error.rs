//! Process-level error type.
//!
//! Library modules return their own `thiserror` enums. Everything that reaches
//! `main` is folded into an `AppError`, which carries the exit code the batch
//! tooling keys off (0 = success, 1 = any resolution/validation failure).

use crate::check::CheckError;
use crate::config::ConfigError;
use crate::data::{DasError, ResolveError};
use crate::io::{ListError, RewriteError, SampleConfigError};
use crate::jobs::{GroupError, ManifestError};

/// Exit code used for every resolution/validation failure.
pub const EXIT_FAILURE: u8 = 1;

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

    /// Shorthand for the common exit-code-1 failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(EXIT_FAILURE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
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

macro_rules! failure_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for AppError {
                fn from(err: $ty) -> Self {
                    AppError::failure(format!("Error: {err}"))
                }
            }
        )+
    };
}

failure_from!(
    CheckError,
    ConfigError,
    DasError,
    GroupError,
    ManifestError,
    ListError,
    ResolveError,
    RewriteError,
    SampleConfigError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_errors_map_to_exit_code_one() {
        let err: AppError = GroupError::ZeroGroupSize.into();
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(err.message().contains("group size"));
    }
}
