//! Error types.
//!
//! Only malformed input reaches the caller as an error. Infeasible
//! requirements, search timeouts and insufficient diversity are recovered
//! inside the optimizer and surface as unplaced records, suggestions and
//! log lines instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Failure of an optimize call.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The request references unknown ids or is otherwise malformed.
    #[error("invalid optimization input ({} problem(s)): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),
}

impl OptimizeError {
    /// Validation errors carried by this error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            OptimizeError::Validation(errors) => errors,
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_message_lists_all_errors() {
        let err = OptimizeError::Validation(vec![
            ValidationError::new(ValidationErrorKind::UnknownFaculty, "unknown faculty 'F9'"),
            ValidationError::new(ValidationErrorKind::DuplicateId, "duplicate slot id '1'"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 problem(s)"));
        assert!(msg.contains("unknown faculty 'F9'"));
        assert!(msg.contains("duplicate slot id '1'"));
        assert_eq!(err.validation_errors().len(), 2);
    }
}
