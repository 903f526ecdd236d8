//! Error types.
//!
//! - `ConfrontError`: typed failures of the confrontation library (units,
//!   estimator inputs, alignment, degenerate statistics)
//! - `AppError`: what the `confront` binary reports, carrying a process exit code

use thiserror::Error;

/// Failures raised by the confrontation core and its collaborators.
///
/// None of these are transient; callers should surface them rather than retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfrontError {
    #[error("Variable is in units of [{from}], you asked for [{to}] but no conversion is known")]
    UnknownUnit { from: String, to: String },

    #[error("Dimension mismatch: model has {model} values, obs has {obs}, weights has {weights}")]
    DimensionMismatch {
        model: usize,
        obs: usize,
        weights: usize,
    },

    #[error("Model and observation series are not comparable: {0}")]
    Alignment(String),

    #[error("Degenerate variance: {0} has zero spread")]
    DegenerateVariance(String),

    #[error("No usable samples: {0}")]
    EmptySeries(String),

    #[error("None of the requested variables are available: {}", .requested.join(", "))]
    MissingVariable { requested: Vec<String> },

    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

pub type Result<T> = std::result::Result<T, ConfrontError>;

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

impl From<ConfrontError> for AppError {
    fn from(err: ConfrontError) -> Self {
        // 2 = input/configuration, 3 = no usable or incomparable data, 4 = computation.
        let exit_code = match &err {
            ConfrontError::UnknownUnit { .. }
            | ConfrontError::MissingVariable { .. }
            | ConfrontError::InvalidSeries(_) => 2,
            ConfrontError::Alignment(_) | ConfrontError::EmptySeries(_) => 3,
            ConfrontError::DimensionMismatch { .. } | ConfrontError::DegenerateVariance(_) => 4,
        };
        Self::new(exit_code, err.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_unit_message_names_both_units() {
        let err = ConfrontError::UnknownUnit {
            from: "1e-6".to_string(),
            to: "furlongs".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[1e-6]"));
        assert!(msg.contains("[furlongs]"));
    }

    #[test]
    fn exit_codes_follow_error_class() {
        let unit: AppError = ConfrontError::UnknownUnit {
            from: "a".to_string(),
            to: "b".to_string(),
        }
        .into();
        assert_eq!(unit.exit_code(), 2);

        let align: AppError = ConfrontError::Alignment("shifted".to_string()).into();
        assert_eq!(align.exit_code(), 3);

        let dims: AppError = ConfrontError::DimensionMismatch {
            model: 1,
            obs: 2,
            weights: 3,
        }
        .into();
        assert_eq!(dims.exit_code(), 4);
    }
}
