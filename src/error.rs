//! Ошибки предобработки

use std::path::PathBuf;

use thiserror::Error;

/// Исходная причина сбоя на любом шаге подготовки данных.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("missing column: {column}")]
    MissingColumn { column: String },

    #[error("column '{column}' has no non-missing values to learn from")]
    AllMissing { column: String },

    #[error("column '{column}' contains unknown category '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("column '{column}', row {row}: invalid value '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("invalid imputation strategy '{0}'")]
    InvalidStrategy(String),

    #[error("empty dataset")]
    EmptyDataset,

    #[error("{0} not fitted")]
    NotFitted(&'static str),

    #[error("shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl PrepError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn all_missing(column: impl Into<String>) -> Self {
        Self::AllMissing {
            column: column.into(),
        }
    }

    /// Оборачивает ошибку меткой операции, на которой она возникла.
    pub fn in_operation(self, operation: &'static str) -> TransformationError {
        TransformationError {
            operation,
            source: self,
        }
    }
}

/// Единственный тип ошибки на публичной границе: причина + операция.
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct TransformationError {
    pub operation: &'static str,
    #[source]
    pub source: PrepError,
}

impl TransformationError {
    pub fn is_missing_column(&self) -> bool {
        matches!(self.source, PrepError::MissingColumn { .. })
    }
}

pub trait ResultExt<T> {
    fn in_operation(self, operation: &'static str) -> Result<T, TransformationError>;
}

impl<T> ResultExt<T> for Result<T, PrepError> {
    fn in_operation(self, operation: &'static str) -> Result<T, TransformationError> {
        self.map_err(|e| e.in_operation(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_operation_label_and_cause_are_kept() {
        let result: Result<(), PrepError> = Err(PrepError::missing_column("math_score"));
        let err = result.in_operation("fit").unwrap_err();

        assert_eq!(err.operation, "fit");
        assert!(err.is_missing_column());
        assert_eq!(err.to_string(), "fit failed: missing column: math_score");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("missing column: math_score".to_string())
        );
    }
}
