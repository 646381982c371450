use thiserror::Error;

use crate::deal::{DealField, DealId};

/// Shared result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid deal fields: {}", field_list(.fields))]
    Validation { fields: Vec<DealField> },
    #[error("deal {0} not found")]
    NotFound(DealId),
    #[error("unknown stage id `{0}`")]
    InvalidStage(String),
    #[error("invalid value `{value}` for {key}")]
    Config { key: String, value: String },
    #[error("unreadable replay script: {0}")]
    Script(String),
}

impl PipelineError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Validation { .. } => "VALIDATION",
            PipelineError::NotFound(_) => "NOT_FOUND",
            PipelineError::InvalidStage(_) => "INVALID_STAGE",
            PipelineError::Config { .. } => "CONFIG",
            PipelineError::Script(_) => "SCRIPT",
        }
    }

    /// Whether the caller can recover by re-prompting or refreshing its view.
    ///
    /// `InvalidStage` means the caller offered a stage outside the registry,
    /// which is a bug in the caller rather than bad user input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation { .. } | PipelineError::NotFound(_)
        )
    }

    pub fn validation(fields: Vec<DealField>) -> Self {
        Self::Validation { fields }
    }

    pub fn invalid_stage(raw: impl Into<String>) -> Self {
        Self::InvalidStage(raw.into())
    }
}

fn field_list(fields: &[DealField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_every_field() {
        let err = PipelineError::validation(vec![DealField::Title, DealField::Value]);
        assert_eq!(err.to_string(), "invalid deal fields: title, value");
        assert_eq!(err.code(), "VALIDATION");
        assert!(err.is_recoverable());
    }

    #[test]
    fn invalid_stage_is_not_recoverable() {
        let err = PipelineError::invalid_stage("won");
        assert_eq!(err.code(), "INVALID_STAGE");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("`won`"));
    }

    #[test]
    fn not_found_mentions_id() {
        let err = PipelineError::NotFound(DealId::new(7));
        assert_eq!(err.to_string(), "deal 7 not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
