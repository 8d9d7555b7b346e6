use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertifyError {
    #[error("not initialized: run 'certify init'")]
    NotInitialized,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field '{field}' belongs to step '{owner}', not '{step}'")]
    FieldNotOwned {
        field: String,
        owner: String,
        step: String,
    },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("step validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("wizard is closed ({0}); start a new one")]
    WizardClosed(String),

    #[error("no wizard in progress: run 'certify wizard start'")]
    NoWizard,

    #[error("invalid step: {0}")]
    InvalidStep(String),

    #[error("invalid tab: {0}")]
    InvalidTab(String),

    #[error("invalid storage key '{0}': must be alphanumeric with '-', '_' or '.'")]
    InvalidKey(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("contact submission already in flight")]
    SubmissionInFlight,

    #[error("contact form already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CertifyError>;
