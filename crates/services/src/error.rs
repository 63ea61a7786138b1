//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::exam::ExamSessionError;

/// Errors from the single-action HTTP contract.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned a non-JSON body")]
    InvalidBody,

    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// The service answered with `status: "notfound"`.
    #[error("{message}")]
    NotFound { message: String },

    /// The service answered with `status: "error"` (or an unknown status).
    #[error("{message}")]
    Service { message: String },
}

/// First failing check of a submitted form, mirroring the order the
/// original forms validated in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("select at least one interest area")]
    NoInterestSelected,

    #[error("describe the projects you have done")]
    MissingProjectsDescription,
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] FormValidationError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] FormValidationError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors emitted by `DomainService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DomainSelectError {
    #[error("domain {domain:?} is not offered in the {category} track")]
    NotInCatalog {
        category: assess_core::model::DomainCategory,
        domain: String,
    },
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors emitted by the exam runner, split along the load/submit boundary
/// because recovery differs: a load failure is terminal for the attempt,
/// a submission failure parks the session with its answers intact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for this test")]
    EmptyQuestionSet,

    #[error("question fetch failed")]
    Load(#[source] ActionError),

    #[error("submission failed")]
    Submission(#[source] ActionError),

    #[error(transparent)]
    Session(#[from] ExamSessionError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("enter a valid phone number")]
    InvalidPhone,
    #[error("cannot grade {0} through the panel; it is scored by the service")]
    NotGradable(assess_core::model::Stage),
    #[error("marks must be between 0 and 100, got {0}")]
    MarksOutOfRange(u8),
    #[error(transparent)]
    Action(#[from] ActionError),
}
