#![forbid(unsafe_code)]

pub mod action_client;
pub mod admin_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod domain_service;
pub mod error;
pub mod exam_runner;
pub mod navigator;
pub mod profile_service;

#[cfg(test)]
mod test_support;

pub use assess_core::Clock;

pub use action_client::{ActionApi, ActionConfig, HttpActionClient};
pub use admin_service::{AdminService, AdminStudentRow, RoundMarks, StatusLookup};
pub use auth_service::{AuthService, LoginResponse, RegistrationForm};
pub use dashboard_service::{
    ChecklistStatus, DashboardData, DashboardService, OnlineReport, ProfileSummary, ScoreSummary,
};
pub use domain_service::DomainService;
pub use error::{
    ActionError, AdminError, AuthError, DashboardError, DomainSelectError, ExamError,
    FormValidationError, ProfileError,
};
pub use exam_runner::ExamRunner;
pub use navigator::Navigator;
pub use profile_service::{ProfileForm, ProfileService};
