use serde::{Deserialize, Serialize};

use crate::model::catalog::DomainCategory;
use crate::model::ids::StudentId;

/// Progress checkpoints a student moves through, as percentages.
///
/// The service reports progress as one of these values; the client never
/// invents intermediate ones.
pub mod progress {
    /// Account exists, nothing else done.
    pub const REGISTERED: u8 = 0;
    /// Profile questionnaire submitted.
    pub const PROFILE_DONE: u8 = 20;
    /// Domain/role chosen.
    pub const DOMAIN_CHOSEN: u8 = 30;
    /// Both timed online tests submitted.
    pub const ONLINE_TESTS_DONE: u8 = 60;
    /// All five assessment stages graded.
    pub const ALL_STAGES_DONE: u8 = 100;
}

/// The authenticated student's record, held by the session store and
/// persisted across restarts.
///
/// One instance exists per signed-in session. Mutation goes through
/// [`UserRecord::merge`], which folds in partial updates; progress never
/// moves backward within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    student_id: StudentId,
    name: String,
    email: String,
    profile_completed: bool,
    progress_percent: u8,
    selected_category: Option<DomainCategory>,
    selected_domain: Option<String>,
}

impl UserRecord {
    /// Builds the record produced by a successful login or registration.
    #[must_use]
    pub fn new(
        student_id: StudentId,
        name: impl Into<String>,
        email: impl Into<String>,
        profile_completed: bool,
        progress_percent: u8,
    ) -> Self {
        Self {
            student_id,
            name: name.into(),
            email: email.into(),
            profile_completed,
            progress_percent,
            selected_category: None,
            selected_domain: None,
        }
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn profile_completed(&self) -> bool {
        self.profile_completed
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    #[must_use]
    pub fn selected_category(&self) -> Option<DomainCategory> {
        self.selected_category
    }

    #[must_use]
    pub fn selected_domain(&self) -> Option<&str> {
        self.selected_domain.as_deref()
    }

    /// True once a domain has been chosen (checkpoint reached).
    #[must_use]
    pub fn domain_chosen(&self) -> bool {
        self.progress_percent >= progress::DOMAIN_CHOSEN
    }

    /// Folds a partial update into the record.
    ///
    /// `progress_percent` is monotonic: a lower incoming value is ignored,
    /// so a stale response can never rewind a stage the student already
    /// completed.
    pub fn merge(&mut self, update: UserUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(done) = update.profile_completed {
            self.profile_completed = done;
        }
        if let Some(pct) = update.progress_percent {
            self.progress_percent = self.progress_percent.max(pct);
        }
        if let Some(category) = update.selected_category {
            self.selected_category = Some(category);
        }
        if let Some(domain) = update.selected_domain {
            self.selected_domain = Some(domain);
        }
    }
}

/// Partial update merged into a [`UserRecord`] after a successful round
/// trip to the service. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_completed: Option<bool>,
    pub progress_percent: Option<u8>,
    pub selected_category: Option<DomainCategory>,
    pub selected_domain: Option<String>,
}

impl UserUpdate {
    /// Update applied after the profile questionnaire is accepted.
    #[must_use]
    pub fn profile_saved(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            profile_completed: Some(true),
            progress_percent: Some(progress::PROFILE_DONE),
            ..Self::default()
        }
    }

    /// Update applied after a domain/role selection is accepted.
    #[must_use]
    pub fn domain_chosen(category: DomainCategory, domain: impl Into<String>) -> Self {
        Self {
            profile_completed: Some(true),
            progress_percent: Some(progress::DOMAIN_CHOSEN),
            selected_category: Some(category),
            selected_domain: Some(domain.into()),
            ..Self::default()
        }
    }

    /// Update applied once both timed tests have been submitted.
    #[must_use]
    pub fn online_tests_done() -> Self {
        Self {
            progress_percent: Some(progress::ONLINE_TESTS_DONE),
            ..Self::default()
        }
    }
}
