//! Shared in-memory `ActionApi` double for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use assess_core::exam::{ExamKind, SubmissionPayload};
use assess_core::model::{DomainCategory, Question, QuestionId, StudentId};

use crate::action_client::ActionApi;
use crate::admin_service::{AdminStudentRow, RoundMarks, StatusLookup};
use crate::auth_service::{LoginResponse, RegistrationForm};
use crate::dashboard_service::DashboardData;
use crate::error::ActionError;
use crate::profile_service::ProfileForm;

fn not_stubbed() -> ActionError {
    ActionError::Service {
        message: "not stubbed".to_owned(),
    }
}

/// Configurable stand-in for the HTTP client: canned responses in, calls
/// recorded out.
#[derive(Default)]
pub(crate) struct StubApi {
    pub login_response: Mutex<Option<LoginResponse>>,
    pub profile: Mutex<Option<ProfileForm>>,
    pub questions: Mutex<Vec<Question>>,
    pub dashboard: Mutex<Option<DashboardData>>,
    pub roster: Mutex<Vec<AdminStudentRow>>,
    pub status_lookup: Mutex<Option<StatusLookup>>,

    pub fail_fetch: AtomicBool,
    pub fail_submit: AtomicBool,

    pub submit_calls: AtomicUsize,
    pub submitted: Mutex<Vec<(ExamKind, SubmissionPayload)>>,
    pub saved_profiles: Mutex<Vec<ProfileForm>>,
    pub selections: Mutex<Vec<(DomainCategory, String)>>,
    pub saved_marks: Mutex<Vec<RoundMarks>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_questions(questions: Vec<Question>) -> Self {
        let stub = Self::new();
        *stub.questions.lock().unwrap() = questions;
        stub
    }

    pub fn submit_call_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

/// Builds a plain four-option question for tests.
pub(crate) fn sample_question(id: u32) -> Question {
    Question::new(
        QuestionId::new(format!("q{id}")),
        format!("Question {id}?"),
        "first",
        "second",
        "third",
        "fourth",
        None,
    )
}

#[async_trait]
impl ActionApi for StubApi {
    async fn register(&self, _form: &RegistrationForm) -> Result<StudentId, ActionError> {
        Ok(StudentId::new("stub-id"))
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ActionError> {
        self.login_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(not_stubbed)
    }

    async fn get_profile(&self, _student_id: &StudentId) -> Result<ProfileForm, ActionError> {
        self.profile.lock().unwrap().clone().ok_or_else(not_stubbed)
    }

    async fn save_profile(&self, form: &ProfileForm) -> Result<(), ActionError> {
        self.saved_profiles.lock().unwrap().push(form.clone());
        Ok(())
    }

    async fn select_domain(
        &self,
        _student_id: &StudentId,
        category: DomainCategory,
        domain: &str,
    ) -> Result<(), ActionError> {
        self.selections
            .lock()
            .unwrap()
            .push((category, domain.to_owned()));
        Ok(())
    }

    async fn fetch_questions(
        &self,
        _kind: ExamKind,
        _student_id: &StudentId,
    ) -> Result<Vec<Question>, ActionError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ActionError::Service {
                message: "question bank unavailable".to_owned(),
            });
        }
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn submit_result(
        &self,
        kind: ExamKind,
        _student_id: &StudentId,
        payload: &SubmissionPayload,
    ) -> Result<(), ActionError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ActionError::Service {
                message: "submission rejected".to_owned(),
            });
        }
        self.submitted.lock().unwrap().push((kind, payload.clone()));
        Ok(())
    }

    async fn get_dashboard(&self, _student_id: &StudentId) -> Result<DashboardData, ActionError> {
        self.dashboard
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(not_stubbed)
    }

    async fn students_for_admin(&self) -> Result<Vec<AdminStudentRow>, ActionError> {
        Ok(self.roster.lock().unwrap().clone())
    }

    async fn save_round_marks(&self, marks: &RoundMarks) -> Result<(), ActionError> {
        self.saved_marks.lock().unwrap().push(marks.clone());
        Ok(())
    }

    async fn check_status(&self, _phone: &str) -> Result<StatusLookup, ActionError> {
        self.status_lookup
            .lock()
            .unwrap()
            .clone()
            .ok_or(ActionError::NotFound {
                message: "student not found".to_owned(),
            })
    }
}
