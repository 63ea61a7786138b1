//! Client for the external spreadsheet-backed script service.
//!
//! All traffic goes through one endpoint: a `POST` whose JSON body is
//! `{"action": <name>, ...params}` and whose response is a JSON envelope
//! `{"status": "ok" | "error" | "notfound", ...}`. The body is sent as
//! `text/plain` because the script host mishandles CORS preflight; the
//! payload itself is still JSON.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use tracing::debug;

use assess_core::exam::{ExamKind, SubmissionPayload};
use assess_core::model::{DomainCategory, Question, QuestionId, StudentId};

use crate::admin_service::{AdminStudentRow, RoundMarks, StatusLookup};
use crate::auth_service::{LoginResponse, RegistrationForm};
use crate::dashboard_service::DashboardData;
use crate::error::ActionError;
use crate::profile_service::ProfileForm;

/// Typed surface over the action contract.
///
/// Services hold this behind `Arc<dyn ActionApi>` so tests can substitute
/// in-memory doubles for the real HTTP client.
#[async_trait]
pub trait ActionApi: Send + Sync {
    /// `register`: creates the account and issues the student id.
    async fn register(&self, form: &RegistrationForm) -> Result<StudentId, ActionError>;

    /// `login`: authenticates and returns the stored account state.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ActionError>;

    /// `getProfile`: loads the saved questionnaire for prefilling.
    async fn get_profile(&self, student_id: &StudentId) -> Result<ProfileForm, ActionError>;

    /// `saveProfile`: stores the questionnaire.
    async fn save_profile(&self, form: &ProfileForm) -> Result<(), ActionError>;

    /// `selectDomain`: records the chosen practice track.
    async fn select_domain(
        &self,
        student_id: &StudentId,
        category: DomainCategory,
        domain: &str,
    ) -> Result<(), ActionError>;

    /// `getAptitudeQuestions` / `getDomainQuestions`: the test's question set.
    async fn fetch_questions(
        &self,
        kind: ExamKind,
        student_id: &StudentId,
    ) -> Result<Vec<Question>, ActionError>;

    /// `submitAptitudeResult` / `submitDomainResult`: records the answers.
    async fn submit_result(
        &self,
        kind: ExamKind,
        student_id: &StudentId,
        payload: &SubmissionPayload,
    ) -> Result<(), ActionError>;

    /// `getDashboard`: aggregated marks and profile summary.
    async fn get_dashboard(&self, student_id: &StudentId) -> Result<DashboardData, ActionError>;

    /// `getStudentsForAdmin`: the staff grading roster.
    async fn students_for_admin(&self) -> Result<Vec<AdminStudentRow>, ActionError>;

    /// `saveRoundMarks`: records marks for an offline round.
    async fn save_round_marks(&self, marks: &RoundMarks) -> Result<(), ActionError>;

    /// `adminCheckStatus`: progress lookup by phone number.
    async fn check_status(&self, phone: &str) -> Result<StatusLookup, ActionError>;
}

#[derive(Clone, Debug)]
pub struct ActionConfig {
    pub endpoint: String,
}

impl ActionConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Reads the deployment URL from `ASSESS_SCRIPT_URL`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("ASSESS_SCRIPT_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        Some(Self { endpoint })
    }
}

/// The production client: one reqwest `Client` posting to the configured
/// deployment URL.
#[derive(Clone)]
pub struct HttpActionClient {
    client: Client,
    config: ActionConfig,
}

impl HttpActionClient {
    #[must_use]
    pub fn new(config: ActionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn post_action(&self, action: &str, mut params: Map<String, Value>) -> Result<Value, ActionError> {
        params.insert("action".to_owned(), Value::String(action.to_owned()));
        let body = Value::Object(params).to_string();

        debug!(action, "dispatching action");
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;
        let text = response.text().await?;
        decode_envelope(&text)
    }

    async fn post_decoded<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Map<String, Value>,
    ) -> Result<T, ActionError> {
        let value = self.post_action(action, params).await?;
        serde_json::from_value(value).map_err(|err| ActionError::Decode(err.to_string()))
    }
}

/// Parses a response body into its envelope and unwraps the status field.
fn decode_envelope(text: &str) -> Result<Value, ActionError> {
    let value: Value = serde_json::from_str(text).map_err(|_| ActionError::InvalidBody)?;
    let status = value.get("status").and_then(Value::as_str).unwrap_or("error");
    match status {
        "ok" => Ok(value),
        "notfound" => Err(ActionError::NotFound {
            message: envelope_message(&value),
        }),
        _ => Err(ActionError::Service {
            message: envelope_message(&value),
        }),
    }
}

fn envelope_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("server error")
        .to_owned()
}

fn params_of<T: Serialize>(body: &T) -> Result<Map<String, Value>, ActionError> {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ActionError::Decode("expected an object body".to_owned())),
        Err(err) => Err(ActionError::Decode(err.to_string())),
    }
}

fn student_params(student_id: &StudentId) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(
        "studentId".to_owned(),
        Value::String(student_id.as_str().to_owned()),
    );
    params
}

fn questions_action(kind: ExamKind) -> &'static str {
    match kind {
        ExamKind::Aptitude => "getAptitudeQuestions",
        ExamKind::Domain => "getDomainQuestions",
    }
}

fn submit_action(kind: ExamKind) -> &'static str {
    match kind {
        ExamKind::Aptitude => "submitAptitudeResult",
        ExamKind::Domain => "submitDomainResult",
    }
}

#[async_trait]
impl ActionApi for HttpActionClient {
    async fn register(&self, form: &RegistrationForm) -> Result<StudentId, ActionError> {
        let value = self.post_action("register", params_of(form)?).await?;
        let issued = value
            .get("studentId")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::Decode("registration response missing studentId".to_owned()))?;
        Ok(StudentId::new(issued))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ActionError> {
        let mut params = Map::new();
        params.insert("email".to_owned(), Value::String(email.to_owned()));
        params.insert("password".to_owned(), Value::String(password.to_owned()));
        self.post_decoded("login", params).await
    }

    async fn get_profile(&self, student_id: &StudentId) -> Result<ProfileForm, ActionError> {
        let response: ProfileResponse = self
            .post_decoded("getProfile", student_params(student_id))
            .await?;
        Ok(response.profile)
    }

    async fn save_profile(&self, form: &ProfileForm) -> Result<(), ActionError> {
        self.post_action("saveProfile", params_of(form)?).await?;
        Ok(())
    }

    async fn select_domain(
        &self,
        student_id: &StudentId,
        category: DomainCategory,
        domain: &str,
    ) -> Result<(), ActionError> {
        let mut params = student_params(student_id);
        params.insert(
            "category".to_owned(),
            serde_json::to_value(category).map_err(|err| ActionError::Decode(err.to_string()))?,
        );
        params.insert("domain".to_owned(), Value::String(domain.to_owned()));
        self.post_action("selectDomain", params).await?;
        Ok(())
    }

    async fn fetch_questions(
        &self,
        kind: ExamKind,
        student_id: &StudentId,
    ) -> Result<Vec<Question>, ActionError> {
        let response: QuestionsResponse = self
            .post_decoded(questions_action(kind), student_params(student_id))
            .await?;
        Ok(response
            .questions
            .into_iter()
            .map(QuestionDto::into_question)
            .collect())
    }

    async fn submit_result(
        &self,
        kind: ExamKind,
        student_id: &StudentId,
        payload: &SubmissionPayload,
    ) -> Result<(), ActionError> {
        let mut params = student_params(student_id);
        params.insert(
            "answers".to_owned(),
            serde_json::to_value(&payload.answers)
                .map_err(|err| ActionError::Decode(err.to_string()))?,
        );
        params.insert("violation".to_owned(), Value::Bool(payload.violation));
        self.post_action(submit_action(kind), params).await?;
        Ok(())
    }

    async fn get_dashboard(&self, student_id: &StudentId) -> Result<DashboardData, ActionError> {
        self.post_decoded("getDashboard", student_params(student_id))
            .await
    }

    async fn students_for_admin(&self) -> Result<Vec<AdminStudentRow>, ActionError> {
        let response: RosterResponse = self.post_decoded("getStudentsForAdmin", Map::new()).await?;
        Ok(response.students)
    }

    async fn save_round_marks(&self, marks: &RoundMarks) -> Result<(), ActionError> {
        self.post_action("saveRoundMarks", params_of(marks)?).await?;
        Ok(())
    }

    async fn check_status(&self, phone: &str) -> Result<StatusLookup, ActionError> {
        let mut params = Map::new();
        params.insert("phone".to_owned(), Value::String(phone.trim().to_owned()));
        let response: StatusResponse = self.post_decoded("adminCheckStatus", params).await?;
        Ok(response.result)
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

/// A question as the bank serves it; blank options stay blank and option E
/// resolves to the synthetic unsure choice on the domain side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    question_id: String,
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    option_a: String,
    #[serde(default)]
    option_b: String,
    #[serde(default)]
    option_c: String,
    #[serde(default)]
    option_d: String,
    #[serde(default)]
    option_e: Option<String>,
}

impl QuestionDto {
    fn into_question(self) -> Question {
        Question::new(
            QuestionId::new(self.question_id),
            self.question_text,
            self.option_a,
            self.option_b,
            self.option_c,
            self.option_d,
            self.option_e,
        )
    }
}

/// The saved questionnaire rides under a `profile` key; a student who
/// never saved one reads as an empty form.
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    profile: ProfileForm,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    #[serde(default)]
    students: Vec<AdminStudentRow>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: StatusLookup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::OptionLetter;

    #[test]
    fn ok_envelope_unwraps_to_its_value() {
        let value = decode_envelope(r#"{"status":"ok","studentId":"s1"}"#).unwrap();
        assert_eq!(value["studentId"], "s1");
    }

    #[test]
    fn error_envelope_carries_the_service_message() {
        let err = decode_envelope(r#"{"status":"error","message":"Invalid password"}"#).unwrap_err();
        assert!(matches!(err, ActionError::Service { message } if message == "Invalid password"));
    }

    #[test]
    fn notfound_envelope_maps_to_not_found() {
        let err = decode_envelope(r#"{"status":"notfound"}"#).unwrap_err();
        assert!(matches!(err, ActionError::NotFound { .. }));
    }

    #[test]
    fn non_json_body_is_an_invalid_body() {
        let err = decode_envelope("<html>It broke</html>").unwrap_err();
        assert!(matches!(err, ActionError::InvalidBody));
    }

    #[test]
    fn missing_status_counts_as_error() {
        let err = decode_envelope(r#"{"questions":[]}"#).unwrap_err();
        assert!(matches!(err, ActionError::Service { .. }));
    }

    #[test]
    fn profile_rides_under_its_own_key() {
        let response: ProfileResponse = serde_json::from_str(
            r#"{"status":"ok","profile":{"studentId":"s1","name":"Asha"}}"#,
        )
        .unwrap();
        assert_eq!(response.profile.name, "Asha");

        // No saved questionnaire yet: an empty form, not an error.
        let response: ProfileResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(response.profile.name.is_empty());
    }

    #[test]
    fn question_dto_maps_onto_the_domain_question() {
        let dto: QuestionDto = serde_json::from_str(
            r#"{"questionId":"q3","questionText":"Pick one","optionA":"x","optionB":"y","optionC":"z","optionD":"w"}"#,
        )
        .unwrap();
        let question = dto.into_question();
        assert_eq!(question.id(), &QuestionId::new("q3"));
        // No explicit E in the bank: the synthetic unsure option appears.
        assert!(question.is_available(OptionLetter::E));
    }

    #[test]
    fn submit_answers_serialize_in_wire_spelling() {
        let entry = assess_core::exam::AnswerEntry {
            question_id: QuestionId::new("q1"),
            chosen_option: OptionLetter::D,
        };
        let json = serde_json::to_value(vec![entry]).unwrap();
        assert_eq!(json[0]["questionId"], "q1");
        assert_eq!(json[0]["chosenOption"], "D");
    }
}
