//! Staff-side services: the aggregated grading panel and the quick
//! status lookup by phone number.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use assess_core::model::{Stage, StudentId};

use crate::action_client::ActionApi;
use crate::dashboard_service::ScoreSummary;
use crate::error::AdminError;

/// One roster row of the grading panel, pre-aggregated by the service.
///
/// `domain_tech` is the timed technical-test mark; `domain` is the
/// practice track the student chose.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdminStudentRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub aptitude: f64,
    #[serde(default)]
    pub domain_tech: f64,
    #[serde(default)]
    pub gd: f64,
    #[serde(default)]
    pub tech: f64,
    #[serde(default)]
    pub hr: f64,
    #[serde(default)]
    pub status: String,
}

impl AdminStudentRow {
    /// The round the grading form preselects: the first offline round
    /// still without marks, falling back to HR.
    #[must_use]
    pub fn next_round(&self) -> Stage {
        if self.gd == 0.0 {
            Stage::GroupDiscussion
        } else if self.tech == 0.0 {
            Stage::TechnicalInterview
        } else {
            Stage::Hr
        }
    }

    /// The mark currently recorded for an offline round.
    #[must_use]
    pub fn offline_mark(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::GroupDiscussion => Some(self.gd),
            Stage::TechnicalInterview => Some(self.tech),
            Stage::Hr => Some(self.hr),
            Stage::Aptitude | Stage::Domain => None,
        }
    }
}

/// Marks for one offline round, in the wire spelling of `saveRoundMarks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMarks {
    pub student_id: String,
    pub round_name: String,
    pub marks: u8,
    pub remarks: String,
    pub is_completed: bool,
}

/// The `adminCheckStatus` result: progress and per-stage state for one
/// student, located by phone number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusLookup {
    pub student_id: String,
    pub name: String,
    pub phone: String,
    pub selected_domain: String,
    pub progress_percent: u8,
    pub aptitude_done: bool,
    pub domain_done: bool,
    pub gd_done: bool,
    pub technical_done: bool,
    pub hr_done: bool,
    pub all_done: bool,
    pub student_score: ScoreSummary,
    pub recording_path: Option<String>,
}

/// Grading-panel operations for staff.
#[derive(Clone)]
pub struct AdminService {
    api: Arc<dyn ActionApi>,
}

impl AdminService {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>) -> Self {
        Self { api }
    }

    /// The aggregated roster the grading panel lists.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Action` if the fetch fails.
    pub async fn roster(&self) -> Result<Vec<AdminStudentRow>, AdminError> {
        Ok(self.api.students_for_admin().await?)
    }

    /// Records marks and remarks for one offline round.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotGradable` for the timed tests (the service
    /// scores those itself), `AdminError::MarksOutOfRange` above 100, or
    /// `AdminError::Action` when the save fails.
    pub async fn grade(
        &self,
        student_id: &StudentId,
        stage: Stage,
        marks: u8,
        remarks: impl Into<String>,
    ) -> Result<(), AdminError> {
        let round_name = stage.round_name().ok_or(AdminError::NotGradable(stage))?;
        if marks > 100 {
            return Err(AdminError::MarksOutOfRange(marks));
        }

        let payload = RoundMarks {
            student_id: student_id.as_str().to_owned(),
            round_name: round_name.to_owned(),
            marks,
            remarks: remarks.into(),
            is_completed: true,
        };
        self.api.save_round_marks(&payload).await?;
        Ok(())
    }

    /// Looks a student up by phone number.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidPhone` for an implausibly short
    /// number, or `AdminError::Action` when the lookup fails (including
    /// the `notfound` status for an unknown number).
    pub async fn check_status(&self, phone: &str) -> Result<StatusLookup, AdminError> {
        let phone = phone.trim();
        if phone.len() < 6 {
            return Err(AdminError::InvalidPhone);
        }
        Ok(self.api.check_status(phone).await?)
    }
}
