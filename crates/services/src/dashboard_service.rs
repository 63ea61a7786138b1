//! Aggregated results: the checklist hub's stage status and the report
//! views built from the `getDashboard` summary.

use serde::Deserialize;
use std::sync::Arc;

use assess_core::exam::ExamKind;
use assess_core::model::{Stage, StudentId};

use crate::action_client::ActionApi;
use crate::error::DashboardError;

/// Marks per round plus ranking, as the summary sheet spells them.
///
/// Unlike the rest of the contract these keys are snake_case; absent
/// fields read as zero, matching how the views have always defaulted
/// them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoreSummary {
    #[serde(default)]
    pub aptitude_mark: f64,
    #[serde(default)]
    pub domain_mark: f64,
    #[serde(default)]
    pub gd_mark: f64,
    #[serde(default)]
    pub technical_mark: f64,
    #[serde(default)]
    pub hr_mark: f64,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub rank_position: u32,
    #[serde(default)]
    pub total_participants: u32,
    #[serde(default)]
    pub tests_completed: u32,
}

impl ScoreSummary {
    #[must_use]
    pub fn mark(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Aptitude => self.aptitude_mark,
            Stage::Domain => self.domain_mark,
            Stage::GroupDiscussion => self.gd_mark,
            Stage::TechnicalInterview => self.technical_mark,
            Stage::Hr => self.hr_mark,
        }
    }

    /// A stage counts as done once it carries any mark.
    #[must_use]
    pub fn stage_done(&self, stage: Stage) -> bool {
        self.mark(stage) > 0.0
    }
}

/// Candidate details attached to the dashboard response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub degree: String,
    pub year: String,
    pub domain: String,
}

/// Everything `getDashboard` returns for one student.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub summary: ScoreSummary,
    pub profile: ProfileSummary,
}

/// Per-stage completion state driving the checklist hub.
///
/// The two timed tests unlock in order; the offline rounds are never
/// startable from the hub, they just report whether staff graded them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistStatus {
    pub aptitude: bool,
    pub domain: bool,
    pub gd: bool,
    pub technical: bool,
    pub hr: bool,
}

impl ChecklistStatus {
    #[must_use]
    pub fn from_summary(summary: &ScoreSummary) -> Self {
        Self {
            aptitude: summary.stage_done(Stage::Aptitude),
            domain: summary.stage_done(Stage::Domain),
            gd: summary.stage_done(Stage::GroupDiscussion),
            technical: summary.stage_done(Stage::TechnicalInterview),
            hr: summary.stage_done(Stage::Hr),
        }
    }

    #[must_use]
    pub fn done(&self, stage: Stage) -> bool {
        match stage {
            Stage::Aptitude => self.aptitude,
            Stage::Domain => self.domain,
            Stage::GroupDiscussion => self.gd,
            Stage::TechnicalInterview => self.technical,
            Stage::Hr => self.hr,
        }
    }

    /// The timed test the student should take next, if any remains.
    ///
    /// Aptitude always comes before the domain test.
    #[must_use]
    pub fn next_online_stage(&self) -> Option<ExamKind> {
        if !self.aptitude {
            Some(ExamKind::Aptitude)
        } else if !self.domain {
            Some(ExamKind::Domain)
        } else {
            None
        }
    }

    /// True once both timed tests carry marks; the hub then offers the
    /// assessment report instead of a start button.
    #[must_use]
    pub fn online_complete(&self) -> bool {
        self.aptitude && self.domain
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        Stage::ALL.into_iter().filter(|s| self.done(*s)).count()
    }

    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        (self.completed_count() * 100 / Stage::ALL.len()) as u8
    }
}

/// The online-assessment report shown once both timed tests are done.
#[derive(Debug, Clone, PartialEq)]
pub struct OnlineReport {
    pub aptitude_mark: f64,
    pub domain_mark: f64,
    pub total_score: f64,
    pub percentage: f64,
    pub rank: u32,
    pub total_participants: u32,
    /// Share of participants the student scored higher than.
    pub percentile: u32,
    pub qualified: bool,
}

impl OnlineReport {
    /// Both timed tests are scored out of ten.
    pub const MAX_SCORE: f64 = 20.0;
    /// Average mark at or above which the candidate is shortlisted.
    pub const QUALIFYING_AVERAGE: f64 = 5.0;

    #[must_use]
    pub fn from_summary(summary: &ScoreSummary) -> Self {
        let total_score = summary.aptitude_mark + summary.domain_mark;
        // An empty ranking sheet reports zero participants; treat the
        // student as a field of one rather than dividing by zero.
        let total_participants = summary.total_participants.max(1);
        let rank = summary.rank_position.max(1);
        let ahead_of = total_participants.saturating_sub(rank);
        let percentile =
            (f64::from(ahead_of) / f64::from(total_participants) * 100.0).round() as u32;

        Self {
            aptitude_mark: summary.aptitude_mark,
            domain_mark: summary.domain_mark,
            total_score,
            percentage: total_score / Self::MAX_SCORE * 100.0,
            rank,
            total_participants,
            percentile,
            qualified: total_score / 2.0 >= Self::QUALIFYING_AVERAGE,
        }
    }

    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.qualified {
            "Shortlisted for Interview"
        } else {
            "Under Review"
        }
    }
}

/// Fetches the aggregated summary and derives the view states from it.
#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn ActionApi>,
}

impl DashboardService {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>) -> Self {
        Self { api }
    }

    /// The raw dashboard payload (full report view).
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Action` if the fetch fails.
    pub async fn get(&self, student_id: &StudentId) -> Result<DashboardData, DashboardError> {
        Ok(self.api.get_dashboard(student_id).await?)
    }

    /// Stage status for the checklist hub.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Action` if the fetch fails.
    pub async fn checklist(&self, student_id: &StudentId) -> Result<ChecklistStatus, DashboardError> {
        let data = self.get(student_id).await?;
        Ok(ChecklistStatus::from_summary(&data.summary))
    }

    /// The online-assessment report.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Action` if the fetch fails.
    pub async fn online_report(&self, student_id: &StudentId) -> Result<OnlineReport, DashboardError> {
        let data = self.get(student_id).await?;
        Ok(OnlineReport::from_summary(&data.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(aptitude: f64, domain: f64) -> ScoreSummary {
        ScoreSummary {
            aptitude_mark: aptitude,
            domain_mark: domain,
            ..ScoreSummary::default()
        }
    }

    #[test]
    fn wire_summary_defaults_missing_marks() {
        let data: DashboardData = serde_json::from_str(
            r#"{"summary":{"aptitude_mark":7,"rank_position":4,"total_participants":40},
                "profile":{"name":"Asha"}}"#,
        )
        .unwrap();
        assert!((data.summary.aptitude_mark - 7.0).abs() < f64::EPSILON);
        assert!((data.summary.domain_mark).abs() < f64::EPSILON);
        assert_eq!(data.profile.name, "Asha");
    }

    #[test]
    fn checklist_unlocks_tests_in_order() {
        let fresh = ChecklistStatus::from_summary(&summary(0.0, 0.0));
        assert_eq!(fresh.next_online_stage(), Some(ExamKind::Aptitude));
        assert!(!fresh.online_complete());

        let after_aptitude = ChecklistStatus::from_summary(&summary(6.0, 0.0));
        assert_eq!(after_aptitude.next_online_stage(), Some(ExamKind::Domain));

        let both = ChecklistStatus::from_summary(&summary(6.0, 8.0));
        assert_eq!(both.next_online_stage(), None);
        assert!(both.online_complete());
    }

    #[test]
    fn checklist_counts_offline_rounds_too() {
        let mut all = summary(6.0, 8.0);
        all.gd_mark = 7.0;
        let status = ChecklistStatus::from_summary(&all);
        assert_eq!(status.completed_count(), 3);
        assert_eq!(status.completion_percent(), 60);
        assert!(!status.done(Stage::Hr));
    }

    #[test]
    fn report_percentile_counts_peers_scored_above() {
        let mut s = summary(7.0, 8.0);
        s.rank_position = 4;
        s.total_participants = 40;
        let report = OnlineReport::from_summary(&s);

        assert_eq!(report.percentile, 90);
        assert!((report.total_score - 15.0).abs() < f64::EPSILON);
        assert!((report.percentage - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_ranking_sheet_never_divides_by_zero() {
        let report = OnlineReport::from_summary(&summary(3.0, 2.0));
        assert_eq!(report.total_participants, 1);
        assert_eq!(report.rank, 1);
        assert_eq!(report.percentile, 0);
    }

    #[test]
    fn qualification_uses_the_average_threshold() {
        assert!(OnlineReport::from_summary(&summary(5.0, 5.0)).qualified);
        assert!(!OnlineReport::from_summary(&summary(4.0, 5.0)).qualified);
        assert_eq!(
            OnlineReport::from_summary(&summary(4.0, 5.0)).status_label(),
            "Under Review"
        );
    }
}
