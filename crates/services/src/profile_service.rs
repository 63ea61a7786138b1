use serde::{Deserialize, Serialize};
use std::sync::Arc;

use assess_core::model::{StudentId, UserUpdate};

use crate::action_client::ActionApi;
use crate::error::{FormValidationError, ProfileError};

/// The profile questionnaire, in the wire spelling of `saveProfile` /
/// `getProfile`. The same shape is used for prefilling and submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub student_id: String,
    pub name: String,
    pub phone: String,
    pub college: String,
    pub degree: String,
    pub graduation_year: String,
    pub dream_job_role: String,
    pub plan_after_college: String,
    pub see_yourself_2_years: String,
    pub why_this_path: String,
    pub interested_coding: bool,
    pub interested_creative: bool,
    pub interested_marketing: bool,
    pub preferred_job_type: String,
    pub domains_curious: String,
    pub languages_known: String,
    pub tools_known: String,
    pub projects_done: bool,
    pub projects_description: String,
    /// Resume attachment, base64-encoded; the service stores the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
}

impl ProfileForm {
    /// Checks fields in the order the questionnaire presents them; the
    /// first failing check is reported.
    ///
    /// # Errors
    ///
    /// Returns the first `FormValidationError` the form would show.
    pub fn validate(&self) -> Result<(), FormValidationError> {
        let required = [
            ("full name", &self.name),
            ("phone number", &self.phone),
            ("college name", &self.college),
            ("degree", &self.degree),
            ("graduation year", &self.graduation_year),
            ("dream job role", &self.dream_job_role),
            ("plan after college", &self.plan_after_college),
            ("two-year outlook", &self.see_yourself_2_years),
            ("why this path", &self.why_this_path),
            ("curious domains", &self.domains_curious),
            ("preferred job type", &self.preferred_job_type),
            ("languages known", &self.languages_known),
            ("tools known", &self.tools_known),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(FormValidationError::Missing(label));
            }
        }

        if !self.interested_coding && !self.interested_creative && !self.interested_marketing {
            return Err(FormValidationError::NoInterestSelected);
        }

        if self.projects_done && self.projects_description.trim().is_empty() {
            return Err(FormValidationError::MissingProjectsDescription);
        }

        Ok(())
    }
}

/// Loads and saves the profile questionnaire.
#[derive(Clone)]
pub struct ProfileService {
    api: Arc<dyn ActionApi>,
}

impl ProfileService {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>) -> Self {
        Self { api }
    }

    /// Fetches the stored questionnaire for prefilling.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Action` if the fetch fails.
    pub async fn load(&self, student_id: &StudentId) -> Result<ProfileForm, ProfileError> {
        Ok(self.api.get_profile(student_id).await?)
    }

    /// Validates and submits the questionnaire.
    ///
    /// On success returns the update to fold into the session record:
    /// profile completed, progress at the profile checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` for an incomplete form, or
    /// `ProfileError::Action` when the service rejects it.
    pub async fn save(&self, form: &ProfileForm) -> Result<UserUpdate, ProfileError> {
        form.validate()?;
        self.api.save_profile(form).await?;
        Ok(UserUpdate::profile_saved(form.name.clone()))
    }
}
