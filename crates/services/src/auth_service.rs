use serde::{Deserialize, Serialize};
use std::sync::Arc;

use assess_core::gate::{Screen, initial_screen};
use assess_core::model::{StudentId, UserRecord};

use crate::action_client::ActionApi;
use crate::error::{AuthError, FormValidationError};

/// Registration form as submitted to the `register` action.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub degree: String,
    pub graduation_year: String,
    pub password: String,
}

impl RegistrationForm {
    /// Checks fields in the order the form asks for them; the first blank
    /// one is reported.
    ///
    /// # Errors
    ///
    /// Returns `FormValidationError::Missing` naming the blank field.
    pub fn validate(&self) -> Result<(), FormValidationError> {
        let checks = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("degree", &self.degree),
            ("graduation year", &self.graduation_year),
            ("password", &self.password),
        ];
        for (label, value) in checks {
            if value.trim().is_empty() {
                return Err(FormValidationError::Missing(label));
            }
        }
        Ok(())
    }
}

/// Account state returned by the `login` action.
///
/// Everything but the id is optional on the wire; missing fields default
/// the same way the record has always been rebuilt client-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default)]
    pub progress_percent: u8,
}

impl LoginResponse {
    /// Builds the session record; the email comes from the credentials
    /// rather than the response.
    #[must_use]
    pub fn into_user(self, email: impl Into<String>) -> UserRecord {
        UserRecord::new(
            StudentId::new(self.student_id),
            self.name,
            email,
            self.profile_completed,
            self.progress_percent,
        )
    }
}

/// Registration and login against the external service.
///
/// Stateless: persisting the signed-in record is the navigator's job, so
/// login hands back the record plus where the student should land.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn ActionApi>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>) -> Self {
        Self { api }
    }

    /// Registers a new account and returns the issued student id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for an incomplete form, or
    /// `AuthError::Action` when the service rejects the registration.
    pub async fn register(&self, form: &RegistrationForm) -> Result<StudentId, AuthError> {
        form.validate()?;
        Ok(self.api.register(form).await?)
    }

    /// Authenticates and returns the rebuilt record together with the
    /// post-login landing screen.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for blank credentials, or
    /// `AuthError::Action` when the service rejects them.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserRecord, Screen), AuthError> {
        if email.trim().is_empty() {
            return Err(FormValidationError::Missing("email").into());
        }
        if password.is_empty() {
            return Err(FormValidationError::Missing("password").into());
        }

        let response = self.api.login(email, password).await?;
        let user = response.into_user(email);
        let landing = initial_screen(&user);
        Ok((user, landing))
    }
}
