use std::sync::Arc;

use assess_core::model::{DomainCategory, StudentId, UserUpdate};

use crate::action_client::ActionApi;
use crate::error::DomainSelectError;

/// Records the practice track a student will be tested in.
///
/// Selection happens exactly once: afterwards the progress gate redirects
/// the selection screen to the checklist hub.
#[derive(Clone)]
pub struct DomainService {
    api: Arc<dyn ActionApi>,
}

impl DomainService {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>) -> Self {
        Self { api }
    }

    /// Validates the choice against the catalog and records it.
    ///
    /// On success returns the update to fold into the session record:
    /// category + domain set, progress at the domain checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `DomainSelectError::NotInCatalog` for a domain outside the
    /// chosen track, or `DomainSelectError::Action` when the service
    /// rejects the selection.
    pub async fn select(
        &self,
        student_id: &StudentId,
        category: DomainCategory,
        domain: &str,
    ) -> Result<UserUpdate, DomainSelectError> {
        if !category.offers(domain) {
            return Err(DomainSelectError::NotInCatalog {
                category,
                domain: domain.to_owned(),
            });
        }

        self.api.select_domain(student_id, category, domain).await?;
        Ok(UserUpdate::domain_chosen(category, domain))
    }
}
