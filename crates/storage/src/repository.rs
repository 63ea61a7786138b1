use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use assess_core::model::{DomainCategory, StudentId, UserRecord, UserUpdate};

/// Errors surfaced by session-store adapters.
///
/// These never reach the student: readers degrade to "no user" and writers
/// log and move on. They exist so callers can decide where that boundary
/// sits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the signed-in user's record.
///
/// Mirrors the domain `UserRecord` in the wire spelling under which it is
/// stored, so adapters can serialize without leaking storage concerns into
/// the domain layer. Missing fields deserialize to their zero values, the
/// same forgiving read the record has always had.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default)]
    pub progress_percent: u8,
    #[serde(default)]
    pub selected_category: Option<DomainCategory>,
    #[serde(default)]
    pub selected_domain: Option<String>,
}

impl UserSnapshot {
    #[must_use]
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            student_id: user.student_id().as_str().to_owned(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            profile_completed: user.profile_completed(),
            progress_percent: user.progress_percent(),
            selected_category: user.selected_category(),
            selected_domain: user.selected_domain().map(str::to_owned),
        }
    }

    /// Converts the snapshot back into a domain `UserRecord`.
    #[must_use]
    pub fn into_user(self) -> UserRecord {
        let mut user = UserRecord::new(
            StudentId::new(self.student_id),
            self.name,
            self.email,
            self.profile_completed,
            self.progress_percent,
        );
        if self.selected_category.is_some() || self.selected_domain.is_some() {
            user.merge(UserUpdate {
                selected_category: self.selected_category,
                selected_domain: self.selected_domain,
                ..UserUpdate::default()
            });
        }
        user
    }
}

/// Session-store contract: one signed-in user record, read at startup and
/// written on every change.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Loads the persisted record.
    ///
    /// Absence and unreadable payloads both come back as `None`; a corrupt
    /// store must never block sign-in.
    async fn load(&self) -> Option<UserRecord>;

    /// Persists the record, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save(&self, user: &UserRecord) -> Result<(), StorageError>;

    /// Removes the persisted record (logout).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored record cannot be removed.
    async fn clear(&self) -> Result<(), StorageError>;

    /// The one defined update-and-persist operation: loads the current
    /// record, folds the update in, and writes it back.
    ///
    /// Returns the merged record, or `None` when no user is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the merged record cannot be written.
    async fn apply_update(&self, update: UserUpdate) -> Result<Option<UserRecord>, StorageError> {
        let Some(mut user) = self.load().await else {
            return Ok(None);
        };
        user.merge(update);
        self.save(&user).await?;
        Ok(Some(user))
    }
}

/// Mutex-backed store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<Mutex<Option<UserRecord>>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(user: UserRecord) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(user))),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn load(&self) -> Option<UserRecord> {
        self.inner.lock().map_or(None, |guard| guard.clone())
    }

    async fn save(&self, user: &UserRecord) -> Result<(), StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|err| StorageError::Io(err.to_string()))?;
        *guard = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|err| StorageError::Io(err.to_string()))?;
        *guard = None;
        Ok(())
    }
}
