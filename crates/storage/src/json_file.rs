use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use assess_core::model::UserRecord;

use crate::repository::{StorageError, UserSnapshot, UserStore};

/// File name of the single persisted record, matching the key the portal
/// has always stored its session under.
pub const STORE_FILE_NAME: &str = "assess_user.json";

/// Session store backed by one JSON file.
///
/// The record is read once at startup and rewritten on every change.
/// Writes go through a sibling temp file and a rename so a crash mid-write
/// leaves either the old record or the new one, never a torn file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store using the conventional file name inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn load(&self) -> Option<UserRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "session store unreadable; treating as signed out");
                return None;
            }
        };

        match serde_json::from_slice::<UserSnapshot>(&bytes) {
            Ok(snapshot) => Some(snapshot.into_user()),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "session store corrupt; treating as signed out");
                None
            }
        }
    }

    async fn save(&self, user: &UserRecord) -> Result<(), StorageError> {
        let snapshot = UserSnapshot::from_user(user);
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|err| StorageError::Io(err.to_string()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|err| StorageError::Io(err.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }
}
