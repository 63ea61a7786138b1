//! Application-shell state: the one owned copy of the signed-in record,
//! with merge-and-persist as its only update path.
//!
//! The progress gate itself stays a pure function in the core crate; the
//! navigator is the caller that applies its decisions. It re-evaluates
//! the gate on exactly two triggers: a navigation request and a change
//! to the user record.

use std::sync::Arc;
use tracing::{debug, warn};

use assess_core::gate::{self, RouteDecision, Screen};
use assess_core::model::{UserRecord, UserUpdate};
use storage::UserStore;

pub struct Navigator {
    store: Arc<dyn UserStore>,
    user: Option<UserRecord>,
}

impl Navigator {
    /// Builds the shell, restoring whatever record the store holds.
    ///
    /// A missing or unreadable record simply means signed out.
    pub async fn start(store: Arc<dyn UserStore>) -> Self {
        let user = store.load().await;
        Self { store, user }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// Resolves one navigation request to the screen actually shown.
    ///
    /// Every redirect target the gate can produce is itself allowed, so
    /// a single application settles the request.
    #[must_use]
    pub fn request(&self, requested: Screen) -> Screen {
        match gate::evaluate(self.user.as_ref(), requested) {
            RouteDecision::Allow => requested,
            RouteDecision::Redirect(target) => {
                debug!(%requested, %target, "gate redirected");
                target
            }
        }
    }

    /// Installs the record a successful login produced, persists it, and
    /// returns the first incomplete stage to land on.
    pub async fn sign_in(&mut self, user: UserRecord) -> Screen {
        self.persist(&user).await;
        let landing = gate::initial_screen(&user);
        self.user = Some(user);
        landing
    }

    /// Folds a service-confirmed update into the record and persists it.
    ///
    /// Returns where the shell should now be: the record changed, so the
    /// gate is re-evaluated against the current screen.
    pub async fn apply(&mut self, update: UserUpdate, current: Screen) -> Screen {
        if let Some(user) = self.user.as_mut() {
            user.merge(update);
            let snapshot = user.clone();
            self.persist(&snapshot).await;
        }
        self.request(current)
    }

    /// Signs out: the record is dropped and its persisted copy removed.
    pub async fn sign_out(&mut self) -> Screen {
        self.user = None;
        if let Err(err) = self.store.clear().await {
            warn!(%err, "could not clear the persisted session");
        }
        Screen::Login
    }

    // Write failures stay invisible to the student; the in-memory record
    // keeps the session working for its lifetime.
    async fn persist(&self, user: &UserRecord) {
        if let Err(err) = self.store.save(user).await {
            warn!(%err, "could not persist the session record");
        }
    }
}
