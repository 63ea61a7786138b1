use std::sync::Arc;
use tracing::warn;

use assess_core::Clock;
use assess_core::exam::{ExamKind, ExamOutcome, ExamSession, ExamSessionError, SubmitTrigger};
use assess_core::model::{StudentId, UserUpdate};
use storage::UserStore;

use crate::action_client::ActionApi;
use crate::error::ExamError;

/// Orchestrates a timed test: fetches the question set, owns the clock,
/// and funnels every submission trigger into exactly one service call.
///
/// The runner is stateless; the caller owns the [`ExamSession`] and drops
/// it when navigating away, which releases the countdown with it. A
/// session whose submission failed is left parked; re-entering the test
/// screen starts over with a fresh session and a full timer.
#[derive(Clone)]
pub struct ExamRunner {
    api: Arc<dyn ActionApi>,
    store: Arc<dyn UserStore>,
    clock: Clock,
}

impl ExamRunner {
    #[must_use]
    pub fn new(api: Arc<dyn ActionApi>, store: Arc<dyn UserStore>, clock: Clock) -> Self {
        Self { api, store, clock }
    }

    /// Fetches the question set and starts a running session.
    ///
    /// The countdown begins the instant the questions are ready. An empty
    /// set never produces a session, so its timer never starts.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Load` when the fetch fails and
    /// `ExamError::EmptyQuestionSet` when the bank has nothing for this
    /// student; both are terminal for the attempt.
    pub async fn start(
        &self,
        kind: ExamKind,
        student_id: &StudentId,
    ) -> Result<ExamSession, ExamError> {
        let questions = self
            .api
            .fetch_questions(kind, student_id)
            .await
            .map_err(ExamError::Load)?;
        if questions.is_empty() {
            return Err(ExamError::EmptyQuestionSet);
        }

        let mut session = ExamSession::new(kind, questions)?;
        session.start(self.clock.now())?;
        Ok(session)
    }

    /// Advances the countdown by one second, force-submitting on zero.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Submission` if the forced submission fails.
    pub async fn tick(
        &self,
        session: &mut ExamSession,
        student_id: &StudentId,
    ) -> Result<Option<ExamOutcome>, ExamError> {
        match session.tick() {
            Some(trigger) => self.resolve(session, student_id, trigger).await,
            None => Ok(None),
        }
    }

    /// Reacts to the page losing visibility: flags the violation and
    /// force-submits whatever answers exist, with no confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Submission` if the forced submission fails.
    pub async fn visibility_lost(
        &self,
        session: &mut ExamSession,
        student_id: &StudentId,
    ) -> Result<Option<ExamOutcome>, ExamError> {
        match session.record_visibility_lost() {
            Some(trigger) => self.resolve(session, student_id, trigger).await,
            None => Ok(None),
        }
    }

    /// Submits on the student's request.
    ///
    /// `confirmed` is the answer to the are-you-sure prompt; declining is
    /// a no-op and the session keeps running.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Submission` if the service rejects the
    /// submission, or `ExamError::Session` when the session is not in a
    /// submittable state.
    pub async fn submit(
        &self,
        session: &mut ExamSession,
        student_id: &StudentId,
        confirmed: bool,
    ) -> Result<Option<ExamOutcome>, ExamError> {
        if !confirmed {
            return Ok(None);
        }
        self.resolve(session, student_id, SubmitTrigger::Manual).await
    }

    async fn resolve(
        &self,
        session: &mut ExamSession,
        student_id: &StudentId,
        trigger: SubmitTrigger,
    ) -> Result<Option<ExamOutcome>, ExamError> {
        let payload = match session.begin_submit(trigger) {
            Ok(payload) => payload,
            // Another trigger already has a submission in flight.
            Err(ExamSessionError::AlreadySubmitting) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match self
            .api
            .submit_result(session.kind(), student_id, &payload)
            .await
        {
            Ok(()) => {
                let outcome = session.complete_submit(self.clock.now())?;
                if session.kind() == ExamKind::Domain {
                    // The domain test is gated behind aptitude, so finishing
                    // it means the online stage is done.
                    if let Err(err) = self.store.apply_update(UserUpdate::online_tests_done()).await
                    {
                        warn!(%err, "could not persist online-tests checkpoint");
                    }
                }
                Ok(Some(outcome))
            }
            Err(err) => {
                session.fail_submit()?;
                Err(ExamError::Submission(err))
            }
        }
    }
}
