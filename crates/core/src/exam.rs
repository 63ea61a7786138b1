//! Per-test exam session: question set, navigation, countdown, integrity
//! monitor, and submission bookkeeping.
//!
//! The session is a pure state machine driven by discrete events (timer
//! ticks, visibility changes, user input); the services layer owns the
//! actual timer and the network call. All three submission triggers funnel
//! through [`ExamSession::begin_submit`], which succeeds exactly once per
//! session, so racing triggers can never produce two submissions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::model::{OptionLetter, Question, QuestionId};

//
// ─── KIND & CONFIG ─────────────────────────────────────────────────────────────
//

/// Which of the two timed tests a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamKind {
    Aptitude,
    Domain,
}

impl ExamKind {
    /// Full countdown duration. Sessions always start from this value;
    /// they are never resumed part-way.
    #[must_use]
    pub fn duration_secs(self) -> u32 {
        match self {
            ExamKind::Aptitude => 20 * 60,
            ExamKind::Domain => 45 * 60,
        }
    }

    /// Hard cap on the question set; anything longer from the bank is
    /// truncated.
    #[must_use]
    pub fn question_cap(self) -> usize {
        25
    }

    /// Remaining-time threshold under which the UI shows the timer in its
    /// warning state.
    #[must_use]
    pub fn low_time_warning_secs(self) -> u32 {
        match self {
            ExamKind::Aptitude => 60,
            ExamKind::Domain => 5 * 60,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ExamKind::Aptitude => "Aptitude Assessment",
            ExamKind::Domain => "Technical Assessment",
        }
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

//
// ─── STATES & TRIGGERS ─────────────────────────────────────────────────────────
//

/// Why a session terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamOutcome {
    /// Student submitted on their own.
    Completed,
    /// Countdown reached zero.
    TimedOut,
    /// Tab switch / visibility loss forced the submission.
    Violation,
}

/// What set a submission in motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
    Violation,
}

impl SubmitTrigger {
    #[must_use]
    pub fn outcome(self) -> ExamOutcome {
        match self {
            SubmitTrigger::Manual => ExamOutcome::Completed,
            SubmitTrigger::Timeout => ExamOutcome::TimedOut,
            SubmitTrigger::Violation => ExamOutcome::Violation,
        }
    }
}

/// Lifecycle of a session.
///
/// `SubmitFailed` is deliberately a dead end: the student navigates away
/// and re-enters, starting a fresh session with a full timer. Nothing is
/// retried automatically and the recorded answers stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    Ready,
    InProgress,
    Submitting,
    SubmitFailed,
    Terminated(ExamOutcome),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamSessionError {
    #[error("no questions available for this test")]
    NoQuestions,

    #[error("session already started")]
    AlreadyStarted,

    #[error("session is not accepting input")]
    NotInProgress,

    #[error("question index {index} out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("option {letter} is not offered for this question")]
    UnavailableOption { letter: OptionLetter },

    #[error("a submission is already underway")]
    AlreadySubmitting,

    #[error("no submission is underway")]
    NotSubmitting,
}

//
// ─── SUBMISSION PAYLOAD ────────────────────────────────────────────────────────
//

/// One answered question, in the wire spelling the service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub chosen_option: OptionLetter,
}

/// Everything a submission carries: answered questions in question order
/// (unanswered ones are simply absent) plus the integrity flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub answers: Vec<AnswerEntry>,
    pub violation: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state for one running timed test.
///
/// Created only after a successful, non-empty question fetch; a session
/// with zero questions cannot exist, so the countdown can never start for
/// an empty test. State is never persisted: abandoning the screen discards
/// it, and re-entering builds a fresh session.
pub struct ExamSession {
    kind: ExamKind,
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<QuestionId, OptionLetter>,
    time_remaining: u32,
    violation: bool,
    phase: ExamPhase,
    pending: Option<SubmitTrigger>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl ExamSession {
    /// Builds a session from a fetched question set.
    ///
    /// The set is truncated to the kind's cap. The countdown is primed at
    /// the full configured duration but does not run until [`start`].
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::NoQuestions` for an empty set.
    ///
    /// [`start`]: ExamSession::start
    pub fn new(kind: ExamKind, mut questions: Vec<Question>) -> Result<Self, ExamSessionError> {
        questions.truncate(kind.question_cap());
        if questions.is_empty() {
            return Err(ExamSessionError::NoQuestions);
        }

        Ok(Self {
            kind,
            questions,
            current: 0,
            answers: HashMap::new(),
            time_remaining: kind.duration_secs(),
            violation: false,
            phase: ExamPhase::Ready,
            pending: None,
            started_at: None,
            finished_at: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> ExamKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn on_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn low_on_time(&self) -> bool {
        self.time_remaining < self.kind.low_time_warning_secs()
    }

    #[must_use]
    pub fn violation(&self) -> bool {
        self.violation
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// The option recorded for a question, if any.
    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<OptionLetter> {
        self.answers.get(id).copied()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, ExamPhase::Terminated(_))
    }

    /// Starts the countdown.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::AlreadyStarted` unless the session is
    /// still `Ready`.
    pub fn start(&mut self, started_at: DateTime<Utc>) -> Result<(), ExamSessionError> {
        if self.phase != ExamPhase::Ready {
            return Err(ExamSessionError::AlreadyStarted);
        }
        self.phase = ExamPhase::InProgress;
        self.started_at = Some(started_at);
        Ok(())
    }

    /// Records (or replaces) the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `NotInProgress` outside the running phase, or
    /// `UnavailableOption` if the letter has no text for this question.
    pub fn select_option(&mut self, letter: OptionLetter) -> Result<(), ExamSessionError> {
        self.require_in_progress()?;
        let question = &self.questions[self.current];
        if !question.is_available(letter) {
            return Err(ExamSessionError::UnavailableOption { letter });
        }
        self.answers.insert(question.id().clone(), letter);
        Ok(())
    }

    /// Moves to the next question; clamped at the last one.
    ///
    /// # Errors
    ///
    /// Returns `NotInProgress` outside the running phase.
    pub fn next_question(&mut self) -> Result<(), ExamSessionError> {
        self.require_in_progress()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(())
    }

    /// Moves to the previous question; clamped at the first one.
    ///
    /// # Errors
    ///
    /// Returns `NotInProgress` outside the running phase.
    pub fn previous_question(&mut self) -> Result<(), ExamSessionError> {
        self.require_in_progress()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Jumps straight to a question from the palette.
    ///
    /// # Errors
    ///
    /// Returns `NotInProgress` outside the running phase, or
    /// `IndexOutOfRange` for an invalid index.
    pub fn jump_to(&mut self, index: usize) -> Result<(), ExamSessionError> {
        self.require_in_progress()?;
        if index >= self.questions.len() {
            return Err(ExamSessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// Yields the timeout trigger exactly when the countdown reaches zero;
    /// it never goes negative. Inert outside the running phase, so a tick
    /// that arrives after termination is harmless.
    pub fn tick(&mut self) -> Option<SubmitTrigger> {
        if self.phase != ExamPhase::InProgress {
            return None;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        (self.time_remaining == 0).then_some(SubmitTrigger::Timeout)
    }

    /// Flags an integrity violation the moment the page loses visibility.
    ///
    /// Yields the violation trigger so the caller can force-submit with
    /// whatever answers exist. Inert outside the running phase.
    pub fn record_visibility_lost(&mut self) -> Option<SubmitTrigger> {
        if self.phase != ExamPhase::InProgress {
            return None;
        }
        self.violation = true;
        Some(SubmitTrigger::Violation)
    }

    /// Moves the session into `Submitting` and serializes the payload.
    ///
    /// Succeeds at most once per session: the transition out of
    /// `InProgress` makes every later trigger fail, which is what keeps a
    /// timeout and a violation landing on the same tick down to a single
    /// network call.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitting` while a submission is in flight and
    /// `NotInProgress` in any other non-running phase.
    pub fn begin_submit(
        &mut self,
        trigger: SubmitTrigger,
    ) -> Result<SubmissionPayload, ExamSessionError> {
        match self.phase {
            ExamPhase::InProgress => {}
            ExamPhase::Submitting => return Err(ExamSessionError::AlreadySubmitting),
            _ => return Err(ExamSessionError::NotInProgress),
        }

        self.phase = ExamPhase::Submitting;
        self.pending = Some(trigger);

        let answers = self
            .questions
            .iter()
            .filter_map(|question| {
                self.answers.get(question.id()).map(|letter| AnswerEntry {
                    question_id: question.id().clone(),
                    chosen_option: *letter,
                })
            })
            .collect();

        Ok(SubmissionPayload {
            answers,
            violation: self.violation,
        })
    }

    /// Marks the in-flight submission as accepted by the service.
    ///
    /// `finished_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `NotSubmitting` unless a submission is in flight.
    pub fn complete_submit(
        &mut self,
        finished_at: DateTime<Utc>,
    ) -> Result<ExamOutcome, ExamSessionError> {
        if self.phase != ExamPhase::Submitting {
            return Err(ExamSessionError::NotSubmitting);
        }
        let outcome = self
            .pending
            .take()
            .ok_or(ExamSessionError::NotSubmitting)?
            .outcome();
        self.phase = ExamPhase::Terminated(outcome);
        self.finished_at = Some(finished_at);
        Ok(outcome)
    }

    /// Marks the in-flight submission as rejected or lost.
    ///
    /// The session parks in `SubmitFailed` with its answers intact; there
    /// is no automatic retry.
    ///
    /// # Errors
    ///
    /// Returns `NotSubmitting` unless a submission is in flight.
    pub fn fail_submit(&mut self) -> Result<(), ExamSessionError> {
        if self.phase != ExamPhase::Submitting {
            return Err(ExamSessionError::NotSubmitting);
        }
        self.phase = ExamPhase::SubmitFailed;
        self.pending = None;
        Ok(())
    }

    fn require_in_progress(&self) -> Result<(), ExamSessionError> {
        if self.phase == ExamPhase::InProgress {
            Ok(())
        } else {
            Err(ExamSessionError::NotInProgress)
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("kind", &self.kind)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("time_remaining", &self.time_remaining)
            .field("violation", &self.violation)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use crate::time::fixed_now;

    fn build_question(id: u32) -> Question {
        Question::new(
            QuestionId::new(format!("q{id}")),
            format!("Question {id}?"),
            "first",
            "second",
            "third",
            "fourth",
            None,
        )
    }

    fn running_session(count: u32) -> ExamSession {
        let questions = (1..=count).map(build_question).collect();
        let mut session = ExamSession::new(ExamKind::Aptitude, questions).unwrap();
        session.start(fixed_now()).unwrap();
        session
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let err = ExamSession::new(ExamKind::Aptitude, Vec::new()).unwrap_err();
        assert_eq!(err, ExamSessionError::NoQuestions);
    }

    #[test]
    fn question_set_is_truncated_to_cap() {
        let questions = (1..=40).map(build_question).collect();
        let session = ExamSession::new(ExamKind::Domain, questions).unwrap();
        assert_eq!(session.total_questions(), 25);
    }

    #[test]
    fn countdown_is_primed_but_idle_before_start() {
        let mut session =
            ExamSession::new(ExamKind::Aptitude, vec![build_question(1)]).unwrap();
        assert_eq!(session.time_remaining(), 20 * 60);
        assert_eq!(session.tick(), None);
        assert_eq!(session.time_remaining(), 20 * 60);
    }

    #[test]
    fn start_twice_is_an_error() {
        let mut session = running_session(1);
        assert_eq!(
            session.start(fixed_now()).unwrap_err(),
            ExamSessionError::AlreadyStarted
        );
    }

    #[test]
    fn reselecting_replaces_the_answer() {
        let mut session = running_session(2);
        session.select_option(OptionLetter::C).unwrap();
        session.select_option(OptionLetter::D).unwrap();

        assert_eq!(session.answered_count(), 1);
        assert_eq!(
            session.answer_for(&QuestionId::new("q1")),
            Some(OptionLetter::D)
        );
    }

    #[test]
    fn unavailable_option_is_rejected() {
        let question = Question::new(
            QuestionId::new("q1"),
            "True or false?",
            "True",
            "False",
            "",
            "",
            None,
        );
        let mut session = ExamSession::new(ExamKind::Aptitude, vec![question]).unwrap();
        session.start(fixed_now()).unwrap();

        let err = session.select_option(OptionLetter::C).unwrap_err();
        assert_eq!(
            err,
            ExamSessionError::UnavailableOption {
                letter: OptionLetter::C
            }
        );
        // The synthetic unsure option is always accepted.
        session.select_option(OptionLetter::E).unwrap();
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut session = running_session(3);
        session.previous_question().unwrap();
        assert_eq!(session.current_index(), 0);

        session.jump_to(2).unwrap();
        session.next_question().unwrap();
        assert_eq!(session.current_index(), 2);

        assert_eq!(
            session.jump_to(3).unwrap_err(),
            ExamSessionError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn final_tick_reaches_zero_and_triggers_timeout() {
        let mut session = running_session(1);
        session.time_remaining = 2;

        assert_eq!(session.tick(), None);
        assert_eq!(session.time_remaining(), 1);
        assert_eq!(session.tick(), Some(SubmitTrigger::Timeout));
        assert_eq!(session.time_remaining(), 0);
    }

    #[test]
    fn visibility_loss_sets_flag_and_triggers() {
        let mut session = running_session(1);
        assert_eq!(
            session.record_visibility_lost(),
            Some(SubmitTrigger::Violation)
        );
        assert!(session.violation());
    }

    #[test]
    fn racing_triggers_submit_exactly_once() {
        let mut session = running_session(1);
        session.time_remaining = 1;

        let timeout = session.tick().unwrap();
        session.begin_submit(timeout).unwrap();

        // A visibility change on the same tick must be swallowed.
        assert_eq!(session.record_visibility_lost(), None);
        assert_eq!(
            session.begin_submit(SubmitTrigger::Violation).unwrap_err(),
            ExamSessionError::AlreadySubmitting
        );

        let outcome = session.complete_submit(fixed_now()).unwrap();
        assert_eq!(outcome, ExamOutcome::TimedOut);
        assert_eq!(session.phase(), ExamPhase::Terminated(ExamOutcome::TimedOut));
    }

    #[test]
    fn ticks_after_termination_are_inert() {
        let mut session = running_session(1);
        let payload = session.begin_submit(SubmitTrigger::Manual).unwrap();
        assert!(payload.answers.is_empty());
        session.complete_submit(fixed_now()).unwrap();

        assert_eq!(session.tick(), None);
        assert_eq!(session.record_visibility_lost(), None);
        assert_eq!(
            session.select_option(OptionLetter::A).unwrap_err(),
            ExamSessionError::NotInProgress
        );
    }

    #[test]
    fn payload_keeps_question_order_and_skips_unanswered() {
        let mut session = running_session(3);
        // Answer the third question first, then the first.
        session.jump_to(2).unwrap();
        session.select_option(OptionLetter::B).unwrap();
        session.jump_to(0).unwrap();
        session.select_option(OptionLetter::A).unwrap();

        let payload = session.begin_submit(SubmitTrigger::Manual).unwrap();
        assert_eq!(payload.answers.len(), 2);
        assert_eq!(payload.answers[0].question_id, QuestionId::new("q1"));
        assert_eq!(payload.answers[1].question_id, QuestionId::new("q3"));
        assert!(!payload.violation);
    }

    #[test]
    fn violation_flag_travels_with_the_payload() {
        let mut session = running_session(1);
        session.select_option(OptionLetter::E).unwrap();
        let trigger = session.record_visibility_lost().unwrap();

        let payload = session.begin_submit(trigger).unwrap();
        assert!(payload.violation);
        assert_eq!(payload.answers.len(), 1);

        let outcome = session.complete_submit(fixed_now()).unwrap();
        assert_eq!(outcome, ExamOutcome::Violation);
    }

    #[test]
    fn failed_submission_parks_with_answers_intact() {
        let mut session = running_session(2);
        session.select_option(OptionLetter::C).unwrap();
        session.begin_submit(SubmitTrigger::Manual).unwrap();
        session.fail_submit().unwrap();

        assert_eq!(session.phase(), ExamPhase::SubmitFailed);
        assert_eq!(
            session.answer_for(&QuestionId::new("q1")),
            Some(OptionLetter::C)
        );
        // No retry path: a fresh trigger cannot restart the submission.
        assert_eq!(
            session.begin_submit(SubmitTrigger::Manual).unwrap_err(),
            ExamSessionError::NotInProgress
        );
    }

    #[test]
    fn low_time_warning_uses_per_kind_threshold() {
        let mut aptitude = running_session(1);
        aptitude.time_remaining = 59;
        assert!(aptitude.low_on_time());
        aptitude.time_remaining = 61;
        assert!(!aptitude.low_on_time());

        let questions = vec![build_question(1)];
        let mut domain = ExamSession::new(ExamKind::Domain, questions).unwrap();
        domain.start(fixed_now()).unwrap();
        domain.time_remaining = 299;
        assert!(domain.low_on_time());
    }
}
