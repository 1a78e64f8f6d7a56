//! The round/iteration state machine.
//!
//! All session mutation goes through the command methods here. Each command
//! validates the current state, applies the transition, and returns the
//! effects the caller must perform (question fetches, generation calls).
//! Collaborator calls themselves happen outside the engine; their results
//! come back through the `complete_*` / `install_questions` / `abort_call`
//! commands carrying the [`CallTicket`] issued by [`SessionEngine::begin_call`].

use super::mode::EnhancementMode;
use super::model::PromptSession;
use super::state::{CallOutcome, CallTicket, Effect, SessionState, SynthesisKind};
use crate::answer::AnswerValue;
use crate::config::GUIDED_MIN_ANSWERED;
use crate::error::{PromptForgeError, Result};
use crate::i18n::Language;
use crate::question::Question;

/// Single-session state machine.
///
/// Owns the [`PromptSession`] and the per-round question batch. One engine
/// per user visit; there is no cross-session sharing.
#[derive(Debug)]
pub struct SessionEngine {
    session: PromptSession,
    state: SessionState,
    /// The current round's question batch, empty outside question phases.
    questions: Vec<Question>,
    /// Index of the question currently presented.
    cursor: usize,
    /// Highest question index reached this round; "Previous" moves the
    /// cursor below it without losing this frontier.
    frontier: usize,
    /// Single-flight guard: at most one collaborator call per session.
    call_in_flight: bool,
    /// Bumped on reset so late results from a torn-down session are
    /// discarded instead of applied.
    epoch: u64,
}

impl SessionEngine {
    /// Creates an idle engine for the given mode and language.
    pub fn new(mode: EnhancementMode, language: Language) -> Self {
        Self {
            session: PromptSession::new(mode, language),
            state: SessionState::Idle,
            questions: Vec::new(),
            cursor: 0,
            frontier: 0,
            call_in_flight: false,
            epoch: 0,
        }
    }

    // ============================================================================
    // Read access
    // ============================================================================

    /// The session data (read-only; mutation goes through commands).
    pub fn session(&self) -> &PromptSession {
        &self.session
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The question currently presented, if the session is awaiting answers.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::AwaitingAnswers { .. } => self.questions.get(self.cursor),
            _ => None,
        }
    }

    /// The current round's full question batch.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Zero-based index of the current question within the round.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a collaborator call is outstanding.
    pub fn call_in_flight(&self) -> bool {
        self.call_in_flight
    }

    // ============================================================================
    // Commands
    // ============================================================================

    /// Starts the session from the user's raw input.
    ///
    /// SuperLazy goes straight to a synthesis effect; question modes ask for
    /// the first round's batch. Re-invoking from `Idle` replaces the input,
    /// which is how a failed SuperLazy synthesis is retried.
    ///
    /// # Errors
    ///
    /// `Validation` if the input is blank, a call is in flight, or the
    /// session has already progressed past `Idle`.
    pub fn start(&mut self, input: impl Into<String>) -> Result<Vec<Effect>> {
        self.ensure_no_call_in_flight()?;
        if !matches!(self.state, SessionState::Idle) {
            return Err(PromptForgeError::validation(
                "session already started; use start_over to reset",
            ));
        }

        let input = input.into();
        if input.trim().is_empty() {
            return Err(PromptForgeError::validation("input must not be empty"));
        }

        self.session.original_input = input;
        self.session.current_round = 1;

        if self.session.mode.asks_questions() {
            self.state = SessionState::FetchingQuestions { round: 1 };
            Ok(vec![Effect::FetchQuestions { round: 1 }])
        } else {
            // SuperLazy: state stays Idle so a failed call lands back on
            // the untouched pre-call state.
            Ok(vec![Effect::RequestSynthesis {
                kind: SynthesisKind::SuperLazy,
            }])
        }
    }

    /// Submits an answer for the current question and advances the cursor.
    ///
    /// Re-answering after "Previous" overwrites in place and returns the
    /// cursor to the frontier. Answering the round's last open question
    /// transitions to `RoundComplete` automatically once the round's
    /// minimum is met.
    ///
    /// # Errors
    ///
    /// `Validation` on blank answers, unknown options, or when the session
    /// is not awaiting answers.
    pub fn submit_answer(&mut self, value: AnswerValue) -> Result<Vec<Effect>> {
        self.ensure_no_call_in_flight()?;
        let SessionState::AwaitingAnswers { round } = self.state else {
            return Err(PromptForgeError::validation(
                "no question is awaiting an answer",
            ));
        };

        if matches!(value, AnswerValue::Skipped) {
            return self.skip_current();
        }

        let question = self.questions.get(self.cursor).ok_or_else(|| {
            PromptForgeError::validation("all questions in this round are done")
        })?;

        match &value {
            AnswerValue::Selected(text) => {
                if text.trim().is_empty() {
                    return Err(PromptForgeError::validation(
                        "selected option must not be empty",
                    ));
                }
                if !question.options.is_empty() && !question.has_option(text) {
                    return Err(PromptForgeError::validation(format!(
                        "'{}' is not an option of '{}'",
                        text, question.topic
                    )));
                }
            }
            AnswerValue::Custom(text) => {
                // A blank custom answer is "no answer yet", not a skip.
                if text.trim().is_empty() {
                    return Err(PromptForgeError::validation(
                        "custom answer must not be empty",
                    ));
                }
            }
            AnswerValue::Skipped => unreachable!("handled above"),
        }

        let topic = question.topic.clone();
        self.session.answers.record(topic, value);
        self.advance_cursor(round);
        Ok(vec![])
    }

    /// Skips the current question, recording an explicit skip.
    ///
    /// Skips always advance and count toward round completion in modes
    /// that permit partial completion.
    pub fn skip_current(&mut self) -> Result<Vec<Effect>> {
        self.ensure_no_call_in_flight()?;
        let SessionState::AwaitingAnswers { round } = self.state else {
            return Err(PromptForgeError::validation("no question to skip"));
        };
        let question = self.questions.get(self.cursor).ok_or_else(|| {
            PromptForgeError::validation("all questions in this round are done")
        })?;

        // Do not wipe a real answer when skipping past a revisited question.
        let topic = question.topic.clone();
        if !self
            .session
            .answers
            .get(&topic)
            .is_some_and(AnswerValue::is_answered)
        {
            self.session.answers.record(topic, AnswerValue::Skipped);
        }
        self.advance_cursor(round);
        Ok(vec![])
    }

    /// Moves the cursor back to the previous question for overwriting.
    ///
    /// Only available in modes with a linear revisitable batch
    /// (GuidedFiveQuestion). Forward progress is kept: the next submit
    /// returns to the frontier.
    pub fn previous(&mut self) -> Result<()> {
        self.ensure_no_call_in_flight()?;
        if !self.session.mode.allows_revisiting() {
            return Err(PromptForgeError::validation(
                "previous is not available in this mode",
            ));
        }
        match self.state {
            SessionState::AwaitingAnswers { .. } if self.cursor > 0 => {
                self.cursor -= 1;
                Ok(())
            }
            SessionState::RoundComplete { round } if !self.questions.is_empty() => {
                self.state = SessionState::AwaitingAnswers { round };
                self.cursor = self.questions.len() - 1;
                Ok(())
            }
            _ => Err(PromptForgeError::validation("nothing to go back to")),
        }
    }

    /// Confirms the round and asks for the mode's next generation call.
    ///
    /// Permitted from `AwaitingAnswers` (early confirm) once the minimum is
    /// met, and from `RoundComplete` (also the retry path after a failed
    /// synthesis).
    pub fn confirm_round(&mut self) -> Result<Vec<Effect>> {
        self.ensure_no_call_in_flight()?;
        let round = match self.state {
            SessionState::AwaitingAnswers { round }
            | SessionState::RoundComplete { round } => round,
            _ => {
                return Err(PromptForgeError::validation(
                    "there is no open round to confirm",
                ));
            }
        };

        if !self.round_satisfied() {
            return Err(PromptForgeError::validation(format!(
                "round {} needs more answers before it can complete",
                round
            )));
        }

        self.state = SessionState::RoundComplete { round };
        let kind = match self.session.mode {
            EnhancementMode::ThreeRoundTopic => SynthesisKind::Preliminary,
            EnhancementMode::IterativeAnalysis => SynthesisKind::Iteration,
            EnhancementMode::GuidedFiveQuestion => SynthesisKind::Final,
            EnhancementMode::SuperLazy => {
                return Err(PromptForgeError::internal(
                    "super-lazy sessions have no rounds",
                ));
            }
        };
        Ok(vec![Effect::RequestSynthesis { kind }])
    }

    /// Accepts the latest result and ends the session.
    ///
    /// Valid from a preliminary offer, from the iteration cap, and at any
    /// point of an iterative session once at least one iteration produced
    /// a result.
    pub fn accept_result(&mut self) -> Result<()> {
        self.ensure_no_call_in_flight()?;
        match self.state {
            SessionState::PreliminaryOffered { .. } | SessionState::MaxIterationsReached => {
                self.state = SessionState::Finished;
                Ok(())
            }
            SessionState::AwaitingAnswers { .. }
            | SessionState::RoundComplete { .. }
            | SessionState::FetchingQuestions { .. }
                if self.session.mode == EnhancementMode::IterativeAnalysis
                    && self.session.current_round > 1 =>
            {
                self.state = SessionState::Finished;
                Ok(())
            }
            _ => Err(PromptForgeError::validation("no result to accept yet")),
        }
    }

    /// Continues refining after a preliminary result.
    ///
    /// Advances to the next round, or to `MaxIterationsReached` when the
    /// round cap is already reached.
    pub fn continue_refining(&mut self) -> Result<Vec<Effect>> {
        self.ensure_no_call_in_flight()?;
        let SessionState::PreliminaryOffered { round } = self.state else {
            return Err(PromptForgeError::validation(
                "no preliminary result is being offered",
            ));
        };

        if round < self.session.mode.total_rounds() {
            let next = round + 1;
            self.session.current_round = next;
            self.state = SessionState::FetchingQuestions { round: next };
            Ok(vec![Effect::FetchQuestions { round: next }])
        } else {
            self.state = SessionState::MaxIterationsReached;
            Ok(vec![])
        }
    }

    /// Resets everything back to `Idle`, keeping mode and language.
    ///
    /// Bumps the epoch: a collaborator result still in flight will come
    /// back with a stale ticket and be discarded.
    pub fn start_over(&mut self) {
        self.epoch += 1;
        self.call_in_flight = false;
        let mode = self.session.mode;
        let language = self.session.language.clone();
        self.session = PromptSession::new(mode, language);
        self.questions.clear();
        self.cursor = 0;
        self.frontier = 0;
        self.state = SessionState::Idle;
    }

    // ============================================================================
    // Collaborator call lifecycle
    // ============================================================================

    /// Claims the single collaborator-call slot.
    ///
    /// # Errors
    ///
    /// `Validation` when a call is already in flight; concurrent calls
    /// could race to transition the machine inconsistently, so the second
    /// action is rejected rather than queued.
    pub fn begin_call(&mut self) -> Result<CallTicket> {
        if self.call_in_flight {
            return Err(PromptForgeError::validation(
                "a request is already in flight",
            ));
        }
        self.call_in_flight = true;
        Ok(CallTicket { epoch: self.epoch })
    }

    /// Releases the call slot after a failed collaborator call.
    ///
    /// The machine stays in its pre-call state; the user may retry the
    /// same action.
    pub fn abort_call(&mut self, ticket: CallTicket) {
        if ticket.epoch == self.epoch {
            self.call_in_flight = false;
        }
    }

    /// Installs a fetched (or fallback) question batch for its round.
    pub fn install_questions(
        &mut self,
        ticket: CallTicket,
        questions: Vec<Question>,
    ) -> Result<CallOutcome> {
        if ticket.epoch != self.epoch {
            tracing::debug!("discarding question batch from torn-down session");
            return Ok(CallOutcome::Stale);
        }
        self.call_in_flight = false;

        let SessionState::FetchingQuestions { round } = self.state else {
            return Err(PromptForgeError::internal(
                "no question batch was requested",
            ));
        };
        if questions.is_empty() {
            return Err(PromptForgeError::validation(
                "question batch must not be empty",
            ));
        }

        self.questions = questions;
        self.cursor = 0;
        self.frontier = 0;
        self.state = SessionState::AwaitingAnswers { round };
        Ok(CallOutcome::Applied(vec![]))
    }

    /// Applies a successful generation call of the given kind.
    ///
    /// The caller appends the produced version to the ledger only when the
    /// outcome is `Applied`; a `Stale` result belongs to a torn-down
    /// session and is dropped.
    pub fn complete_synthesis(
        &mut self,
        ticket: CallTicket,
        kind: SynthesisKind,
    ) -> Result<CallOutcome> {
        if ticket.epoch != self.epoch {
            tracing::debug!(?kind, "discarding generation result from torn-down session");
            return Ok(CallOutcome::Stale);
        }
        if !self.call_in_flight {
            return Err(PromptForgeError::internal(
                "no generation call is in flight",
            ));
        }
        self.call_in_flight = false;

        let effects = match kind {
            SynthesisKind::SuperLazy | SynthesisKind::Final => {
                self.state = SessionState::Finished;
                vec![]
            }
            SynthesisKind::Preliminary => {
                let round = self.session.current_round;
                self.state = SessionState::PreliminaryOffered { round };
                vec![]
            }
            SynthesisKind::Iteration => {
                let round = self.session.current_round;
                if round < self.session.mode.total_rounds() {
                    let next = round + 1;
                    self.session.current_round = next;
                    self.state = SessionState::FetchingQuestions { round: next };
                    vec![Effect::FetchQuestions { round: next }]
                } else {
                    self.state = SessionState::MaxIterationsReached;
                    vec![]
                }
            }
        };
        Ok(CallOutcome::Applied(effects))
    }

    /// Completes an auxiliary call (tweak of an existing result) that does
    /// not touch round or iteration counters.
    pub fn complete_tweak(&mut self, ticket: CallTicket) -> Result<CallOutcome> {
        if ticket.epoch != self.epoch {
            return Ok(CallOutcome::Stale);
        }
        if !self.call_in_flight {
            return Err(PromptForgeError::internal("no tweak call is in flight"));
        }
        self.call_in_flight = false;
        Ok(CallOutcome::Applied(vec![]))
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn ensure_no_call_in_flight(&self) -> Result<()> {
        if self.call_in_flight {
            return Err(PromptForgeError::validation(
                "a request is already in flight",
            ));
        }
        Ok(())
    }

    /// Whether the current round meets its completion threshold.
    fn round_satisfied(&self) -> bool {
        match self.session.mode {
            EnhancementMode::SuperLazy => true,
            EnhancementMode::GuidedFiveQuestion => {
                let topics = self.questions.iter().map(|q| q.topic.as_str());
                self.session.answers.answered_among(topics) >= GUIDED_MIN_ANSWERED
            }
            // Every slot answered or explicitly skipped; skips advance.
            EnhancementMode::ThreeRoundTopic | EnhancementMode::IterativeAnalysis => self
                .questions
                .iter()
                .all(|q| self.session.answers.contains(&q.topic)),
        }
    }

    fn advance_cursor(&mut self, round: u32) {
        if self.cursor < self.frontier {
            // Revisit: return to the frontier without losing progress.
            self.cursor = self.frontier;
        } else {
            self.frontier += 1;
            self.cursor = self.frontier;
        }
        if self.cursor >= self.questions.len() && self.round_satisfied() {
            self.state = SessionState::RoundComplete { round };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOPIC_SLOTS;

    fn guided_questions() -> Vec<Question> {
        (1..=5)
            .map(|i| Question::text(format!("q{}", i), format!("Question {}?", i)))
            .collect()
    }

    fn topic_questions() -> Vec<Question> {
        TOPIC_SLOTS
            .iter()
            .map(|topic| Question::text(*topic, format!("Tell me about {}", topic)))
            .collect()
    }

    fn answered(text: &str) -> AnswerValue {
        AnswerValue::Custom(text.to_string())
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut engine =
            SessionEngine::new(EnhancementMode::SuperLazy, Language::Auto);
        let err = engine.start("   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn test_super_lazy_happy_path() {
        let mut engine =
            SessionEngine::new(EnhancementMode::SuperLazy, Language::Auto);
        let effects = engine.start("help me write an email").unwrap();
        assert_eq!(
            effects,
            vec![Effect::RequestSynthesis {
                kind: SynthesisKind::SuperLazy
            }]
        );

        let ticket = engine.begin_call().unwrap();
        let outcome = engine
            .complete_synthesis(ticket, SynthesisKind::SuperLazy)
            .unwrap();
        assert_eq!(outcome, CallOutcome::Applied(vec![]));
        assert_eq!(engine.state(), SessionState::Finished);
    }

    #[test]
    fn test_super_lazy_failure_allows_retry() {
        let mut engine =
            SessionEngine::new(EnhancementMode::SuperLazy, Language::Auto);
        engine.start("help me write an email").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.abort_call(ticket);

        assert_eq!(engine.state(), SessionState::Idle);
        // Same submit action again.
        let effects = engine.start("help me write an email").unwrap();
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_guided_flow_with_minimum_answers() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        let effects = engine.start("make a prompt").unwrap();
        assert_eq!(effects, vec![Effect::FetchQuestions { round: 1 }]);

        let ticket = engine.begin_call().unwrap();
        let outcome = engine.install_questions(ticket, guided_questions()).unwrap();
        assert_eq!(outcome, CallOutcome::Applied(vec![]));
        assert_eq!(engine.state(), SessionState::AwaitingAnswers { round: 1 });

        // Answer three, skip two: meets the 3-of-5 minimum.
        engine.submit_answer(answered("a")).unwrap();
        engine.submit_answer(answered("b")).unwrap();
        engine.submit_answer(answered("c")).unwrap();
        engine.skip_current().unwrap();
        engine.skip_current().unwrap();

        assert_eq!(engine.state(), SessionState::RoundComplete { round: 1 });
        let effects = engine.confirm_round().unwrap();
        assert_eq!(
            effects,
            vec![Effect::RequestSynthesis {
                kind: SynthesisKind::Final
            }]
        );
    }

    #[test]
    fn test_guided_below_minimum_cannot_complete() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, guided_questions()).unwrap();

        engine.submit_answer(answered("a")).unwrap();
        engine.submit_answer(answered("b")).unwrap();
        engine.skip_current().unwrap();
        engine.skip_current().unwrap();
        engine.skip_current().unwrap();

        // Cursor is past the end but only two questions are answered.
        assert_eq!(engine.state(), SessionState::AwaitingAnswers { round: 1 });
        let err = engine.confirm_round().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_previous_overwrites_without_losing_progress() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, guided_questions()).unwrap();

        engine.submit_answer(answered("a")).unwrap();
        engine.submit_answer(answered("b")).unwrap();
        engine.submit_answer(answered("c")).unwrap();
        assert_eq!(engine.cursor(), 3);

        engine.previous().unwrap();
        engine.previous().unwrap();
        assert_eq!(engine.cursor(), 1);

        let before = engine.session().answered_count();
        engine.submit_answer(answered("b, but better")).unwrap();
        assert_eq!(engine.session().answered_count(), before);
        // Back at the frontier.
        assert_eq!(engine.cursor(), 3);
        assert_eq!(
            engine.session().answers.get("q2"),
            Some(&AnswerValue::Custom("b, but better".into()))
        );
    }

    #[test]
    fn test_previous_rejected_outside_guided_mode() {
        let mut engine =
            SessionEngine::new(EnhancementMode::ThreeRoundTopic, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, topic_questions()).unwrap();
        engine.submit_answer(answered("a")).unwrap();

        assert!(engine.previous().unwrap_err().is_validation());
    }

    #[test]
    fn test_topic_round_to_preliminary_to_next_round() {
        let mut engine =
            SessionEngine::new(EnhancementMode::ThreeRoundTopic, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, topic_questions()).unwrap();

        for slot in TOPIC_SLOTS {
            engine
                .submit_answer(answered(&format!("answer for {}", slot)))
                .unwrap();
        }
        assert_eq!(engine.state(), SessionState::RoundComplete { round: 1 });

        let effects = engine.confirm_round().unwrap();
        assert_eq!(
            effects,
            vec![Effect::RequestSynthesis {
                kind: SynthesisKind::Preliminary
            }]
        );

        let ticket = engine.begin_call().unwrap();
        engine
            .complete_synthesis(ticket, SynthesisKind::Preliminary)
            .unwrap();
        assert_eq!(
            engine.state(),
            SessionState::PreliminaryOffered { round: 1 }
        );

        let effects = engine.continue_refining().unwrap();
        assert_eq!(effects, vec![Effect::FetchQuestions { round: 2 }]);
        assert_eq!(engine.session().current_round, 2);
        // Round-1 answers are still accumulated.
        assert_eq!(engine.session().answered_count(), TOPIC_SLOTS.len());
    }

    #[test]
    fn test_accept_preliminary_finishes() {
        let mut engine =
            SessionEngine::new(EnhancementMode::ThreeRoundTopic, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, topic_questions()).unwrap();
        for _ in TOPIC_SLOTS {
            engine.skip_current().unwrap();
        }
        engine.confirm_round().unwrap();
        let ticket = engine.begin_call().unwrap();
        engine
            .complete_synthesis(ticket, SynthesisKind::Preliminary)
            .unwrap();

        engine.accept_result().unwrap();
        assert_eq!(engine.state(), SessionState::Finished);
    }

    #[test]
    fn test_continue_past_last_round_reaches_cap() {
        let mut engine =
            SessionEngine::new(EnhancementMode::ThreeRoundTopic, Language::Auto);
        engine.start("make a prompt").unwrap();

        for round in 1..=3 {
            let ticket = engine.begin_call().unwrap();
            engine.install_questions(ticket, topic_questions()).unwrap();
            for _ in TOPIC_SLOTS {
                engine.skip_current().unwrap();
            }
            engine.confirm_round().unwrap();
            let ticket = engine.begin_call().unwrap();
            engine
                .complete_synthesis(ticket, SynthesisKind::Preliminary)
                .unwrap();
            assert_eq!(
                engine.state(),
                SessionState::PreliminaryOffered { round }
            );
            assert!(engine.session().current_round <= engine.session().mode.total_rounds());
            let effects = engine.continue_refining().unwrap();
            if round < 3 {
                assert_eq!(effects, vec![Effect::FetchQuestions { round: round + 1 }]);
            } else {
                assert!(effects.is_empty());
            }
        }

        assert_eq!(engine.state(), SessionState::MaxIterationsReached);
        // Only finish actions remain.
        assert!(engine.confirm_round().unwrap_err().is_validation());
        engine.accept_result().unwrap();
        assert_eq!(engine.state(), SessionState::Finished);
    }

    #[test]
    fn test_iterative_advances_until_cap() {
        let mut engine =
            SessionEngine::new(EnhancementMode::IterativeAnalysis, Language::Auto);
        engine.start("make a prompt").unwrap();

        for round in 1..=5u32 {
            let ticket = engine.begin_call().unwrap();
            engine.install_questions(ticket, topic_questions()).unwrap();
            for _ in TOPIC_SLOTS {
                engine.skip_current().unwrap();
            }
            let effects = engine.confirm_round().unwrap();
            assert_eq!(
                effects,
                vec![Effect::RequestSynthesis {
                    kind: SynthesisKind::Iteration
                }]
            );
            let ticket = engine.begin_call().unwrap();
            let outcome = engine
                .complete_synthesis(ticket, SynthesisKind::Iteration)
                .unwrap();
            if round < 5 {
                assert_eq!(
                    outcome,
                    CallOutcome::Applied(vec![Effect::FetchQuestions {
                        round: round + 1
                    }])
                );
            } else {
                assert_eq!(outcome, CallOutcome::Applied(vec![]));
            }
            assert!(engine.session().current_round <= 5);
        }

        assert_eq!(engine.state(), SessionState::MaxIterationsReached);
    }

    #[test]
    fn test_iterative_accept_mid_flow() {
        let mut engine =
            SessionEngine::new(EnhancementMode::IterativeAnalysis, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, topic_questions()).unwrap();
        for _ in TOPIC_SLOTS {
            engine.skip_current().unwrap();
        }
        engine.confirm_round().unwrap();
        let ticket = engine.begin_call().unwrap();
        engine
            .complete_synthesis(ticket, SynthesisKind::Iteration)
            .unwrap();

        // Round 2 is fetching; a result from iteration 1 exists, so the
        // user may accept it instead of continuing.
        engine.accept_result().unwrap();
        assert_eq!(engine.state(), SessionState::Finished);
    }

    #[test]
    fn test_second_call_while_in_flight_is_rejected() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let _ticket = engine.begin_call().unwrap();

        assert!(engine.begin_call().unwrap_err().is_validation());
        assert!(
            engine
                .submit_answer(answered("a"))
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn test_failed_synthesis_leaves_state_and_allows_retry() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, guided_questions()).unwrap();
        for _ in 0..3 {
            engine.submit_answer(answered("x")).unwrap();
        }
        engine.skip_current().unwrap();
        engine.skip_current().unwrap();
        engine.confirm_round().unwrap();

        let round_before = engine.session().current_round;
        let ticket = engine.begin_call().unwrap();
        engine.abort_call(ticket);

        assert_eq!(engine.state(), SessionState::RoundComplete { round: 1 });
        assert_eq!(engine.session().current_round, round_before);
        // Retry the same action.
        let effects = engine.confirm_round().unwrap();
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_stale_result_after_start_over_is_discarded() {
        let mut engine =
            SessionEngine::new(EnhancementMode::SuperLazy, Language::Auto);
        engine.start("help me").unwrap();
        let ticket = engine.begin_call().unwrap();

        engine.start_over();
        let outcome = engine
            .complete_synthesis(ticket, SynthesisKind::SuperLazy)
            .unwrap();
        assert!(outcome.is_stale());
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(engine.session().original_input.is_empty());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        let questions = vec![
            Question::select("tone", "Which tone?", &[("Formal", ""), ("Casual", "")], true),
            Question::text("q2", "Question 2?"),
            Question::text("q3", "Question 3?"),
            Question::text("q4", "Question 4?"),
            Question::text("q5", "Question 5?"),
        ];
        engine.install_questions(ticket, questions).unwrap();

        let err = engine
            .submit_answer(AnswerValue::Selected("Sarcastic".into()))
            .unwrap_err();
        assert!(err.is_validation());
        // Custom override of the options is fine.
        engine
            .submit_answer(AnswerValue::Custom("Dry but friendly".into()))
            .unwrap();
    }

    #[test]
    fn test_blank_custom_answer_is_rejected_and_does_not_advance() {
        let mut engine =
            SessionEngine::new(EnhancementMode::GuidedFiveQuestion, Language::Auto);
        engine.start("make a prompt").unwrap();
        let ticket = engine.begin_call().unwrap();
        engine.install_questions(ticket, guided_questions()).unwrap();

        let err = engine
            .submit_answer(AnswerValue::Custom("   ".into()))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.cursor(), 0);
    }
}
