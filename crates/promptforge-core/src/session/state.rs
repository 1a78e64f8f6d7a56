//! Session state and the effects commands hand back to the caller.

use serde::{Deserialize, Serialize};

/// Where a session currently stands in its flow.
///
/// Transitions are driven exclusively by the command methods on
/// [`super::SessionEngine`]; the presentation layer only reads this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// No input submitted yet (or the session was reset).
    Idle,
    /// A question batch for `round` is being generated.
    FetchingQuestions { round: u32 },
    /// The user is answering the current round's questions.
    AwaitingAnswers { round: u32 },
    /// The round's questions are exhausted or confirmed; synthesis may run.
    RoundComplete { round: u32 },
    /// A preliminary result is on screen; the user chooses to accept or
    /// continue refining.
    PreliminaryOffered { round: u32 },
    /// Terminal: the user accepted a result.
    Finished,
    /// Terminal: the round/iteration cap was reached; only finish actions
    /// remain.
    MaxIterationsReached,
}

impl SessionState {
    /// True for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Finished | SessionState::MaxIterationsReached
        )
    }
}

/// What kind of generation call an effect asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisKind {
    /// Straight from the raw input, no questions.
    SuperLazy,
    /// Usable-but-not-final result after a topic round.
    Preliminary,
    /// Final result from the accumulated answers.
    Final,
    /// One analysis-driven iteration step.
    Iteration,
}

/// An instruction to the caller produced by a state transition.
///
/// The engine never performs collaborator calls itself; it tells the
/// application layer what to do next and waits for the completion command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Obtain the question batch for `round` (collaborator call, falling
    /// back to the built-in tables on failure).
    FetchQuestions { round: u32 },
    /// Run a generation call of the given kind. Never falls back.
    RequestSynthesis { kind: SynthesisKind },
}

/// Ticket handed out when a collaborator call starts.
///
/// Completion commands must present it; a ticket from before a reset no
/// longer matches the session epoch and its result is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTicket {
    pub(super) epoch: u64,
}

/// Result of a completion command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The result was applied; follow-up effects, if any.
    Applied(Vec<Effect>),
    /// The session was torn down while the call was in flight; the result
    /// was discarded and nothing changed.
    Stale,
}

impl CallOutcome {
    /// True when the result was discarded.
    pub fn is_stale(&self) -> bool {
        matches!(self, CallOutcome::Stale)
    }
}
