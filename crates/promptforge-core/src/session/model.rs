//! Session domain model.

use super::mode::EnhancementMode;
use crate::answer::AnswerSheet;
use crate::i18n::Language;
use serde::{Deserialize, Serialize};

/// One user's in-memory enhancement session.
///
/// Lives from the first input until "Start Over" or page teardown; it is
/// never persisted. The engine owns it exclusively and mutates it through
/// command methods only (single-writer discipline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSession {
    /// The raw request the user started from. Immutable once a round has
    /// started; replaced only by a full reset.
    pub original_input: String,
    /// Flow variant, chosen once per session.
    pub mode: EnhancementMode,
    /// Output language preference.
    pub language: Language,
    /// Current round/iteration, 1-based, bounded by `mode.total_rounds()`.
    pub current_round: u32,
    /// Accumulated answers across all rounds so far.
    pub answers: AnswerSheet,
}

impl PromptSession {
    /// Creates an empty session for the given mode and language.
    pub fn new(mode: EnhancementMode, language: Language) -> Self {
        Self {
            original_input: String::new(),
            mode,
            language,
            current_round: 1,
            answers: AnswerSheet::new(),
        }
    }

    /// Count of non-blank answers accumulated so far.
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }
}
