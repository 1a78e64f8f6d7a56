//! Clarifying question model.
//!
//! Questions are immutable once issued, whether they came from the
//! generation collaborator or from the built-in fallback tables.

use serde::{Deserialize, Serialize};

/// The input widget a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one of the offered options.
    Select,
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    Textarea,
}

/// One selectable option of a `Select` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Display text; also the recorded answer value when selected.
    pub text: String,
    /// Decorative emoji shown next to the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// A single clarifying question within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Semantic key, unique within a round (e.g. "goal", "audience").
    /// Answers are accumulated under this key across rounds.
    pub topic: String,
    /// The question text shown to the user. For collaborator-issued
    /// questions this is already in the session language; fallback
    /// questions carry i18n keys resolved at the presentation boundary.
    pub prompt_text: String,
    /// Expected input widget.
    pub kind: QuestionKind,
    /// Options for `Select` questions, in display order.
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// Whether a free-text override of the options is allowed.
    #[serde(default)]
    pub allows_custom: bool,
}

impl Question {
    /// Creates a free-text question with no options.
    pub fn text(topic: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            prompt_text: prompt_text.into(),
            kind: QuestionKind::Text,
            options: Vec::new(),
            allows_custom: true,
        }
    }

    /// Creates a select question from `(text, emoji)` pairs.
    pub fn select(
        topic: impl Into<String>,
        prompt_text: impl Into<String>,
        options: &[(&str, &str)],
        allows_custom: bool,
    ) -> Self {
        Self {
            topic: topic.into(),
            prompt_text: prompt_text.into(),
            kind: QuestionKind::Select,
            options: options
                .iter()
                .map(|(text, emoji)| QuestionOption {
                    text: (*text).to_string(),
                    emoji: if emoji.is_empty() {
                        None
                    } else {
                        Some((*emoji).to_string())
                    },
                })
                .collect(),
            allows_custom,
        }
    }

    /// Returns true if `value` matches one of this question's options.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|opt| opt.text == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_builder() {
        let q = Question::select(
            "goal",
            "What should the prompt achieve?",
            &[("Write something", "✍️"), ("Explain something", "")],
            true,
        );
        assert_eq!(q.kind, QuestionKind::Select);
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[0].emoji.as_deref(), Some("✍️"));
        assert!(q.options[1].emoji.is_none());
        assert!(q.has_option("Write something"));
        assert!(!q.has_option("Sing something"));
    }

    #[test]
    fn test_text_builder_allows_custom() {
        let q = Question::text("context", "Any background to include?");
        assert_eq!(q.kind, QuestionKind::Text);
        assert!(q.options.is_empty());
        assert!(q.allows_custom);
    }
}
