//! Answer accumulation across question rounds.
//!
//! The accumulator is an insertion-ordered map from question topic to the
//! latest answer. Re-answering a topic overwrites in place; the first-seen
//! order is what the synthesis prompt renders, so it must stay stable.

use serde::{Deserialize, Serialize};

/// The recorded value for a single question topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// One of the question's offered options was selected.
    Selected(String),
    /// Free text, possibly overriding the offered options.
    Custom(String),
    /// The question was explicitly skipped.
    Skipped,
}

impl AnswerValue {
    /// Whether this value counts toward `answered_count`.
    ///
    /// Blank custom text is treated as no answer until real text arrives.
    pub fn is_answered(&self) -> bool {
        match self {
            AnswerValue::Selected(text) | AnswerValue::Custom(text) => {
                !text.trim().is_empty()
            }
            AnswerValue::Skipped => false,
        }
    }

    /// The answer text as it participates in synthesis, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Selected(text) | AnswerValue::Custom(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            }
            AnswerValue::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AnswerEntry {
    key: String,
    value: AnswerValue,
}

/// Insertion-ordered accumulator of per-topic answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    entries: Vec<AnswerEntry>,
}

impl AnswerSheet {
    /// Creates an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer under `key`.
    ///
    /// Last write wins: an existing entry is overwritten in place and keeps
    /// its original position; a new key is appended at the end.
    pub fn record(&mut self, key: impl Into<String>, value: AnswerValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(AnswerEntry { key, value }),
        }
    }

    /// Returns the recorded value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Whether any entry exists for `key` (answered or skipped).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Number of entries, including skipped ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with a non-blank answer.
    pub fn answered_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value.is_answered())
            .count()
    }

    /// Number of answered entries among the given keys.
    pub fn answered_among<'a, I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter(|key| self.get(key).is_some_and(AnswerValue::is_answered))
            .count()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    /// Renders the ordered `topic: answer` block consumed by the request
    /// builder and the answered-questions summary view.
    ///
    /// Pure function of the accumulated state: identical state renders an
    /// identical string. Skipped and blank entries are omitted.
    pub fn serialize(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if let Some(text) = entry.value.as_text() {
                lines.push(format!("{}: {}", entry.key, text));
            }
        }
        lines.join("\n")
    }

    /// Clears all recorded answers.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites_instead_of_duplicating() {
        let mut sheet = AnswerSheet::new();
        sheet.record("goal", AnswerValue::Selected("Write an email".into()));
        let once = sheet.answered_count();

        sheet.record("goal", AnswerValue::Custom("Write a polite email".into()));
        assert_eq!(sheet.answered_count(), once);
        assert_eq!(sheet.len(), 1);
        assert_eq!(
            sheet.get("goal"),
            Some(&AnswerValue::Custom("Write a polite email".into()))
        );
    }

    #[test]
    fn test_overwrite_keeps_original_position() {
        let mut sheet = AnswerSheet::new();
        sheet.record("goal", AnswerValue::Selected("a".into()));
        sheet.record("role", AnswerValue::Selected("b".into()));
        sheet.record("goal", AnswerValue::Custom("c".into()));

        let keys: Vec<&str> = sheet.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["goal", "role"]);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let mut sheet = AnswerSheet::new();
        sheet.record("goal", AnswerValue::Selected("Summarize a paper".into()));
        sheet.record("warning", AnswerValue::Skipped);
        sheet.record("context", AnswerValue::Custom("for a blog".into()));

        let first = sheet.serialize();
        let second = sheet.serialize();
        assert_eq!(first, second);
        assert_eq!(first, "goal: Summarize a paper\ncontext: for a blog");
    }

    #[test]
    fn test_blank_custom_text_is_not_answered() {
        let mut sheet = AnswerSheet::new();
        sheet.record("example", AnswerValue::Custom("   ".into()));
        assert_eq!(sheet.answered_count(), 0);
        assert!(sheet.contains("example"));
        assert_eq!(sheet.serialize(), "");

        sheet.record("example", AnswerValue::Custom("like this one".into()));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn test_skipped_counts_as_entry_but_not_answer() {
        let mut sheet = AnswerSheet::new();
        sheet.record("warning", AnswerValue::Skipped);
        assert!(sheet.contains("warning"));
        assert_eq!(sheet.answered_count(), 0);
    }

    #[test]
    fn test_answered_among_subset() {
        let mut sheet = AnswerSheet::new();
        sheet.record("goal", AnswerValue::Selected("x".into()));
        sheet.record("role", AnswerValue::Skipped);
        sheet.record("context", AnswerValue::Custom("y".into()));

        let count = sheet.answered_among(["goal", "role", "missing"]);
        assert_eq!(count, 1);
    }
}
