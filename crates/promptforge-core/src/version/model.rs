//! Generated prompt version model.

use crate::session::EnhancementMode;
use promptforge_types::PromptRecord;
use serde::{Deserialize, Serialize};

/// One immutable synthesized result.
///
/// Created exactly once per successful generation call and never mutated
/// afterwards; edits and tweaks produce new versions in the same family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPromptVersion {
    /// Unique identifier (UUID format).
    pub id: String,
    /// The family root's id; `None` for the root itself.
    pub parent_id: Option<String>,
    /// Version within the family, 1-based, strictly increasing.
    pub version: u32,
    /// The raw input the family started from.
    pub original_input: String,
    /// The synthesized prompt text.
    pub generated_text: String,
    /// The mode that produced this version.
    pub mode: EnhancementMode,
    /// Serialized answers that fed this synthesis, if any.
    pub questions_snapshot: Option<String>,
    /// Timestamp when the version was created (ISO 8601 format).
    pub created_at: String,
}

impl GeneratedPromptVersion {
    /// The id of the family this version belongs to.
    pub fn family_root(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(&self.id)
    }

    /// Converts to the persistence record shape for the given owner.
    pub fn to_record(&self, user_id: impl Into<String>) -> PromptRecord {
        PromptRecord {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            version: self.version,
            user_id: user_id.into(),
            original_input: self.original_input.clone(),
            generated_prompt: self.generated_text.clone(),
            mode: self.mode.to_string(),
            questions_snapshot: self.questions_snapshot.clone(),
            created_at: self.created_at.clone(),
        }
    }
}
