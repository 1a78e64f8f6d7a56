//! DTOs for prompt persistence and the stored prompt record.

use serde::{Deserialize, Serialize};

// --- Domain Record ---

/// A saved prompt version as the persistence collaborator sees it.
///
/// This is the "pure" record that the library/versioning logic operates on.
/// It is independent of any specific storage format or schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Unique record identifier (UUID format).
    pub id: String,
    /// Root record of this prompt family; `None` for the root itself.
    pub parent_id: Option<String>,
    /// Version number within the family, starting at 1.
    pub version: u32,
    /// Owner of the record.
    pub user_id: String,
    /// The raw input the user started from.
    pub original_input: String,
    /// The synthesized prompt text.
    pub generated_prompt: String,
    /// Name of the enhancement mode that produced this record.
    pub mode: String,
    /// Serialized `topic: answer` block that fed the synthesis, if any.
    pub questions_snapshot: Option<String>,
    /// Timestamp when the record was created (ISO 8601 format).
    pub created_at: String,
}

/// Identifier pair returned by a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVersion {
    pub id: String,
    pub version: u32,
}

// --- Data Transfer Objects (DTOs) for Persistence ---

/// Represents V1 of the prompt record schema for serialization.
/// This struct is what is actually written to and read from storage
/// (e.g., a TOML file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecordV1 {
    /// The schema version of this data structure.
    pub schema_version: String,

    /// Unique record identifier.
    pub id: String,
    /// Root record of this prompt family, absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Version number within the family.
    pub version: u32,
    /// Owner of the record.
    pub user_id: String,
    /// The raw input the user started from.
    pub original_input: String,
    /// The synthesized prompt text.
    pub generated_prompt: String,
    /// Name of the enhancement mode that produced this record.
    pub mode: String,
    /// Serialized answers that fed the synthesis, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_snapshot: Option<String>,
    /// Timestamp when the record was created (ISO 8601 format).
    pub created_at: String,
}

// --- Type Conversions ---

/// Convert PromptRecordV1 DTO to the domain record.
impl From<PromptRecordV1> for PromptRecord {
    fn from(dto: PromptRecordV1) -> Self {
        PromptRecord {
            id: dto.id,
            parent_id: dto.parent_id,
            version: dto.version,
            user_id: dto.user_id,
            original_input: dto.original_input,
            generated_prompt: dto.generated_prompt,
            mode: dto.mode,
            questions_snapshot: dto.questions_snapshot,
            created_at: dto.created_at,
        }
    }
}

/// Convert the domain record to a PromptRecordV1 DTO for persistence.
impl From<&PromptRecord> for PromptRecordV1 {
    fn from(record: &PromptRecord) -> Self {
        PromptRecordV1 {
            schema_version: "1".to_string(),
            id: record.id.clone(),
            parent_id: record.parent_id.clone(),
            version: record.version,
            user_id: record.user_id.clone(),
            original_input: record.original_input.clone(),
            generated_prompt: record.generated_prompt.clone(),
            mode: record.mode.clone(),
            questions_snapshot: record.questions_snapshot.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PromptRecord {
        PromptRecord {
            id: "rec-1".to_string(),
            parent_id: None,
            version: 1,
            user_id: "user-1".to_string(),
            original_input: "help me write an email".to_string(),
            generated_prompt: "You are an email assistant...".to_string(),
            mode: "super_lazy".to_string(),
            questions_snapshot: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_dto_round_trip() {
        let record = sample_record();
        let dto = PromptRecordV1::from(&record);
        assert_eq!(dto.schema_version, "1");
        let back: PromptRecord = dto.into();
        assert_eq!(back, record);
    }

    #[test]
    fn test_toml_serialization_omits_absent_options() {
        let dto = PromptRecordV1::from(&sample_record());
        let text = toml::to_string(&dto).unwrap();
        assert!(!text.contains("parent_id"));
        assert!(!text.contains("questions_snapshot"));

        let parsed: PromptRecordV1 = toml::from_str(&text).unwrap();
        assert_eq!(parsed, dto);
    }
}
