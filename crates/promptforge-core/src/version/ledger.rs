//! Client-side ledger of generated prompt versions.
//!
//! Tracks the chain of versions produced by successive synthesis and tweak
//! calls, assigns version numbers, and supports reverting to any past
//! version. The ledger is the version-number authority; the persistence
//! collaborator stores what the ledger assigned.

use super::model::GeneratedPromptVersion;
use crate::error::{PromptForgeError, Result};
use crate::session::EnhancementMode;

/// Input for appending a version; the ledger fills in id, version number
/// and timestamp.
#[derive(Debug, Clone)]
pub struct VersionDraft {
    /// Root id of the family to extend, or `None` to start a new family.
    pub family_root: Option<String>,
    pub original_input: String,
    pub generated_text: String,
    pub mode: EnhancementMode,
    pub questions_snapshot: Option<String>,
}

#[derive(Debug, Clone)]
struct Family {
    root_id: String,
    /// Next version number to assign. Monotonic: deletions never wind it
    /// back, so numbers are never reused.
    next_version: u32,
    /// Versions in append order (ascending version numbers).
    versions: Vec<GeneratedPromptVersion>,
}

/// In-memory version ledger for the current visit.
#[derive(Debug, Clone, Default)]
pub struct VersionLedger {
    families: Vec<Family>,
}

impl VersionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a version, assigning the family's next number.
    ///
    /// A draft without `family_root` starts a new family whose root this
    /// version becomes (version 1).
    ///
    /// # Errors
    ///
    /// `NotFound` if `family_root` names an unknown family.
    pub fn append(&mut self, draft: VersionDraft) -> Result<GeneratedPromptVersion> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        match draft.family_root {
            None => {
                let version = GeneratedPromptVersion {
                    id: id.clone(),
                    parent_id: None,
                    version: 1,
                    original_input: draft.original_input,
                    generated_text: draft.generated_text,
                    mode: draft.mode,
                    questions_snapshot: draft.questions_snapshot,
                    created_at,
                };
                self.families.push(Family {
                    root_id: id,
                    next_version: 2,
                    versions: vec![version.clone()],
                });
                Ok(version)
            }
            Some(root_id) => {
                let family = self
                    .families
                    .iter_mut()
                    .find(|family| family.root_id == root_id)
                    .ok_or_else(|| {
                        PromptForgeError::not_found("prompt family", root_id.clone())
                    })?;
                let version = GeneratedPromptVersion {
                    id,
                    parent_id: Some(root_id),
                    version: family.next_version,
                    original_input: draft.original_input,
                    generated_text: draft.generated_text,
                    mode: draft.mode,
                    questions_snapshot: draft.questions_snapshot,
                    created_at,
                };
                family.next_version += 1;
                family.versions.push(version.clone());
                Ok(version)
            }
        }
    }

    /// All versions of a family, ordered by version ascending.
    pub fn list_family(&self, root_id: &str) -> Vec<&GeneratedPromptVersion> {
        self.families
            .iter()
            .find(|family| family.root_id == root_id)
            .map(|family| family.versions.iter().collect())
            .unwrap_or_default()
    }

    /// The highest version of a family, if it has any versions left.
    pub fn latest(&self, root_id: &str) -> Option<&GeneratedPromptVersion> {
        self.families
            .iter()
            .find(|family| family.root_id == root_id)
            .and_then(|family| family.versions.last())
    }

    /// Looks a version up by id across all families (revert support).
    pub fn get(&self, id: &str) -> Option<&GeneratedPromptVersion> {
        self.families
            .iter()
            .flat_map(|family| family.versions.iter())
            .find(|version| version.id == id)
    }

    /// The iteration number shown for a family: the number of the most
    /// recently assigned version, even if that version was deleted since.
    pub fn iteration_number(&self, root_id: &str) -> u32 {
        self.families
            .iter()
            .find(|family| family.root_id == root_id)
            .map(|family| family.next_version - 1)
            .unwrap_or(0)
    }

    /// Deletes a version.
    ///
    /// Deleting the root removes the whole family; deleting a child removes
    /// only that entry and never renumbers its siblings.
    ///
    /// # Errors
    ///
    /// `NotFound` if no version has this id.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if let Some(index) = self
            .families
            .iter()
            .position(|family| family.root_id == id)
        {
            self.families.remove(index);
            return Ok(());
        }

        for family in &mut self.families {
            if let Some(index) = family
                .versions
                .iter()
                .position(|version| version.id == id)
            {
                family.versions.remove(index);
                return Ok(());
            }
        }

        Err(PromptForgeError::not_found("prompt version", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(root: Option<&str>, text: &str) -> VersionDraft {
        VersionDraft {
            family_root: root.map(str::to_string),
            original_input: "help me write an email".to_string(),
            generated_text: text.to_string(),
            mode: EnhancementMode::SuperLazy,
            questions_snapshot: None,
        }
    }

    #[test]
    fn test_versions_are_numbered_in_append_order() {
        let mut ledger = VersionLedger::new();
        let root = ledger.append(draft(None, "v1")).unwrap();
        assert_eq!(root.version, 1);
        assert!(root.parent_id.is_none());

        let second = ledger.append(draft(Some(&root.id), "v2")).unwrap();
        let third = ledger.append(draft(Some(&root.id), "v3")).unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(third.version, 3);
        assert_eq!(second.parent_id.as_deref(), Some(root.id.as_str()));

        let numbers: Vec<u32> = ledger
            .list_family(&root.id)
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_delete_middle_version_does_not_renumber() {
        let mut ledger = VersionLedger::new();
        let root = ledger.append(draft(None, "v1")).unwrap();
        let second = ledger.append(draft(Some(&root.id), "v2")).unwrap();
        ledger.append(draft(Some(&root.id), "v3")).unwrap();

        ledger.delete(&second.id).unwrap();

        let numbers: Vec<u32> = ledger
            .list_family(&root.id)
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_version_numbers_are_never_reused() {
        let mut ledger = VersionLedger::new();
        let root = ledger.append(draft(None, "v1")).unwrap();
        let second = ledger.append(draft(Some(&root.id), "v2")).unwrap();
        ledger.delete(&second.id).unwrap();

        let third = ledger.append(draft(Some(&root.id), "again")).unwrap();
        assert_eq!(third.version, 3);
        assert_eq!(ledger.iteration_number(&root.id), 3);
    }

    #[test]
    fn test_delete_root_cascades_to_family() {
        let mut ledger = VersionLedger::new();
        let root = ledger.append(draft(None, "v1")).unwrap();
        let second = ledger.append(draft(Some(&root.id), "v2")).unwrap();

        ledger.delete(&root.id).unwrap();
        assert!(ledger.list_family(&root.id).is_empty());
        assert!(ledger.get(&second.id).is_none());
    }

    #[test]
    fn test_latest_and_revert_lookup() {
        let mut ledger = VersionLedger::new();
        let root = ledger.append(draft(None, "v1")).unwrap();
        let second = ledger.append(draft(Some(&root.id), "v2")).unwrap();

        assert_eq!(ledger.latest(&root.id).unwrap().id, second.id);
        // Revert path: any past version stays addressable.
        assert_eq!(ledger.get(&root.id).unwrap().generated_text, "v1");
    }

    #[test]
    fn test_append_to_unknown_family_fails() {
        let mut ledger = VersionLedger::new();
        let err = ledger.append(draft(Some("missing"), "v?")).unwrap_err();
        assert!(err.is_not_found());
    }
}
