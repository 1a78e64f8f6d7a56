//! TOML-based PromptVersionRepository implementation.
//!
//! Stores each saved prompt as one TOML file, named by record id, going
//! through the versioned `PromptRecordV1` DTO at the storage boundary:
//!
//! ```text
//! base_dir/
//! └── prompts/
//!     ├── record-id-1.toml
//!     └── record-id-2.toml
//! ```

use crate::paths::ForgePaths;
use anyhow::Context;
use async_trait::async_trait;
use promptforge_core::error::{PromptForgeError, Result};
use promptforge_core::version::PromptVersionRepository;
use promptforge_types::{PromptRecord, PromptRecordV1, SavedVersion};
use std::fs;
use std::path::{Path, PathBuf};

/// A repository implementation for storing prompt records in TOML files.
pub struct TomlPromptRepository {
    base_dir: PathBuf,
}

impl TomlPromptRepository {
    /// Creates a new `TomlPromptRepository` with the specified base directory.
    ///
    /// The directory structure will be created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory structure cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let prompts_dir = base_dir.join("prompts");
        fs::create_dir_all(&prompts_dir)
            .context("Failed to create prompts directory")?;
        Ok(Self { base_dir })
    }

    /// Creates a `TomlPromptRepository` at the default location
    /// (`~/.config/promptforge`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or if
    /// the directory structure cannot be created.
    pub fn default_location() -> Result<Self> {
        let base_dir = ForgePaths::config_dir().map_err(PromptForgeError::persistence)?;
        Self::new(base_dir)
    }

    /// Returns the file path for a given record id.
    fn record_file_path(&self, id: &str) -> PathBuf {
        self.base_dir.join("prompts").join(format!("{}.toml", id))
    }

    fn read_record(&self, path: &Path) -> Result<PromptRecord> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record at {:?}", path))?;
        let dto: PromptRecordV1 = toml::from_str(&content)?;
        Ok(dto.into())
    }

    /// Loads every stored record. Files that fail to parse are skipped with
    /// a warning rather than failing the whole listing.
    fn load_all(&self) -> Result<Vec<PromptRecord>> {
        let prompts_dir = self.base_dir.join("prompts");
        let mut records = Vec::new();
        for entry in fs::read_dir(&prompts_dir)
            .with_context(|| format!("Failed to list {:?}", prompts_dir))?
        {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            match self.read_record(&path) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!("Skipping unreadable record {:?}: {}", path, err);
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl PromptVersionRepository for TomlPromptRepository {
    async fn save(&self, record: &PromptRecord) -> Result<SavedVersion> {
        let dto = PromptRecordV1::from(record);
        let content = toml::to_string_pretty(&dto)?;
        fs::write(self.record_file_path(&record.id), content)
            .with_context(|| format!("Failed to write record {}", record.id))?;
        Ok(SavedVersion {
            id: record.id.clone(),
            version: record.version,
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>> {
        let path = self.record_file_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_record(&path).map(Some)
    }

    async fn list_versions(&self, root_id: &str) -> Result<Vec<PromptRecord>> {
        let mut members: Vec<PromptRecord> = self
            .load_all()?
            .into_iter()
            .filter(|record| {
                record.id == root_id || record.parent_id.as_deref() == Some(root_id)
            })
            .collect();
        members.sort_by_key(|record| record.version);
        Ok(members)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_file_path(id);
        if !path.exists() {
            return Ok(());
        }

        // A root takes its whole family with it.
        let is_root = self.read_record(&path)?.parent_id.is_none();
        if is_root {
            for record in self.load_all()? {
                if record.parent_id.as_deref() == Some(id) {
                    fs::remove_file(self.record_file_path(&record.id)).with_context(
                        || format!("Failed to delete child record {}", record.id),
                    )?;
                }
            }
        }

        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete record {}", id))?;
        Ok(())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<PromptRecord>> {
        let needle = query.to_lowercase();
        let mut hits: Vec<PromptRecord> = self
            .load_all()?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .filter(|record| {
                record.original_input.to_lowercase().contains(&needle)
                    || record.generated_prompt.to_lowercase().contains(&needle)
            })
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits)
    }

    async fn count(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, parent: Option<&str>, version: u32, text: &str) -> PromptRecord {
        PromptRecord {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            version,
            user_id: "user-1".to_string(),
            original_input: "help me write an email".to_string(),
            generated_prompt: text.to_string(),
            mode: "guided_five_question".to_string(),
            questions_snapshot: None,
            created_at: format!("2025-01-0{}T00:00:00Z", version),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPromptRepository::new(dir.path()).unwrap();

        let original = record("root-1", None, 1, "Polished prompt text");
        repo.save(&original).await.unwrap();

        let loaded = repo.find_by_id("root-1").await.unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPromptRepository::new(dir.path()).unwrap();
        assert!(repo.find_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_family_listing_and_cascade_delete() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPromptRepository::new(dir.path()).unwrap();

        repo.save(&record("root-1", None, 1, "v1")).await.unwrap();
        repo.save(&record("child-1", Some("root-1"), 2, "v2"))
            .await
            .unwrap();
        repo.save(&record("other", None, 1, "unrelated"))
            .await
            .unwrap();

        let family = repo.list_versions("root-1").await.unwrap();
        assert_eq!(family.len(), 2);
        assert_eq!(family[0].version, 1);
        assert_eq!(family[1].version, 2);

        repo.delete("root-1").await.unwrap();
        assert!(repo.list_versions("root-1").await.unwrap().is_empty());
        // Unrelated families survive.
        assert!(repo.find_by_id("other").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_child_only() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPromptRepository::new(dir.path()).unwrap();

        repo.save(&record("root-1", None, 1, "v1")).await.unwrap();
        repo.save(&record("child-1", Some("root-1"), 2, "v2"))
            .await
            .unwrap();

        repo.delete("child-1").await.unwrap();
        let family = repo.list_versions("root-1").await.unwrap();
        assert_eq!(family.len(), 1);
        assert_eq!(family[0].version, 1);
    }

    #[tokio::test]
    async fn test_search_and_count() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPromptRepository::new(dir.path()).unwrap();

        repo.save(&record("a", None, 1, "About dragons")).await.unwrap();
        repo.save(&record("b", None, 1, "About invoices")).await.unwrap();

        let hits = repo.search("user-1", "dragons").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert_eq!(repo.count("user-1").await.unwrap(), 2);
        assert_eq!(repo.count("nobody").await.unwrap(), 0);
    }
}
