//! In-memory PromptVersionRepository implementation.
//!
//! Backs tests and signed-out sessions where nothing should touch disk.
//! Records live only as long as the process.

use async_trait::async_trait;
use promptforge_core::error::Result;
use promptforge_core::version::PromptVersionRepository;
use promptforge_types::{PromptRecord, SavedVersion};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local prompt store.
#[derive(Debug, Default)]
pub struct MemoryPromptRepository {
    records: Mutex<HashMap<String, PromptRecord>>,
}

impl MemoryPromptRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn family_members(records: &HashMap<String, PromptRecord>, root_id: &str) -> Vec<PromptRecord> {
        let mut members: Vec<PromptRecord> = records
            .values()
            .filter(|record| {
                record.id == root_id || record.parent_id.as_deref() == Some(root_id)
            })
            .cloned()
            .collect();
        members.sort_by_key(|record| record.version);
        members
    }
}

#[async_trait]
impl PromptVersionRepository for MemoryPromptRepository {
    async fn save(&self, record: &PromptRecord) -> Result<SavedVersion> {
        let mut records = self.records.lock().expect("record store poisoned");
        records.insert(record.id.clone(), record.clone());
        Ok(SavedVersion {
            id: record.id.clone(),
            version: record.version,
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>> {
        let records = self.records.lock().expect("record store poisoned");
        Ok(records.get(id).cloned())
    }

    async fn list_versions(&self, root_id: &str) -> Result<Vec<PromptRecord>> {
        let records = self.records.lock().expect("record store poisoned");
        Ok(Self::family_members(&records, root_id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().expect("record store poisoned");
        // A root takes its whole family with it.
        let is_root = records
            .get(id)
            .map(|record| record.parent_id.is_none())
            .unwrap_or(false);
        if is_root {
            records.retain(|_, record| {
                record.id != id && record.parent_id.as_deref() != Some(id)
            });
        } else {
            records.remove(id);
        }
        Ok(())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<PromptRecord>> {
        let records = self.records.lock().expect("record store poisoned");
        let needle = query.to_lowercase();
        let mut hits: Vec<PromptRecord> = records
            .values()
            .filter(|record| record.user_id == user_id)
            .filter(|record| {
                record.original_input.to_lowercase().contains(&needle)
                    || record.generated_prompt.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits)
    }

    async fn count(&self, user_id: &str) -> Result<u64> {
        let records = self.records.lock().expect("record store poisoned");
        Ok(records
            .values()
            .filter(|record| record.user_id == user_id)
            .count() as u64)
    }
}
