//! Prompt version repository trait.
//!
//! Defines the interface for the persistence collaborator. Each operation
//! is atomic from the engine's perspective; a failure surfaces as
//! `Persistence` and never corrupts in-memory session state.

use crate::error::Result;
use async_trait::async_trait;
use promptforge_types::{PromptRecord, SavedVersion};

/// An abstract store for saved prompt versions.
///
/// This trait decouples the engine from the specific storage mechanism
/// (files, a hosted table, a remote API). Version numbers are assigned by
/// the in-memory [`crate::version::VersionLedger`]; the store persists
/// them as given.
#[async_trait]
pub trait PromptVersionRepository: Send + Sync {
    /// Persists a record.
    ///
    /// # Returns
    ///
    /// The stored record's id/version pair.
    async fn save(&self, record: &PromptRecord) -> Result<SavedVersion>;

    /// Finds a record by its id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: record found
    /// - `Ok(None)`: record not found
    async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>>;

    /// Lists all stored versions of a family, ordered by version ascending.
    ///
    /// The root record itself is included.
    async fn list_versions(&self, root_id: &str) -> Result<Vec<PromptRecord>>;

    /// Deletes a record.
    ///
    /// Deleting a family root deletes the whole family; deleting a child
    /// leaves its siblings untouched.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Full-text search over a user's records (input and generated text).
    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<PromptRecord>>;

    /// Number of records stored for a user.
    async fn count(&self, user_id: &str) -> Result<u64>;
}
