//! Saved-prompt library use case.
//!
//! Wraps the persistence collaborator behind the auth gate: saving requires
//! a signed-in user, reads degrade to empty results for anonymous visitors,
//! and a save failure is reported without touching any in-memory state.

use promptforge_core::auth::AuthService;
use promptforge_core::error::{PromptForgeError, Result};
use promptforge_core::version::{GeneratedPromptVersion, PromptVersionRepository};
use promptforge_types::{PromptRecord, SavedVersion};
use std::sync::Arc;

/// Auth-gated access to the saved prompt library.
pub struct LibraryService {
    repository: Arc<dyn PromptVersionRepository>,
    auth: Arc<dyn AuthService>,
}

impl LibraryService {
    /// Creates a library over the given store and auth collaborators.
    pub fn new(
        repository: Arc<dyn PromptVersionRepository>,
        auth: Arc<dyn AuthService>,
    ) -> Self {
        Self { repository, auth }
    }

    /// Persists a generated version under the signed-in user.
    ///
    /// # Errors
    ///
    /// `Validation` when nobody is signed in; `Persistence` when the store
    /// fails. Neither rolls back the in-memory version.
    pub async fn save_version(&self, version: &GeneratedPromptVersion) -> Result<SavedVersion> {
        let Some(user) = self.auth.current_user() else {
            return Err(PromptForgeError::validation(
                "sign in to save prompts to the library",
            ));
        };

        let record = version.to_record(user.id);
        let saved = self.repository.save(&record).await?;
        tracing::info!(id = %saved.id, version = saved.version, "saved prompt version");
        Ok(saved)
    }

    /// Lists all saved versions of a family, oldest first.
    ///
    /// Anonymous visitors get an empty list.
    pub async fn list_versions(&self, root_id: &str) -> Result<Vec<PromptRecord>> {
        if self.auth.current_user().is_none() {
            return Ok(Vec::new());
        }
        self.repository.list_versions(root_id).await
    }

    /// Deletes a saved record (family roots cascade). No-op when signed out.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.auth.current_user().is_none() {
            return Ok(());
        }
        self.repository.delete(id).await
    }

    /// Searches the signed-in user's saved prompts.
    pub async fn search(&self, query: &str) -> Result<Vec<PromptRecord>> {
        let Some(user) = self.auth.current_user() else {
            return Ok(Vec::new());
        };
        self.repository.search(&user.id, query).await
    }

    /// Number of prompts the signed-in user has saved.
    pub async fn count(&self) -> Result<u64> {
        let Some(user) = self.auth.current_user() else {
            return Ok(0);
        };
        self.repository.count(&user.id).await
    }
}
