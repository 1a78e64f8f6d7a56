//! Version tracking for generated prompts.
//!
//! - `model`: the immutable [`GeneratedPromptVersion`]
//! - `ledger`: the in-memory family ledger and version-number authority
//! - `repository`: the persistence collaborator trait

mod ledger;
mod model;
mod repository;

pub use ledger::{VersionDraft, VersionLedger};
pub use model::GeneratedPromptVersion;
pub use repository::PromptVersionRepository;
