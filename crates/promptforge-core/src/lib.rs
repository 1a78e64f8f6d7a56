//! PromptForge core domain.
//!
//! Everything that makes the enhancement flow tick, independent of any
//! provider, storage backend, or presentation layer: the round/iteration
//! state machine, the answer accumulator, the question model, the version
//! ledger, and the collaborator traits (persistence, auth, i18n).

pub mod answer;
pub mod auth;
pub mod config;
pub mod error;
pub mod i18n;
pub mod question;
pub mod session;
pub mod version;

// Re-export common error type
pub use error::{PromptForgeError, Result};
