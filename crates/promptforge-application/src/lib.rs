//! Use cases gluing the PromptForge core to its collaborators.
//!
//! `EnhancementService` runs one session's flow end to end; `LibraryService`
//! handles the auth-gated saved-prompt library.

mod enhancement_service;
mod library_service;

pub use enhancement_service::{EnhancementService, FlowView};
pub use library_service::LibraryService;
