//! Shared persistence types for PromptForge.
//!
//! This crate holds the record shapes exchanged with the persistence
//! collaborator, decoupled from the domain crates so that storage backends
//! and the core engine do not depend on each other's internals.

mod prompt_record;

pub use prompt_record::{PromptRecord, PromptRecordV1, SavedVersion};
