//! Session domain module.
//!
//! This module contains the session model, the flow-mode enum, the state
//! machine driving rounds and iterations, and the effect/ticket types the
//! machine exchanges with the application layer.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`PromptSession`)
//! - `mode`: Flow variants (`EnhancementMode`)
//! - `state`: Session states, effects, and call tickets
//! - `engine`: The command-driven state machine (`SessionEngine`)

mod engine;
mod mode;
mod model;
mod state;

// Re-export public API
pub use engine::SessionEngine;
pub use mode::EnhancementMode;
pub use model::PromptSession;
pub use state::{CallOutcome, CallTicket, Effect, SessionState, SynthesisKind};
