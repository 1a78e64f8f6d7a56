pub mod library;
pub mod run;

use anyhow::{Result, anyhow};
use promptforge_core::i18n::Language;
use promptforge_interaction::{ClaudeApiAgent, GenerationAgent, OpenAiApiAgent};
use std::sync::Arc;

/// Maps the optional `--language` flag to the engine's language preference.
pub fn language_from_flag(flag: Option<String>) -> Language {
    match flag {
        Some(code) => Language::Selected(code),
        None => Language::Auto,
    }
}

/// Picks the first configured provider agent: Claude, then OpenAI.
pub fn select_agent() -> Result<Arc<dyn GenerationAgent>> {
    if let Ok(agent) = ClaudeApiAgent::try_from_env() {
        return Ok(Arc::new(agent));
    }
    if let Ok(agent) = OpenAiApiAgent::try_from_env() {
        return Ok(Arc::new(agent));
    }
    Err(anyhow!(
        "No provider configured. Add claude/openai credentials to \
         ~/.config/promptforge/secret.json or set ANTHROPIC_API_KEY / OPENAI_API_KEY."
    ))
}
