//! Language selection and the string-lookup collaborator interface.
//!
//! The engine never embeds user-facing strings; it carries semantic keys
//! (topics, tweak names) and leaves rendering to the presentation layer.

use serde::{Deserialize, Serialize};

/// The language the synthesized prompt and questions should use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum Language {
    /// Let the generation collaborator detect the language from the input.
    #[default]
    Auto,
    /// An explicit BCP 47 language code chosen by the user (e.g. "en", "ja").
    Selected(String),
}

impl Language {
    /// The explicit code, if one was selected.
    pub fn code(&self) -> Option<&str> {
        match self {
            Language::Auto => None,
            Language::Selected(code) => Some(code),
        }
    }

    /// The value sent to the generation collaborator.
    pub fn as_request_value(&self) -> &str {
        self.code().unwrap_or("auto")
    }
}

/// String lookup service.
///
/// Implementations resolve semantic keys to localized strings. The engine
/// only hands keys and English fallbacks across this boundary.
pub trait Translator: Send + Sync {
    /// Resolves `key` for `language`, falling back to `fallback` and then
    /// to the key itself when no translation exists.
    fn translate(&self, language: &Language, key: &str, fallback: Option<&str>) -> String;
}

/// Pass-through implementation that always uses the fallback.
///
/// Suitable for tests and for English-only presentation layers.
#[derive(Debug, Clone, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate(&self, _language: &Language, key: &str, fallback: Option<&str>) -> String {
        fallback.unwrap_or(key).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_request_value() {
        assert_eq!(Language::Auto.as_request_value(), "auto");
        assert_eq!(Language::Selected("ja".into()).as_request_value(), "ja");
    }

    #[test]
    fn test_noop_translator_prefers_fallback() {
        let t = NoopTranslator;
        assert_eq!(t.translate(&Language::Auto, "goal", Some("Goal")), "Goal");
        assert_eq!(t.translate(&Language::Auto, "goal", None), "goal");
    }
}
