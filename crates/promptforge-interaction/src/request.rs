//! Prompt synthesis request builder.
//!
//! Turns `{original input, accumulated answers, mode, round}` into the
//! exact `{system instruction, user payload}` pair for the provider,
//! paired with the response schema the caller must validate against.
//! Rendering is deterministic: identical session state produces identical
//! payloads.

use crate::Payload;
use crate::response::ExpectedSchema;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;
use promptforge_core::error::{PromptForgeError, Result};
use promptforge_core::i18n::Language;
use promptforge_core::session::{EnhancementMode, PromptSession};

/// A provider request together with its expected response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub payload: Payload,
    pub expected: ExpectedSchema,
}

const JSON_ONLY_RULE: &str = "Respond with a single JSON object and nothing else. \
Do not wrap it in markdown fences.";

const SUPER_LAZY_SYSTEM: &str = r#"You are a prompt engineer. The user gives you a rough,
underspecified request. Rewrite it into one polished, reusable prompt that a large
language model can act on directly. Fill sensible defaults for anything unspecified.
{{ json_rule }}
Schema: {"generatedText": string}"#;

const SUPER_LAZY_USER: &str = r#"Rough request:
{{ original_input }}"#;

const QUESTION_SYSTEM: &str = r#"You are a prompt engineer interviewing a user to sharpen a
rough request. Produce the clarifying questions for round {{ round }} of {{ total_rounds }}.
Each question addresses exactly one topic and offers a few concrete options the user can
pick from, plus room for a custom answer. Phrase questions in the output language.
{{ json_rule }}
Schema: {"questions": [{"topic": string, "question": string,
"kind": "select" | "text" | "textarea",
"options": [{"text": string, "emoji": string}], "allows_custom": boolean}]}"#;

const QUESTION_USER: &str = r#"Rough request:
{{ original_input }}
{% if serialized_answers %}
Answers so far:
{{ serialized_answers }}
{% endif %}
Round: {{ round }} of {{ total_rounds }}
Output language: {{ language }}"#;

const PRELIMINARY_SYSTEM: &str = r#"You are a prompt engineer. From the rough request and the
answers collected so far, write a usable draft prompt. It does not have to be final; the
user may keep refining it in later rounds.
{{ json_rule }}
Schema: {"preliminary_prompt": string}"#;

const FINAL_SYSTEM: &str = r#"You are a prompt engineer. From the rough request and every
collected answer, write the final polished prompt. Also suggest a few one-tap tweaks the
user might still want (e.g. "make funnier", "make shorter").
{{ json_rule }}
Schema: {"enhanced_prompt": string, "lazy_tweaks": [string]}"#;

const SYNTHESIS_USER: &str = r#"Rough request:
{{ original_input }}
{% if serialized_answers %}
Collected answers:
{{ serialized_answers }}
{% endif %}
Round: {{ round }} of {{ total_rounds }}
Output language: {{ language }}"#;

const ANALYSIS_SYSTEM: &str = r#"You are a prompt quality analyst. Score how actionable the
request is as an LLM prompt, name the areas that are still missing, and ask questions that
would fill the most important gaps of iteration {{ round }} of {{ total_rounds }}.
{{ json_rule }}
Schema: {"score": number between 0 and 100,
"score_label": "poor" | "fair" | "good" | "excellent",
"missing_areas": [string],
"questions": [{"topic": string, "question": string,
"kind": "select" | "text" | "textarea",
"options": [{"text": string, "emoji": string}], "allows_custom": boolean}]}"#;

const TWEAK_SYSTEM: &str = r#"You are a prompt engineer revising an already generated prompt.
Apply the requested adjustment without losing the prompt's intent or structure.
{{ json_rule }}
Schema: {"enhanced_prompt": string}"#;

const TWEAK_USER: &str = r#"Current prompt:
{{ existing_text }}

Adjustment: {{ tweak }}
Output language: {{ language }}"#;

static TEMPLATE_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    let templates = [
        ("super_lazy_system", SUPER_LAZY_SYSTEM),
        ("super_lazy_user", SUPER_LAZY_USER),
        ("question_system", QUESTION_SYSTEM),
        ("question_user", QUESTION_USER),
        ("preliminary_system", PRELIMINARY_SYSTEM),
        ("final_system", FINAL_SYSTEM),
        ("synthesis_user", SYNTHESIS_USER),
        ("analysis_system", ANALYSIS_SYSTEM),
        ("tweak_system", TWEAK_SYSTEM),
        ("tweak_user", TWEAK_USER),
    ];
    for (name, source) in templates {
        env.add_template(name, source)
            .expect("built-in template must parse");
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    TEMPLATE_ENV
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|err| PromptForgeError::internal(format!("template '{name}': {err}")))
}

/// Builds provider requests for every operation of every mode.
pub struct RequestBuilder;

impl RequestBuilder {
    /// The initial "no questions" request: original input only. The
    /// provider detects the language from the input itself.
    pub fn super_lazy(original_input: &str) -> Result<PreparedRequest> {
        let system = render(
            "super_lazy_system",
            context! { json_rule => JSON_ONLY_RULE },
        )?;
        let user = render(
            "super_lazy_user",
            context! { original_input => original_input },
        )?;
        Ok(PreparedRequest {
            payload: Payload::new(system, user),
            expected: ExpectedSchema::SuperLazy,
        })
    }

    /// The question-generation request for the session's current round.
    ///
    /// IterativeAnalysis sessions get their questions from the analysis
    /// schema; the other question modes use the plain batch schema.
    pub fn question_batch(session: &PromptSession) -> Result<PreparedRequest> {
        let (system_template, expected) = match session.mode {
            EnhancementMode::IterativeAnalysis => {
                ("analysis_system", ExpectedSchema::Analysis)
            }
            _ => ("question_system", ExpectedSchema::QuestionBatch),
        };

        let system = render(
            system_template,
            context! {
                json_rule => JSON_ONLY_RULE,
                round => session.current_round,
                total_rounds => session.mode.total_rounds(),
            },
        )?;
        let user = render("question_user", Self::session_context(session))?;
        Ok(PreparedRequest {
            payload: Payload::new(system, user),
            expected,
        })
    }

    /// The preliminary-result request after a topic round.
    pub fn preliminary(session: &PromptSession) -> Result<PreparedRequest> {
        let system = render(
            "preliminary_system",
            context! { json_rule => JSON_ONLY_RULE },
        )?;
        let user = render("synthesis_user", Self::session_context(session))?;
        Ok(PreparedRequest {
            payload: Payload::new(system, user),
            expected: ExpectedSchema::Preliminary,
        })
    }

    /// The final-synthesis request from all accumulated answers.
    ///
    /// Also used for each IterativeAnalysis iteration step: the per-step
    /// result shares the final schema.
    pub fn synthesis(session: &PromptSession) -> Result<PreparedRequest> {
        let system = render("final_system", context! { json_rule => JSON_ONLY_RULE })?;
        let user = render("synthesis_user", Self::session_context(session))?;
        Ok(PreparedRequest {
            payload: Payload::new(system, user),
            expected: ExpectedSchema::Final,
        })
    }

    /// A named tweak of an existing generated text ("make funnier").
    ///
    /// Does not involve the session's rounds at all.
    pub fn tweak(
        existing_text: &str,
        tweak: &str,
        language: &Language,
    ) -> Result<PreparedRequest> {
        let system = render("tweak_system", context! { json_rule => JSON_ONLY_RULE })?;
        let user = render(
            "tweak_user",
            context! {
                existing_text => existing_text,
                tweak => tweak,
                language => language.as_request_value(),
            },
        )?;
        Ok(PreparedRequest {
            payload: Payload::new(system, user),
            expected: ExpectedSchema::Improvement,
        })
    }

    fn session_context(session: &PromptSession) -> minijinja::Value {
        context! {
            original_input => session.original_input,
            serialized_answers => session.answers.serialize(),
            round => session.current_round,
            total_rounds => session.mode.total_rounds(),
            language => session.language.as_request_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::answer::AnswerValue;

    fn session(mode: EnhancementMode) -> PromptSession {
        let mut session = PromptSession::new(mode, Language::Auto);
        session.original_input = "help me write an email".to_string();
        session
    }

    #[test]
    fn test_super_lazy_request_contains_only_the_input() {
        let request = RequestBuilder::super_lazy("help me write an email").unwrap();
        assert_eq!(request.expected, ExpectedSchema::SuperLazy);
        assert!(request.payload.user_payload.contains("help me write an email"));
        assert!(!request.payload.user_payload.contains("Collected answers"));
        assert!(!request.payload.user_payload.contains("Output language"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let mut s = session(EnhancementMode::GuidedFiveQuestion);
        s.answers
            .record("goal", AnswerValue::Custom("apologize to a customer".into()));

        let first = RequestBuilder::synthesis(&s).unwrap();
        let second = RequestBuilder::synthesis(&s).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_synthesis_request_carries_answers_in_order() {
        let mut s = session(EnhancementMode::ThreeRoundTopic);
        s.answers
            .record("goal", AnswerValue::Custom("announce a launch".into()));
        s.answers
            .record("role", AnswerValue::Selected("marketing lead".into()));

        let request = RequestBuilder::synthesis(&s).unwrap();
        let body = &request.payload.user_payload;
        assert!(body.contains("goal: announce a launch"));
        assert!(body.contains("role: marketing lead"));
        assert!(
            body.find("goal: announce a launch").unwrap()
                < body.find("role: marketing lead").unwrap()
        );
    }

    #[test]
    fn test_question_batch_schema_depends_on_mode() {
        let guided = session(EnhancementMode::GuidedFiveQuestion);
        assert_eq!(
            RequestBuilder::question_batch(&guided).unwrap().expected,
            ExpectedSchema::QuestionBatch
        );

        let iterative = session(EnhancementMode::IterativeAnalysis);
        assert_eq!(
            RequestBuilder::question_batch(&iterative).unwrap().expected,
            ExpectedSchema::Analysis
        );
    }

    #[test]
    fn test_question_request_names_round_and_total() {
        let mut s = session(EnhancementMode::ThreeRoundTopic);
        s.current_round = 2;
        let request = RequestBuilder::question_batch(&s).unwrap();
        assert!(request.payload.user_payload.contains("Round: 2 of 3"));
    }

    #[test]
    fn test_selected_language_reaches_the_payload() {
        let mut s = session(EnhancementMode::GuidedFiveQuestion);
        s.language = Language::Selected("ja".into());
        let request = RequestBuilder::synthesis(&s).unwrap();
        assert!(request.payload.user_payload.contains("Output language: ja"));
    }

    #[test]
    fn test_tweak_request() {
        let request = RequestBuilder::tweak(
            "You are an email assistant.",
            "make funnier",
            &Language::Auto,
        )
        .unwrap();
        assert_eq!(request.expected, ExpectedSchema::Improvement);
        assert!(request.payload.user_payload.contains("make funnier"));
        assert!(
            request
                .payload
                .user_payload
                .contains("You are an email assistant.")
        );
    }
}
