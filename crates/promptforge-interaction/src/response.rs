//! Provider response parsing and validation.
//!
//! Providers return raw text that is expected to contain one JSON object,
//! possibly wrapped in prose. The substring between the first `{` and the
//! last `}` is parsed; anything unparsable is a `Parse` error, well-formed
//! JSON missing a required field is a `Schema` error. Neither is retried
//! automatically and neither is ever defaulted to empty content.

use promptforge_core::error::{PromptForgeError, Result};
use promptforge_core::question::{Question, QuestionKind, QuestionOption};
use serde_json::Value;

/// The exact response shape a request expects; one per known operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSchema {
    /// `{"questions": [{topic, question, ...}]}`
    QuestionBatch,
    /// `{"generatedText": "..."}`
    SuperLazy,
    /// `{"preliminary_prompt": "..."}`
    Preliminary,
    /// `{"enhanced_prompt": "...", "lazy_tweaks": ["..."]}`
    Final,
    /// `{"score": 0-100, "score_label": "...", "missing_areas": [...], "questions": [...]}`
    Analysis,
    /// `{"enhanced_prompt": "..."}`
    Improvement,
}

/// A validated, typed provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResponse {
    QuestionBatch(Vec<Question>),
    SuperLazy {
        generated_text: String,
    },
    Preliminary {
        preliminary_prompt: String,
    },
    Final {
        enhanced_prompt: String,
        lazy_tweaks: Vec<String>,
    },
    Analysis(AnalysisReport),
    Improvement {
        enhanced_prompt: String,
    },
}

impl GenerationResponse {
    /// The synthesized text carried by result-bearing variants.
    pub fn generated_text(&self) -> Option<&str> {
        match self {
            GenerationResponse::SuperLazy { generated_text } => Some(generated_text),
            GenerationResponse::Preliminary { preliminary_prompt } => {
                Some(preliminary_prompt)
            }
            GenerationResponse::Final { enhanced_prompt, .. }
            | GenerationResponse::Improvement { enhanced_prompt } => Some(enhanced_prompt),
            GenerationResponse::QuestionBatch(_) | GenerationResponse::Analysis(_) => None,
        }
    }
}

/// Quality verdict for the analysis schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreLabel {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "poor" => Some(Self::Poor),
            "fair" => Some(Self::Fair),
            "good" => Some(Self::Good),
            "excellent" => Some(Self::Excellent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// One iterative-analysis verdict: score plus the next question batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Prompt quality score in `[0, 100]`.
    pub score: u8,
    pub score_label: ScoreLabel,
    /// What the analysis found lacking, as semantic area names.
    pub missing_areas: Vec<String>,
    /// Questions addressing the missing areas, for the next iteration.
    pub questions: Vec<Question>,
}

/// Locates the JSON object inside a possibly prose-wrapped response.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| PromptForgeError::parse("response contains no JSON object"))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| PromptForgeError::parse("response contains no closing brace"))?;
    Ok(&raw[start..=end])
}

/// Parses and validates a raw provider response against the expected schema.
pub fn parse_response(raw: &str, expected: ExpectedSchema) -> Result<GenerationResponse> {
    let json = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(json)
        .map_err(|err| PromptForgeError::parse(format!("invalid JSON in response: {err}")))?;

    match expected {
        ExpectedSchema::QuestionBatch => Ok(GenerationResponse::QuestionBatch(
            parse_questions(&value, "question batch")?,
        )),
        ExpectedSchema::SuperLazy => Ok(GenerationResponse::SuperLazy {
            generated_text: require_text(&value, "generatedText", "super-lazy result")?,
        }),
        ExpectedSchema::Preliminary => Ok(GenerationResponse::Preliminary {
            preliminary_prompt: require_text(
                &value,
                "preliminary_prompt",
                "preliminary result",
            )?,
        }),
        ExpectedSchema::Final => Ok(GenerationResponse::Final {
            enhanced_prompt: require_text(&value, "enhanced_prompt", "final result")?,
            lazy_tweaks: optional_string_array(&value, "lazy_tweaks"),
        }),
        ExpectedSchema::Analysis => parse_analysis(&value).map(GenerationResponse::Analysis),
        ExpectedSchema::Improvement => Ok(GenerationResponse::Improvement {
            enhanced_prompt: require_text(&value, "enhanced_prompt", "improvement result")?,
        }),
    }
}

fn parse_analysis(value: &Value) -> Result<AnalysisReport> {
    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .filter(|score| (0.0..=100.0).contains(score))
        .map(|score| score.round() as u8)
        .ok_or_else(|| PromptForgeError::schema("score", "analysis"))?;

    let score_label = value
        .get("score_label")
        .and_then(Value::as_str)
        .and_then(ScoreLabel::from_str)
        .ok_or_else(|| PromptForgeError::schema("score_label", "analysis"))?;

    Ok(AnalysisReport {
        score,
        score_label,
        missing_areas: optional_string_array(value, "missing_areas"),
        questions: parse_questions(value, "analysis")?,
    })
}

fn parse_questions(value: &Value, context: &str) -> Result<Vec<Question>> {
    let items = value
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| PromptForgeError::schema("questions", context))?;
    if items.is_empty() {
        return Err(PromptForgeError::schema("questions", context));
    }

    items
        .iter()
        .map(|item| parse_question(item, context))
        .collect()
}

fn parse_question(item: &Value, context: &str) -> Result<Question> {
    let topic = require_text(item, "topic", context)?;
    let prompt_text = require_text(item, "question", context)?;

    let options: Vec<QuestionOption> = item
        .get("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| match option {
                    // Either {"text": ..., "emoji": ...} or a bare string.
                    Value::Object(_) => {
                        option.get("text").and_then(Value::as_str).map(|text| {
                            QuestionOption {
                                text: text.to_string(),
                                emoji: option
                                    .get("emoji")
                                    .and_then(Value::as_str)
                                    .map(str::to_string),
                            }
                        })
                    }
                    Value::String(text) => Some(QuestionOption {
                        text: text.clone(),
                        emoji: None,
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let kind = match item.get("kind").and_then(Value::as_str) {
        Some("select") => QuestionKind::Select,
        Some("text") => QuestionKind::Text,
        Some("textarea") => QuestionKind::Textarea,
        Some(_) => return Err(PromptForgeError::schema("kind", context)),
        None if !options.is_empty() => QuestionKind::Select,
        None => QuestionKind::Textarea,
    };

    Ok(Question {
        topic,
        prompt_text,
        kind,
        options,
        allows_custom: item
            .get("allows_custom")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    })
}

fn require_text(value: &Value, field: &str, context: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PromptForgeError::schema(field, context))
}

fn optional_string_array(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
