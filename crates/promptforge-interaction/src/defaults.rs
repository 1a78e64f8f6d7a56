//! Built-in fallback question tables.
//!
//! Used only when a question-generation call fails; final prompt synthesis
//! never falls back. The tables are fixed per mode and round so a flaky
//! provider still yields a working interview.

use promptforge_core::config::TOPIC_SLOTS;
use promptforge_core::question::{Question, QuestionKind};
use promptforge_core::session::EnhancementMode;

/// Returns the official fallback question batch for a mode and round.
///
/// SuperLazy asks no questions and gets an empty batch.
pub fn fallback_questions(mode: EnhancementMode, round: u32) -> Vec<Question> {
    match mode {
        EnhancementMode::SuperLazy => Vec::new(),
        EnhancementMode::GuidedFiveQuestion => guided_questions(),
        EnhancementMode::ThreeRoundTopic => topic_questions(round),
        EnhancementMode::IterativeAnalysis => analysis_questions(round),
    }
}

fn guided_questions() -> Vec<Question> {
    vec![
        Question::select(
            "goal",
            "What should the finished prompt produce?",
            &[
                ("A written text", "✍️"),
                ("An explanation", "💡"),
                ("An analysis", "🔍"),
                ("Code", "💻"),
            ],
            true,
        ),
        Question::select(
            "audience",
            "Who is the result for?",
            &[
                ("Just me", "🙋"),
                ("Colleagues", "👥"),
                ("Customers", "🛍️"),
                ("The general public", "🌍"),
            ],
            true,
        ),
        Question::select(
            "tone",
            "Which tone fits best?",
            &[
                ("Formal", "🎩"),
                ("Friendly", "😊"),
                ("Direct", "🎯"),
                ("Playful", "🎈"),
            ],
            true,
        ),
        Question::select(
            "output_format",
            "How should the output be shaped?",
            &[
                ("Running text", "📄"),
                ("Bullet points", "•"),
                ("A table", "📊"),
                ("Step by step", "🪜"),
            ],
            true,
        ),
        Question::text("constraints", "Anything the result must include or avoid?"),
    ]
}

fn topic_questions(round: u32) -> Vec<Question> {
    TOPIC_SLOTS
        .iter()
        .map(|topic| {
            let prompt_text = match round {
                1 => topic_prompt_round_one(topic),
                2 => format!(
                    "Looking at your earlier answer on '{}', what detail would sharpen it?",
                    topic.replace('_', " ")
                ),
                _ => format!(
                    "Final pass on '{}': anything left to pin down?",
                    topic.replace('_', " ")
                ),
            };
            Question {
                topic: (*topic).to_string(),
                prompt_text,
                kind: QuestionKind::Textarea,
                options: Vec::new(),
                allows_custom: true,
            }
        })
        .collect()
}

fn topic_prompt_round_one(topic: &str) -> String {
    match topic {
        "goal" => "What exactly should the prompt achieve?".to_string(),
        "role" => "What role should the model take on?".to_string(),
        "context" => "What background does the model need?".to_string(),
        "output_format" => "What shape should the answer have?".to_string(),
        "warning" => "What must the model avoid or be careful about?".to_string(),
        "example" => "Can you give an example of a good result?".to_string(),
        other => format!("Tell me about '{}'", other.replace('_', " ")),
    }
}

fn analysis_questions(round: u32) -> Vec<Question> {
    vec![
        Question::text(
            "clarify_goal",
            format!(
                "Iteration {}: what outcome matters most to you right now?",
                round
            ),
        ),
        Question::text(
            "success_criteria",
            "How will you recognize a good result?",
        ),
        Question::text("constraints", "Any hard limits (length, style, content)?"),
        Question::text("example", "A sample of what you have in mind, if any?"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::config::GUIDED_QUESTION_COUNT;

    #[test]
    fn test_guided_fallback_has_five_questions() {
        let questions = fallback_questions(EnhancementMode::GuidedFiveQuestion, 1);
        assert_eq!(questions.len(), GUIDED_QUESTION_COUNT);
        // Four selects plus one free-text question.
        assert!(
            questions
                .iter()
                .filter(|q| q.kind == QuestionKind::Select)
                .count()
                == 4
        );
    }

    #[test]
    fn test_topic_fallback_covers_all_slots_each_round() {
        for round in 1..=3 {
            let questions = fallback_questions(EnhancementMode::ThreeRoundTopic, round);
            let topics: Vec<&str> =
                questions.iter().map(|q| q.topic.as_str()).collect();
            assert_eq!(topics, TOPIC_SLOTS.to_vec());
        }
    }

    #[test]
    fn test_topic_fallback_phrasing_differs_by_round() {
        let first = fallback_questions(EnhancementMode::ThreeRoundTopic, 1);
        let second = fallback_questions(EnhancementMode::ThreeRoundTopic, 2);
        assert_ne!(first[0].prompt_text, second[0].prompt_text);
    }

    #[test]
    fn test_super_lazy_has_no_fallback_questions() {
        assert!(fallback_questions(EnhancementMode::SuperLazy, 1).is_empty());
    }

    #[test]
    fn test_guided_options_carry_emoji() {
        let questions = fallback_questions(EnhancementMode::GuidedFiveQuestion, 1);
        let goal = &questions[0];
        assert!(goal.options.iter().all(|option| option.emoji.is_some()));
        assert!(goal.allows_custom);
    }
}
