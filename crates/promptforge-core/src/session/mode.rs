//! Enhancement flow variants.

use crate::config::{MAX_ANALYSIS_ITERATIONS, TOPIC_ROUND_COUNT};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The flow variant a session runs, chosen once per session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnhancementMode {
    /// No questions at all; one synthesis call from the raw input.
    SuperLazy,
    /// One batch of five questions, three answers required.
    GuidedFiveQuestion,
    /// Three rounds over the fixed topic slots, with a preliminary result
    /// offered after each round.
    ThreeRoundTopic,
    /// Analysis-driven question rounds, capped at five iterations.
    IterativeAnalysis,
}

impl EnhancementMode {
    /// Upper bound for `current_round` in this mode.
    pub fn total_rounds(&self) -> u32 {
        match self {
            EnhancementMode::SuperLazy => 1,
            EnhancementMode::GuidedFiveQuestion => 1,
            EnhancementMode::ThreeRoundTopic => TOPIC_ROUND_COUNT,
            EnhancementMode::IterativeAnalysis => MAX_ANALYSIS_ITERATIONS,
        }
    }

    /// Whether this mode presents clarifying questions at all.
    pub fn asks_questions(&self) -> bool {
        !matches!(self, EnhancementMode::SuperLazy)
    }

    /// Whether a usable preliminary result is offered after each round.
    pub fn offers_preliminary(&self) -> bool {
        matches!(self, EnhancementMode::ThreeRoundTopic)
    }

    /// Whether a "Previous" action may revisit an earlier question.
    pub fn allows_revisiting(&self) -> bool {
        matches!(self, EnhancementMode::GuidedFiveQuestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_bounds_per_mode() {
        assert_eq!(EnhancementMode::SuperLazy.total_rounds(), 1);
        assert_eq!(EnhancementMode::GuidedFiveQuestion.total_rounds(), 1);
        assert_eq!(EnhancementMode::ThreeRoundTopic.total_rounds(), 3);
        assert_eq!(EnhancementMode::IterativeAnalysis.total_rounds(), 5);
    }

    #[test]
    fn test_string_round_trip() {
        let mode = EnhancementMode::ThreeRoundTopic;
        assert_eq!(mode.to_string(), "three_round_topic");
        assert_eq!(
            EnhancementMode::from_str("three_round_topic").unwrap(),
            mode
        );
    }

    #[test]
    fn test_only_topic_mode_offers_preliminary() {
        assert!(EnhancementMode::ThreeRoundTopic.offers_preliminary());
        assert!(!EnhancementMode::SuperLazy.offers_preliminary());
        assert!(!EnhancementMode::GuidedFiveQuestion.offers_preliminary());
        assert!(!EnhancementMode::IterativeAnalysis.offers_preliminary());
    }
}
