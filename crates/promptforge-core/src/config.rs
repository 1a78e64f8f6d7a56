//! Fixed product constants for the enhancement flows.
//!
//! These thresholds are deliberate product decisions, not derived values;
//! changing one of them changes the flow for every user.

/// Number of questions in a GuidedFiveQuestion batch.
pub const GUIDED_QUESTION_COUNT: usize = 5;

/// Minimum answered questions required to complete a GuidedFiveQuestion round.
pub const GUIDED_MIN_ANSWERED: usize = 3;

/// Number of rounds in the ThreeRoundTopic flow.
pub const TOPIC_ROUND_COUNT: u32 = 3;

/// Iteration cap for the IterativeAnalysis flow.
pub const MAX_ANALYSIS_ITERATIONS: u32 = 5;

/// The fixed semantic slots a ThreeRoundTopic round covers, in display order.
pub const TOPIC_SLOTS: [&str; 6] = [
    "goal",
    "role",
    "context",
    "output_format",
    "warning",
    "example",
];
