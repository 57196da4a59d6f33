//! Grounded prompt construction.
//!
//! Builds the fixed system instruction that binds the model to
//! transcript-only knowledge, plus the message sequence for one exchange.

use crate::config::Prompts;
use crate::session::{ChatTurn, Role};
use std::collections::HashMap;

/// A prompt ready to hand to the inference client.
#[derive(Debug, Clone)]
pub struct GroundedPrompt {
    /// System instruction with the transcript embedded.
    pub system: String,
    /// Prior history followed by the new question as the final user turn.
    pub messages: Vec<ChatTurn>,
}

/// Build the grounded prompt for one question.
///
/// Inputs are borrowed and never mutated; the returned messages are the
/// prior history with the question appended as a user turn.
pub fn build_grounded_prompt(
    question: &str,
    transcript: &str,
    video_id: &str,
    history: &[ChatTurn],
    prompts: &Prompts,
) -> GroundedPrompt {
    let mut vars = HashMap::new();
    vars.insert("video_id".to_string(), video_id.to_string());
    vars.insert("transcript".to_string(), transcript.to_string());

    let system = prompts.render_with_custom(&prompts.grounding.system, &vars);

    let mut messages = history.to_vec();
    messages.push(ChatTurn::user(question));

    GroundedPrompt { system, messages }
}
