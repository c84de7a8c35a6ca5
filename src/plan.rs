//! @ai:module:intent Conversation plan expansion from questions and repetitions
//! @ai:module:layer domain
//! @ai:module:public_api ConversationUnit, build_plan
//! @ai:module:stateless true

use crate::questions::Question;
use anyhow::Result;

/// @ai:intent One (question, repetition) pair sent exactly once to the provider
/// @ai:effects pure
#[derive(Debug, Clone)]
pub struct ConversationUnit {
    /// 0-based position in the plan; defines the total output order
    pub sequence_index: usize,
    pub question_id: String,
    pub category: String,
    pub question: String,
    /// 1-based repetition counter within a question
    pub repetition: u32,
}

/// @ai:intent Expand questions into an ordered conversation plan
/// @ai:pre repetitions >= 1 and questions is non-empty
/// @ai:post output length == questions.len() * repetitions
/// @ai:effects pure
pub fn build_plan(questions: &[Question], repetitions: u32) -> Result<Vec<ConversationUnit>> {
    if repetitions < 1 {
        anyhow::bail!("Repetitions must be at least 1, got {}", repetitions);
    }

    if questions.is_empty() {
        anyhow::bail!("Question set is empty, nothing to plan");
    }

    let mut plan = Vec::with_capacity(questions.len() * repetitions as usize);

    for question in questions {
        for rep in 1..=repetitions {
            plan.push(ConversationUnit {
                sequence_index: plan.len(),
                question_id: question.id.clone(),
                category: question.category.clone(),
                question: question.text.clone(),
                repetition: rep,
            });
        }
    }

    Ok(plan)
}
