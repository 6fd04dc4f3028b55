use serde::Serialize;

use crate::engine::LogicEngine;
use crate::spec::question::Question;

/// Outcome of the pre-submission completeness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredValidation<'a> {
    pub is_valid: bool,
    pub missing_questions: Vec<&'a Question>,
}

impl LogicEngine {
    /// Collects visible, required questions that have no recorded answer.
    pub fn validate_required_questions(&self) -> RequiredValidation<'_> {
        let missing_questions: Vec<&Question> = self
            .visible_questions()
            .into_iter()
            .filter(|question| {
                self.is_question_required(&question.id) && !self.is_answered(&question.id)
            })
            .collect();

        RequiredValidation {
            is_valid: missing_questions.is_empty(),
            missing_questions,
        }
    }
}
