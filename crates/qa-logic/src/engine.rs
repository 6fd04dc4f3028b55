use std::collections::HashMap;

use tracing::{debug, trace};

use crate::answers::{Answer, AnswerSnapshot};
use crate::lint::{LogicIssue, lint_registry};
use crate::spec::question::{Question, QuestionId};
use crate::visibility::{VisibilityCache, is_required_when_visible, is_visible};

/// Rule engine for one questionnaire-filling session.
///
/// Queries take `&self` and memoize visibility internally, so an engine is
/// not `Sync`; keep one instance per session.
#[derive(Debug)]
pub struct LogicEngine {
    pub(crate) questions: Vec<Question>,
    positions: HashMap<QuestionId, usize>,
    pub(crate) answers: AnswerSnapshot,
    visibility: VisibilityCache,
}

impl LogicEngine {
    /// Builds an engine over the full registry. Questions are kept in
    /// `order_num` order; ties keep their input order.
    pub fn new(questions: Vec<Question>, answers: Vec<Answer>) -> Self {
        let mut questions = questions;
        questions.sort_by_key(|question| question.order_num);
        let mut positions = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            positions.entry(question.id.clone()).or_insert(index);
        }
        let answers = AnswerSnapshot::new(answers);
        debug!(
            questions = questions.len(),
            answers = answers.len(),
            "logic engine created"
        );
        Self {
            questions,
            positions,
            answers,
            visibility: VisibilityCache::new(),
        }
    }

    /// Replaces the whole answer snapshot and drops every cached result.
    pub fn update_answers(&mut self, answers: Vec<Answer>) {
        self.answers = AnswerSnapshot::new(answers);
        self.visibility.clear();
        debug!(answers = self.answers.len(), "answer snapshot replaced");
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerSnapshot {
        &self.answers
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.position(id).map(|index| &self.questions[index])
    }

    pub(crate) fn position(&self, id: &QuestionId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Unknown ids are never visible.
    pub fn is_question_visible(&self, id: &QuestionId) -> bool {
        let Some(question) = self.question(id) else {
            return false;
        };
        self.visibility.get_or_insert_with(id, || {
            let visible = is_visible(question, &self.answers);
            trace!(question_id = %id, visible, "visibility resolved");
            visible
        })
    }

    /// A hidden question is never required.
    pub fn is_question_required(&self, id: &QuestionId) -> bool {
        match self.question(id) {
            Some(question) if self.is_question_visible(id) => {
                is_required_when_visible(question, &self.answers)
            }
            _ => false,
        }
    }

    /// Visible questions in `order_num` order.
    pub fn visible_questions(&self) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|question| self.is_question_visible(&question.id))
            .collect()
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.answers.contains(id)
    }

    /// Structural problems in the registry; see [`lint_registry`].
    pub fn lint(&self) -> Vec<LogicIssue> {
        lint_registry(&self.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::logic::{
        ConditionOperator, ConditionalLogic, LogicAction, LogicCondition, LogicOperator,
    };

    fn show_if_yes(id: &str, order: i64) -> Question {
        Question::new(id, order).with_logic(
            ConditionalLogic::new(LogicAction::Show, LogicOperator::And).with_condition(
                LogicCondition::new("1", ConditionOperator::Equals).with_value("Yes"),
            ),
        )
    }

    #[test]
    fn registry_is_sorted_by_order_num() {
        let engine = LogicEngine::new(
            vec![
                Question::new("c", 3),
                Question::new("a", 1),
                Question::new("b", 2),
            ],
            vec![],
        );
        let ids: Vec<_> = engine.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn update_answers_invalidates_cached_visibility() {
        let mut engine = LogicEngine::new(
            vec![Question::new("1", 1), show_if_yes("2", 2)],
            vec![Answer::text("1", "No")],
        );
        let gated = QuestionId::new("2");
        assert!(!engine.is_question_visible(&gated));

        engine.update_answers(vec![Answer::text("1", "Yes")]);
        assert!(engine.is_question_visible(&gated));

        engine.update_answers(vec![]);
        assert!(!engine.is_question_visible(&gated));
    }

    #[test]
    fn unknown_question_is_hidden_and_optional() {
        let engine = LogicEngine::new(vec![Question::new("1", 1)], vec![]);
        let missing = QuestionId::new("404");
        assert!(!engine.is_question_visible(&missing));
        assert!(!engine.is_question_required(&missing));
    }

    #[test]
    fn hidden_required_question_is_not_required() {
        let engine = LogicEngine::new(
            vec![Question::new("1", 1), show_if_yes("2", 2).with_required(true)],
            vec![],
        );
        assert!(!engine.is_question_required(&QuestionId::new("2")));
    }
}
