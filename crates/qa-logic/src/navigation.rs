use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::condition::aggregate;
use crate::engine::LogicEngine;
use crate::spec::logic::LogicAction;
use crate::spec::question::{Question, QuestionId};

/// Sequence of questions a respondent would be shown from some start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPath<'a> {
    pub questions: Vec<&'a Question>,
    /// Question the walk would have revisited, when it stopped on a cycle.
    pub cycle: Option<QuestionId>,
}

impl LogicEngine {
    /// First visible question of the questionnaire.
    pub fn first_question(&self) -> Option<&Question> {
        self.scan_from(0)
    }

    /// Question to present after `current`.
    ///
    /// A satisfied `skip_to` rule wins when its target exists, is another
    /// question and is visible; otherwise the next visible question in
    /// order. An unknown `current` scans from the start. One hop per call.
    pub fn next_question(&self, current: &QuestionId) -> Option<&Question> {
        let Some(position) = self.position(current) else {
            debug!(question_id = %current, "unknown current question; scanning from start");
            return self.first_question();
        };

        if let Some(target) = self.skip_target(&self.questions[position]) {
            debug!(from = %current, to = %target.id, "skip rule applied");
            return Some(target);
        }

        self.scan_from(position + 1)
    }

    /// Follows [`LogicEngine::next_question`] from `start` until the end of
    /// the questionnaire or until a question would repeat.
    pub fn navigation_path(&self, start: &QuestionId) -> NavigationPath<'_> {
        let mut questions = Vec::new();
        let mut seen = HashSet::new();
        let mut cycle = None;

        let mut current = match self.question(start) {
            Some(question) if self.is_question_visible(start) => Some(question),
            _ => self.next_question(start),
        };
        while let Some(question) = current {
            if !seen.insert(&question.id) {
                warn!(question_id = %question.id, "navigation cycle detected");
                cycle = Some(question.id.clone());
                break;
            }
            questions.push(question);
            current = self.next_question(&question.id);
        }

        NavigationPath { questions, cycle }
    }

    fn skip_target(&self, question: &Question) -> Option<&Question> {
        let logic = question.conditional_logic.as_ref()?;
        if logic.action != LogicAction::SkipTo || !aggregate(logic, &self.answers) {
            return None;
        }
        let Some(target_id) = &logic.target_question_id else {
            warn!(question_id = %question.id, "skip rule without target");
            return None;
        };
        if *target_id == question.id {
            warn!(question_id = %question.id, "skip rule targets its own question");
            return None;
        }
        let Some(target) = self.question(target_id) else {
            warn!(question_id = %question.id, target = %target_id, "skip target not found");
            return None;
        };
        if !self.is_question_visible(target_id) {
            debug!(question_id = %question.id, target = %target_id, "skip target hidden");
            return None;
        }
        Some(target)
    }

    fn scan_from(&self, start: usize) -> Option<&Question> {
        self.questions
            .iter()
            .skip(start)
            .find(|question| self.is_question_visible(&question.id))
    }
}

#[cfg(test)]
mod tests {
    use crate::answers::Answer;
    use crate::engine::LogicEngine;
    use crate::spec::logic::{
        ConditionOperator, ConditionalLogic, LogicAction, LogicCondition, LogicOperator,
    };
    use crate::spec::question::{Question, QuestionId};

    fn skip(from: &str, order: i64, to: &str) -> Question {
        Question::new(from, order).with_logic(
            ConditionalLogic::new(LogicAction::SkipTo, LogicOperator::And)
                .with_target(to)
                .with_condition(
                    LogicCondition::new("1", ConditionOperator::Equals).with_value("skip"),
                ),
        )
    }

    fn id(value: &str) -> QuestionId {
        QuestionId::new(value)
    }

    #[test]
    fn falls_through_when_skip_condition_is_false() {
        let engine = LogicEngine::new(
            vec![
                Question::new("1", 1),
                skip("2", 2, "4"),
                Question::new("3", 3),
                Question::new("4", 4),
            ],
            vec![Answer::text("1", "stay")],
        );
        assert_eq!(engine.next_question(&id("2")).map(|q| q.id.as_str()), Some("3"));
        assert!(engine.next_question(&id("4")).is_none());
    }

    #[test]
    fn hidden_skip_target_falls_back_to_scan() {
        let hidden = Question::new("4", 4).with_logic(
            ConditionalLogic::new(LogicAction::Hide, LogicOperator::And)
                .with_condition(LogicCondition::new("1", ConditionOperator::IsNotEmpty)),
        );
        let engine = LogicEngine::new(
            vec![
                Question::new("1", 1),
                skip("2", 2, "4"),
                Question::new("3", 3),
                hidden,
            ],
            vec![Answer::text("1", "skip")],
        );
        assert_eq!(engine.next_question(&id("2")).map(|q| q.id.as_str()), Some("3"));
    }

    #[test]
    fn dangling_and_self_targets_fall_through() {
        let engine = LogicEngine::new(
            vec![
                Question::new("1", 1),
                skip("2", 2, "99"),
                skip("3", 3, "3"),
                Question::new("4", 4),
            ],
            vec![Answer::text("1", "skip")],
        );
        assert_eq!(engine.next_question(&id("2")).map(|q| q.id.as_str()), Some("3"));
        assert_eq!(engine.next_question(&id("3")).map(|q| q.id.as_str()), Some("4"));
    }

    #[test]
    fn unknown_current_question_starts_from_first_visible() {
        let engine = LogicEngine::new(vec![Question::new("1", 1)], vec![]);
        assert_eq!(engine.next_question(&id("x")).map(|q| q.id.as_str()), Some("1"));
    }

    #[test]
    fn path_stops_on_skip_cycle() {
        let engine = LogicEngine::new(
            vec![
                Question::new("1", 1),
                skip("2", 2, "3"),
                skip("3", 3, "2"),
                Question::new("4", 4),
            ],
            vec![Answer::text("1", "skip")],
        );
        let path = engine.navigation_path(&id("1"));
        let ids: Vec<_> = path.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(path.cycle, Some(id("2")));
    }

    #[test]
    fn path_runs_to_the_end_without_cycles() {
        let engine = LogicEngine::new(
            vec![Question::new("1", 1), Question::new("2", 2)],
            vec![],
        );
        let path = engine.navigation_path(&id("1"));
        assert_eq!(path.questions.len(), 2);
        assert!(path.cycle.is_none());
    }
}
