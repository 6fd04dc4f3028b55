use std::cell::RefCell;
use std::collections::HashMap;

use crate::answers::AnswerSnapshot;
use crate::condition::aggregate;
use crate::spec::logic::LogicAction;
use crate::spec::question::{Question, QuestionId};

/// Visibility of `question` under `snapshot`.
///
/// Only `show` and `hide` rules affect visibility. Referenced questions are
/// not checked transitively: a condition reads whatever answer is recorded,
/// even for a hidden question.
pub fn is_visible(question: &Question, snapshot: &AnswerSnapshot) -> bool {
    let Some(logic) = &question.conditional_logic else {
        return true;
    };
    match logic.action {
        LogicAction::Show => aggregate(logic, snapshot),
        LogicAction::Hide => !aggregate(logic, snapshot),
        LogicAction::Require | LogicAction::SkipTo | LogicAction::Unknown => true,
    }
}

/// Requiredness ignoring visibility: a `require` rule replaces the static
/// flag with its aggregate.
pub fn is_required_when_visible(question: &Question, snapshot: &AnswerSnapshot) -> bool {
    match &question.conditional_logic {
        Some(logic) if logic.action == LogicAction::Require => aggregate(logic, snapshot),
        _ => question.required,
    }
}

/// Per-engine memo of visibility results, dropped wholesale whenever the
/// answer snapshot changes.
#[derive(Debug, Default)]
pub struct VisibilityCache {
    entries: RefCell<HashMap<QuestionId, bool>>,
}

impl VisibilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with(&self, id: &QuestionId, compute: impl FnOnce() -> bool) -> bool {
        if let Some(visible) = self.entries.borrow().get(id) {
            return *visible;
        }
        let visible = compute();
        self.entries.borrow_mut().insert(id.clone(), visible);
        visible
    }

    pub fn clear(&mut self) {
        self.entries.get_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answer;
    use crate::spec::logic::{ConditionOperator, ConditionalLogic, LogicCondition, LogicOperator};

    fn gated(action: LogicAction) -> Question {
        Question::new("2", 2).with_logic(
            ConditionalLogic::new(action, LogicOperator::And).with_condition(
                LogicCondition::new("1", ConditionOperator::Equals).with_value("Yes"),
            ),
        )
    }

    #[test]
    fn show_and_hide_mirror_each_other() {
        let yes = AnswerSnapshot::new([Answer::text("1", "Yes")]);
        let no = AnswerSnapshot::new([Answer::text("1", "No")]);
        assert!(is_visible(&gated(LogicAction::Show), &yes));
        assert!(!is_visible(&gated(LogicAction::Show), &no));
        assert!(!is_visible(&gated(LogicAction::Hide), &yes));
        assert!(is_visible(&gated(LogicAction::Hide), &no));
    }

    #[test]
    fn require_and_skip_do_not_hide() {
        let no = AnswerSnapshot::new([Answer::text("1", "No")]);
        assert!(is_visible(&gated(LogicAction::Require), &no));
        assert!(is_visible(&gated(LogicAction::SkipTo), &no));
    }

    #[test]
    fn require_rule_overrides_static_flag() {
        let question = gated(LogicAction::Require).with_required(true);
        let no = AnswerSnapshot::new([Answer::text("1", "No")]);
        let yes = AnswerSnapshot::new([Answer::text("1", "Yes")]);
        assert!(!is_required_when_visible(&question, &no));
        assert!(is_required_when_visible(&question, &yes));
        assert!(is_required_when_visible(
            &Question::new("3", 3).with_required(true),
            &no
        ));
    }

    #[test]
    fn cache_computes_once_until_cleared() {
        let mut cache = VisibilityCache::new();
        let id = QuestionId::new("1");
        assert!(cache.get_or_insert_with(&id, || true));
        assert!(cache.get_or_insert_with(&id, || false));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.get_or_insert_with(&id, || false));
    }
}
