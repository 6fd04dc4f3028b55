use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::question::QuestionId;

/// Rule attached to a question, governing its own visibility and
/// requiredness, or (for `skip_to`) the navigation away from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalLogic {
    #[serde(default)]
    pub conditions: Vec<LogicCondition>,
    #[serde(default)]
    pub operator: LogicOperator,
    pub action: LogicAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_question_id: Option<QuestionId>,
}

impl ConditionalLogic {
    pub fn new(action: LogicAction, operator: LogicOperator) -> Self {
        Self {
            conditions: Vec::new(),
            operator,
            action,
            target_question_id: None,
        }
    }

    pub fn with_condition(mut self, condition: LogicCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_target(mut self, target: impl Into<QuestionId>) -> Self {
        self.target_question_id = Some(target.into());
        self
    }
}

/// How the conditions of one rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
    /// Any combinator outside the known set; the rule never fires.
    #[serde(other)]
    Unknown,
}

/// Effect of a rule once its conditions are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogicAction {
    Show,
    Hide,
    Require,
    SkipTo,
    /// Any action outside the known set; it has no effect.
    #[serde(other)]
    Unknown,
}

/// One atomic predicate over another question's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogicCondition {
    pub question_id: QuestionId,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl LogicCondition {
    pub fn new(question_id: impl Into<QuestionId>, operator: ConditionOperator) -> Self {
        Self {
            question_id: question_id.into(),
            operator,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Closed set of comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    /// Operator names outside the known set; always evaluates to `false`.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_operator_and_action_deserialize() {
        let logic: ConditionalLogic = serde_json::from_value(json!({
            "conditions": [
                { "question_id": 1, "operator": "matches_regex", "value": "x" }
            ],
            "operator": "OR",
            "action": "teleport"
        }))
        .expect("logic");
        assert_eq!(logic.operator, LogicOperator::Or);
        assert_eq!(logic.action, LogicAction::Unknown);
        assert_eq!(logic.conditions[0].operator, ConditionOperator::Unknown);
    }

    #[test]
    fn unknown_combinator_deserializes() {
        let logic: ConditionalLogic = serde_json::from_value(json!({
            "conditions": [{ "question_id": 1, "operator": "is_empty" }],
            "operator": "XOR",
            "action": "show"
        }))
        .expect("logic");
        assert_eq!(logic.operator, LogicOperator::Unknown);
        assert_eq!(logic.action, LogicAction::Show);
    }

    #[test]
    fn operator_defaults_to_and() {
        let logic: ConditionalLogic = serde_json::from_value(json!({
            "conditions": [],
            "action": "skip_to",
            "target_question_id": "5"
        }))
        .expect("logic");
        assert_eq!(logic.operator, LogicOperator::And);
        assert_eq!(logic.target_question_id, Some(QuestionId::new("5")));
    }
}
