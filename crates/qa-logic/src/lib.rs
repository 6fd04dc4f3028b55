#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod engine;
pub mod lint;
pub mod navigation;
pub mod progress;
pub mod spec;
pub mod template;
pub mod validate;
pub mod visibility;

pub use answers::{Answer, AnswerField, AnswerSnapshot, AnswerValue};
pub use condition::{aggregate, evaluate};
pub use engine::LogicEngine;
pub use lint::{IssueCode, LogicIssue, lint_registry};
pub use navigation::NavigationPath;
pub use progress::Progress;
pub use spec::{
    ConditionOperator, ConditionalLogic, LogicAction, LogicCondition, LogicOperator, Question,
    QuestionId,
};
pub use template::interpolate;
pub use validate::RequiredValidation;
pub use visibility::{VisibilityCache, is_required_when_visible, is_visible};

/// JSON schema describing a question registry (`Vec<Question>`).
pub fn questions_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(Vec<Question>)).unwrap_or_default()
}
