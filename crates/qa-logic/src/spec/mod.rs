pub mod logic;
pub mod question;

pub use logic::{ConditionOperator, ConditionalLogic, LogicAction, LogicCondition, LogicOperator};
pub use question::{Question, QuestionId};
