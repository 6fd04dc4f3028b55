use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};

use crate::spec::logic::ConditionalLogic;

/// Stable identifier of a question within one questionnaire.
///
/// Storage layers hand ids out either as integers or as strings; both forms
/// deserialize to the same id (`1` and `"1"` name the same question).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "RawQuestionId", into = "String")]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl JsonSchema for QuestionId {
    fn schema_name() -> Cow<'static, str> {
        "QuestionId".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": ["string", "integer"]
        })
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for QuestionId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<QuestionId> for String {
    fn from(value: QuestionId) -> Self {
        value.0
    }
}

impl PartialEq<str> for QuestionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QuestionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Wire form of a question id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawQuestionId {
    Integer(i64),
    Text(String),
}

impl From<RawQuestionId> for QuestionId {
    fn from(raw: RawQuestionId) -> Self {
        match raw {
            RawQuestionId::Integer(value) => QuestionId(value.to_string()),
            RawQuestionId::Text(value) => QuestionId(value),
        }
    }
}

/// A single question as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: QuestionId,
    pub order_num: i64,
    #[serde(default)]
    pub required: bool,
    /// Display text; may carry `{{ref.prop}}` interpolation tokens.
    #[serde(default, alias = "question_text")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, order_num: i64) -> Self {
        Self {
            id: id.into(),
            order_num,
            required: false,
            text: String::new(),
            conditional_logic: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_and_string_ids_are_interchangeable() {
        let from_int: QuestionId = serde_json::from_value(json!(7)).expect("int id");
        let from_text: QuestionId = serde_json::from_value(json!("7")).expect("text id");
        assert_eq!(from_int, from_text);
        assert_eq!(serde_json::to_value(&from_int).expect("encode"), json!("7"));
    }

    #[test]
    fn question_text_alias_is_accepted() {
        let question: Question = serde_json::from_value(json!({
            "id": 1,
            "order_num": 1,
            "question_text": "How old are you?"
        }))
        .expect("question");
        assert_eq!(question.text, "How old are you?");
        assert!(!question.required);
        assert!(question.conditional_logic.is_none());
    }
}
