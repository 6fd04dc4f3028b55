use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::question::QuestionId;

/// Answer recorded for one question, as stored by the persistence layer.
///
/// Every typed column is optional; [`Answer::resolve`] collapses them into a
/// single [`AnswerValue`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    pub question_id: QuestionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_value: Option<Value>,
}

/// Typed view of an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(String),
    Time(String),
    DateTime(String),
    Json(Value),
}

/// Answer column addressed by an interpolation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerField {
    Value,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
    Json,
}

impl AnswerField {
    /// Parses a token property name; `text` is an alias for `value`.
    pub fn from_property(name: &str) -> Option<Self> {
        match name {
            "text" | "value" => Some(AnswerField::Value),
            "number" => Some(AnswerField::Number),
            "boolean" => Some(AnswerField::Boolean),
            "date" => Some(AnswerField::Date),
            "time" => Some(AnswerField::Time),
            "datetime" => Some(AnswerField::DateTime),
            "json" => Some(AnswerField::Json),
            _ => None,
        }
    }
}

impl Answer {
    pub fn new(question_id: impl Into<QuestionId>) -> Self {
        Self {
            question_id: question_id.into(),
            ..Self::default()
        }
    }

    pub fn text(question_id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self {
            value: Some(Value::String(text.into())),
            ..Self::new(question_id)
        }
    }

    pub fn number(question_id: impl Into<QuestionId>, number: f64) -> Self {
        Self {
            numeric_value: Some(number),
            ..Self::new(question_id)
        }
    }

    pub fn boolean(question_id: impl Into<QuestionId>, flag: bool) -> Self {
        Self {
            boolean_value: Some(flag),
            ..Self::new(question_id)
        }
    }

    pub fn json(question_id: impl Into<QuestionId>, value: Value) -> Self {
        Self {
            json_value: Some(value),
            ..Self::new(question_id)
        }
    }

    /// Picks the first populated column: boolean, numeric, date, time,
    /// datetime, json, then the generic value.
    pub fn resolve(&self) -> Option<AnswerValue> {
        if let Some(flag) = self.boolean_value {
            return Some(AnswerValue::Boolean(flag));
        }
        if let Some(number) = self.numeric_value {
            return Some(AnswerValue::Number(number));
        }
        if let Some(date) = &self.date_value {
            return Some(AnswerValue::Date(date.clone()));
        }
        if let Some(time) = &self.time_value {
            return Some(AnswerValue::Time(time.clone()));
        }
        if let Some(datetime) = &self.datetime_value {
            return Some(AnswerValue::DateTime(datetime.clone()));
        }
        if let Some(json) = self.json_value.as_ref().filter(|json| !json.is_null()) {
            return Some(AnswerValue::Json(json.clone()));
        }
        self.value.as_ref().and_then(AnswerValue::from_generic)
    }

    /// Raw column selected by `field`, `None` when it is unset.
    pub fn field(&self, field: AnswerField) -> Option<Value> {
        match field {
            AnswerField::Value => self.value.clone().filter(|value| !value.is_null()),
            AnswerField::Number => self
                .numeric_value
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            AnswerField::Boolean => self.boolean_value.map(Value::Bool),
            AnswerField::Date => self.date_value.clone().map(Value::String),
            AnswerField::Time => self.time_value.clone().map(Value::String),
            AnswerField::DateTime => self.datetime_value.clone().map(Value::String),
            AnswerField::Json => self.json_value.clone().filter(|value| !value.is_null()),
        }
    }
}

impl AnswerValue {
    fn from_generic(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(AnswerValue::Text(text.clone())),
            Value::Bool(flag) => Some(AnswerValue::Boolean(*flag)),
            Value::Number(number) => match number.as_f64() {
                Some(number) => Some(AnswerValue::Number(number)),
                None => Some(AnswerValue::Json(value.clone())),
            },
            other => Some(AnswerValue::Json(other.clone())),
        }
    }

    /// `""` and `[]` count as empty.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text)
            | AnswerValue::Date(text)
            | AnswerValue::Time(text)
            | AnswerValue::DateTime(text) => text.is_empty(),
            AnswerValue::Json(Value::String(text)) => text.is_empty(),
            AnswerValue::Json(Value::Array(items)) => items.is_empty(),
            AnswerValue::Number(_) | AnswerValue::Boolean(_) | AnswerValue::Json(_) => false,
        }
    }
}

/// Point-in-time mapping of question id to recorded answer.
#[derive(Debug, Clone, Default)]
pub struct AnswerSnapshot {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerSnapshot {
    /// Builds a snapshot; a later answer for the same question replaces an
    /// earlier one.
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        let answers = answers
            .into_iter()
            .map(|answer| (answer.question_id.clone(), answer))
            .collect();
        Self { answers }
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<Answer> for AnswerSnapshot {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        Self::new(iter)
    }
}
