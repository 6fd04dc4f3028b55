//! Condition evaluation and aggregation.
//!
//! Evaluation never fails: a malformed or unsupported predicate evaluates to
//! `false`. Callers get a behavioral signal (a question that stays hidden)
//! rather than an error value.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::trace;

use crate::answers::{AnswerSnapshot, AnswerValue};
use crate::spec::logic::{ConditionOperator, ConditionalLogic, LogicCondition, LogicOperator};
use crate::template::display_number;

/// Evaluates one predicate against the snapshot.
///
/// A condition on an unanswered question is only satisfied by `is_empty`.
pub fn evaluate(condition: &LogicCondition, snapshot: &AnswerSnapshot) -> bool {
    let Some(answer) = snapshot.get(&condition.question_id) else {
        return condition.operator == ConditionOperator::IsEmpty;
    };
    let actual = answer.resolve();
    let expected = condition.value.as_ref().filter(|value| !value.is_null());

    match condition.operator {
        ConditionOperator::Equals => values_equal(actual.as_ref(), expected),
        ConditionOperator::NotEquals => !values_equal(actual.as_ref(), expected),
        ConditionOperator::Contains => contains(actual.as_ref(), expected),
        ConditionOperator::NotContains => !contains(actual.as_ref(), expected),
        ConditionOperator::GreaterThan => {
            compare(actual.as_ref(), expected) == Some(Ordering::Greater)
        }
        ConditionOperator::LessThan => compare(actual.as_ref(), expected) == Some(Ordering::Less),
        ConditionOperator::IsEmpty => is_empty(actual.as_ref()),
        ConditionOperator::IsNotEmpty => !is_empty(actual.as_ref()),
        ConditionOperator::Unknown => {
            trace!(question_id = %condition.question_id, "unknown condition operator");
            false
        }
    }
}

/// Combines all conditions of a rule. An empty AND holds, an empty OR does
/// not, and an unknown combinator never holds.
pub fn aggregate(logic: &ConditionalLogic, snapshot: &AnswerSnapshot) -> bool {
    let mut results = logic
        .conditions
        .iter()
        .map(|condition| evaluate(condition, snapshot));
    match logic.operator {
        LogicOperator::And => results.all(|satisfied| satisfied),
        LogicOperator::Or => results.any(|satisfied| satisfied),
        LogicOperator::Unknown => {
            trace!(conditions = logic.conditions.len(), "unknown logic combinator");
            false
        }
    }
}

fn is_empty(actual: Option<&AnswerValue>) -> bool {
    actual.is_none_or(AnswerValue::is_blank)
}

fn values_equal(actual: Option<&AnswerValue>, expected: Option<&Value>) -> bool {
    match (actual, expected) {
        (None, None) => true,
        (Some(actual), Some(expected)) => match actual {
            AnswerValue::Text(text)
            | AnswerValue::Date(text)
            | AnswerValue::Time(text)
            | AnswerValue::DateTime(text) => expected.as_str() == Some(text.as_str()),
            AnswerValue::Number(number) => {
                expected.is_number() && expected.as_f64() == Some(*number)
            }
            AnswerValue::Boolean(flag) => expected.as_bool() == Some(*flag),
            AnswerValue::Json(json) => json_equal(json, expected),
        },
        _ => false,
    }
}

fn contains(actual: Option<&AnswerValue>, expected: Option<&Value>) -> bool {
    let (Some(actual), Some(expected)) = (actual, expected) else {
        return false;
    };
    match actual {
        AnswerValue::Text(text)
        | AnswerValue::Date(text)
        | AnswerValue::Time(text)
        | AnswerValue::DateTime(text)
        | AnswerValue::Json(Value::String(text)) => needle(expected)
            .is_some_and(|needle| text.to_lowercase().contains(&needle.to_lowercase())),
        AnswerValue::Json(Value::Array(items)) => {
            is_scalar(expected) && items.iter().any(|item| json_equal(item, expected))
        }
        AnswerValue::Number(_) | AnswerValue::Boolean(_) | AnswerValue::Json(_) => false,
    }
}

fn compare(actual: Option<&AnswerValue>, expected: Option<&Value>) -> Option<Ordering> {
    let left = match actual? {
        AnswerValue::Number(number) => *number,
        AnswerValue::Text(text)
        | AnswerValue::Date(text)
        | AnswerValue::Time(text)
        | AnswerValue::DateTime(text) => parse_number(text)?,
        AnswerValue::Json(json) => json_number(json)?,
        AnswerValue::Boolean(_) => return None,
    };
    let right = json_number(expected?)?;
    left.partial_cmp(&right)
}

fn needle(expected: &Value) -> Option<String> {
    match expected {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(display_number(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|number| !number.is_nan())
}

// Numbers compare by value at any depth so `1` and `1.0` agree.
fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(left, right)| json_equal(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right
                        .get(key)
                        .is_some_and(|other| json_equal(value, other))
                })
        }
        _ => left == right,
    }
}
