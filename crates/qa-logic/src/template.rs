use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Number, Value};

use crate::answers::{AnswerField, AnswerSnapshot};
use crate::engine::LogicEngine;
use crate::spec::question::{Question, QuestionId};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}.\s]+)\.([A-Za-z_]+)\s*\}\}").expect("valid token pattern")
});

/// Replaces `{{ref.prop}}` tokens in `text`.
///
/// `ref` names a question by `order_num` or id, first match in `questions`
/// wins. Tokens that cannot be resolved stay in the output untouched.
pub fn interpolate(text: &str, questions: &[Question], snapshot: &AnswerSnapshot) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            resolve_token(&caps[1], &caps[2], questions, snapshot)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_token(
    reference: &str,
    property: &str,
    questions: &[Question],
    snapshot: &AnswerSnapshot,
) -> Option<String> {
    let field = AnswerField::from_property(property)?;
    let question = questions.iter().find(|question| {
        question.order_num.to_string() == reference || question.id == reference
    })?;
    let value = snapshot.get(&question.id)?.field(field)?;
    Some(display_value(&value))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => display_number(number),
        other => other.to_string(),
    }
}

/// Integral numbers render without a fractional part: `5.0` reads `5`.
pub(crate) fn display_number(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{}", float as i64)
        }
        _ => number.to_string(),
    }
}

impl LogicEngine {
    /// Question text with interpolation tokens resolved; empty for unknown
    /// ids.
    pub fn dynamic_question_text(&self, id: &QuestionId) -> String {
        self.question(id)
            .map(|question| interpolate(&question.text, &self.questions, &self.answers))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answer;
    use serde_json::json;

    fn registry() -> Vec<Question> {
        vec![
            Question::new("name", 1),
            Question::new("age", 2),
            Question::new("consent", 3),
            Question::new("extras", 4),
        ]
    }

    #[test]
    fn resolves_by_order_and_by_id() {
        let answers = AnswerSnapshot::new([
            Answer::text("name", "Sam"),
            Answer::number("age", 30.0),
        ]);
        let text = interpolate("{{1.value}} is {{age.number}}", &registry(), &answers);
        assert_eq!(text, "Sam is 30");
    }

    #[test]
    fn renders_each_field_kind() {
        let answers = AnswerSnapshot::new([
            Answer::number("age", 2.5),
            Answer::boolean("consent", true),
            Answer::json("extras", json!({"a": 1})),
        ]);
        let text = interpolate(
            "{{2.number}}|{{3.boolean}}|{{4.json}}",
            &registry(),
            &answers,
        );
        assert_eq!(text, r#"2.5|true|{"a":1}"#);
    }

    #[test]
    fn renders_date_and_time_fields() {
        let answers = AnswerSnapshot::new([Answer {
            date_value: Some("2024-05-01".into()),
            time_value: Some("09:30".into()),
            datetime_value: Some("2024-05-01T09:30:00Z".into()),
            ..Answer::new("name")
        }]);
        let text = interpolate(
            "{{1.date}} at {{1.time}} ({{name.datetime}}) {{1.value}}",
            &registry(),
            &answers,
        );
        assert_eq!(text, "2024-05-01 at 09:30 (2024-05-01T09:30:00Z) {{1.value}}");
    }

    #[test]
    fn integral_numbers_drop_the_fraction() {
        assert_eq!(display_number(&Number::from_f64(5.0).expect("finite")), "5");
        assert_eq!(display_number(&Number::from_f64(5.25).expect("finite")), "5.25");
    }

    #[test]
    fn unresolved_tokens_stay_verbatim() {
        let answers = AnswerSnapshot::new([Answer::text("name", "Sam")]);
        let template = "{{9.value}} {{2.value}} {{1.colour}} {{1.number}}";
        assert_eq!(interpolate(template, &registry(), &answers), template);
    }

    #[test]
    fn text_is_an_alias_for_value_and_spaces_are_tolerated() {
        let answers = AnswerSnapshot::new([Answer::text("name", "Sam")]);
        assert_eq!(
            interpolate("Hi {{ name.text }}!", &registry(), &answers),
            "Hi Sam!"
        );
    }
}
