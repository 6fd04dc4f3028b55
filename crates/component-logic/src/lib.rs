use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use qa_logic::{Answer, LogicEngine, Question, QuestionId};

const DEFAULT_QUESTIONS: &str = include_str!("../../qa-logic/tests/fixtures/intake_form.json");

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswersParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("question '{0}' is not available")]
    UnknownQuestion(String),
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ComponentConfig {
    /// Question registry as a JSON array; the bundled intake form otherwise.
    #[serde(default)]
    pub questions_json: Option<String>,
    /// Upper bound on the number of questions returned by [`path`].
    #[serde(default)]
    pub max_path_len: Option<usize>,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn load_questions(config: &ComponentConfig) -> Result<Vec<Question>, ComponentError> {
    let questions_json = config.questions_json.as_deref().unwrap_or(DEFAULT_QUESTIONS);
    serde_json::from_str(questions_json).map_err(ComponentError::ConfigParse)
}

fn parse_answers(answers_json: &str) -> Result<Vec<Answer>, ComponentError> {
    if answers_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(answers_json).map_err(ComponentError::AnswersParse)
}

fn build_engine(config_json: &str, answers_json: &str) -> Result<LogicEngine, ComponentError> {
    let config = load_config(config_json)?;
    let questions = load_questions(&config)?;
    let answers = parse_answers(answers_json)?;
    debug!(
        questions = questions.len(),
        answers = answers.len(),
        "building logic engine"
    );
    Ok(LogicEngine::new(questions, answers))
}

fn ensure_question(engine: &LogicEngine, question_id: &str) -> Result<QuestionId, ComponentError> {
    let id = QuestionId::new(question_id);
    match engine.question(&id) {
        Some(_) => Ok(id),
        None => Err(ComponentError::UnknownQuestion(question_id.to_string())),
    }
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn progress_value(engine: &LogicEngine) -> Result<Value, ComponentError> {
    serde_json::to_value(engine.progress()).map_err(ComponentError::JsonEncode)
}

/// Returns the configured question registry.
pub fn describe(config_json: &str) -> String {
    respond(
        load_config(config_json)
            .and_then(|config| load_questions(&config))
            .and_then(|questions| {
                serde_json::to_value(questions).map_err(ComponentError::JsonEncode)
            }),
    )
}

/// Per-question visibility, requiredness and answer state.
pub fn visibility(config_json: &str, answers_json: &str) -> String {
    respond(build_engine(config_json, answers_json).map(|engine| {
        let questions = engine
            .questions()
            .iter()
            .map(|question| {
                json!({
                    "id": question.id,
                    "visible": engine.is_question_visible(&question.id),
                    "required": engine.is_question_required(&question.id),
                    "answered": engine.is_answered(&question.id),
                })
            })
            .collect::<Vec<_>>();
        let visible = engine
            .visible_questions()
            .iter()
            .map(|question| Value::String(question.id.to_string()))
            .collect::<Vec<_>>();
        json!({
            "questions": questions,
            "visible": visible,
        })
    }))
}

/// Next question after `current_id`; an empty id asks for the first one.
pub fn next(config_json: &str, answers_json: &str, current_id: &str) -> String {
    respond(build_engine(config_json, answers_json).and_then(|engine| {
        let next_question = if current_id.trim().is_empty() {
            engine.first_question()
        } else {
            let current = ensure_question(&engine, current_id)?;
            engine.next_question(&current)
        };
        let next_question_id = next_question.map(|question| question.id.to_string());
        let text = next_question.map(|question| engine.dynamic_question_text(&question.id));
        let progress = progress_value(&engine)?;
        Ok(json!({
            "status": if next_question_id.is_some() { "need_input" } else { "complete" },
            "next_question_id": next_question_id,
            "text": text,
            "progress": progress,
        }))
    }))
}

pub fn dynamic_text(config_json: &str, answers_json: &str, question_id: &str) -> String {
    respond(build_engine(config_json, answers_json).and_then(|engine| {
        let id = ensure_question(&engine, question_id)?;
        Ok(json!({
            "question_id": id,
            "text": engine.dynamic_question_text(&id),
        }))
    }))
}

pub fn progress(config_json: &str, answers_json: &str) -> String {
    respond(build_engine(config_json, answers_json).and_then(|engine| progress_value(&engine)))
}

/// Completeness check run before submission.
pub fn validate_answers(config_json: &str, answers_json: &str) -> String {
    respond(build_engine(config_json, answers_json).and_then(|engine| {
        let validation = engine.validate_required_questions();
        let missing = validation
            .missing_questions
            .iter()
            .map(|question| Value::String(question.id.to_string()))
            .collect::<Vec<_>>();
        let progress = progress_value(&engine)?;
        Ok(json!({
            "is_valid": validation.is_valid,
            "missing_questions": missing,
            "progress": progress,
        }))
    }))
}

/// Questions a respondent would walk through from `start_id`.
pub fn path(config_json: &str, answers_json: &str, start_id: &str) -> String {
    respond(load_config(config_json).and_then(|config| {
        let engine = build_engine(config_json, answers_json)?;
        let start = ensure_question(&engine, start_id)?;
        let walk = engine.navigation_path(&start);
        let limit = config.max_path_len.unwrap_or(usize::MAX);
        let questions = walk
            .questions
            .iter()
            .take(limit)
            .map(|question| Value::String(question.id.to_string()))
            .collect::<Vec<_>>();
        Ok(json!({
            "questions": questions,
            "truncated": walk.questions.len() > limit,
            "cycle": walk.cycle,
        }))
    }))
}

pub fn lint(config_json: &str) -> String {
    respond(
        load_config(config_json)
            .and_then(|config| load_questions(&config))
            .and_then(|questions| {
                let issues = qa_logic::lint_registry(&questions);
                let valid = issues.is_empty();
                let issues = serde_json::to_value(issues).map_err(ComponentError::JsonEncode)?;
                Ok(json!({
                    "valid": valid,
                    "issues": issues,
                }))
            }),
    )
}
