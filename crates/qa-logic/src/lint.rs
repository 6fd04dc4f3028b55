//! Static checks over a question registry.
//!
//! The engine itself tolerates every problem reported here (it falls back
//! to ordinal navigation or evaluates to `false`); the lint exists so
//! authoring tools can surface them before a respondent runs into them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spec::logic::{ConditionOperator, LogicAction, LogicOperator};
use crate::spec::question::{Question, QuestionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    DuplicateId,
    MissingTarget,
    DanglingTarget,
    SelfTarget,
    UnknownReference,
    UnknownOperator,
    UnknownCombinator,
    UnknownAction,
    SkipCycle,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::DuplicateId => "duplicate_id",
            IssueCode::MissingTarget => "missing_target",
            IssueCode::DanglingTarget => "dangling_target",
            IssueCode::SelfTarget => "self_target",
            IssueCode::UnknownReference => "unknown_reference",
            IssueCode::UnknownOperator => "unknown_operator",
            IssueCode::UnknownCombinator => "unknown_combinator",
            IssueCode::UnknownAction => "unknown_action",
            IssueCode::SkipCycle => "skip_cycle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicIssue {
    pub question_id: QuestionId,
    pub code: IssueCode,
    pub message: String,
}

impl fmt::Display for LogicIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.question_id,
            self.code.as_str(),
            self.message
        )
    }
}

impl LogicIssue {
    fn new(question: &Question, code: IssueCode, message: String) -> Self {
        Self {
            question_id: question.id.clone(),
            code,
            message,
        }
    }
}

/// Reports structural problems, questions taken in `order_num` order.
pub fn lint_registry(questions: &[Question]) -> Vec<LogicIssue> {
    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|question| question.order_num);

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for question in &ordered {
        if !seen.insert(&question.id) {
            issues.push(LogicIssue::new(
                question,
                IssueCode::DuplicateId,
                format!("question id '{}' is used more than once", question.id),
            ));
        }
    }

    for question in &ordered {
        let Some(logic) = &question.conditional_logic else {
            continue;
        };
        if logic.action == LogicAction::SkipTo {
            match &logic.target_question_id {
                None => issues.push(LogicIssue::new(
                    question,
                    IssueCode::MissingTarget,
                    "skip_to rule has no target_question_id".into(),
                )),
                Some(target) if !seen.contains(target) => issues.push(LogicIssue::new(
                    question,
                    IssueCode::DanglingTarget,
                    format!("skip_to target '{}' does not exist", target),
                )),
                Some(target) if *target == question.id => issues.push(LogicIssue::new(
                    question,
                    IssueCode::SelfTarget,
                    "skip_to rule targets its own question".into(),
                )),
                Some(_) => {}
            }
        }
        if logic.action == LogicAction::Unknown {
            issues.push(LogicIssue::new(
                question,
                IssueCode::UnknownAction,
                "rule action is not recognised; the rule has no effect".into(),
            ));
        }
        if logic.operator == LogicOperator::Unknown {
            issues.push(LogicIssue::new(
                question,
                IssueCode::UnknownCombinator,
                "rule combines its conditions with an unsupported operator".into(),
            ));
        }
        for condition in &logic.conditions {
            if !seen.contains(&condition.question_id) {
                issues.push(LogicIssue::new(
                    question,
                    IssueCode::UnknownReference,
                    format!(
                        "condition references unknown question '{}'",
                        condition.question_id
                    ),
                ));
            }
            if condition.operator == ConditionOperator::Unknown {
                issues.push(LogicIssue::new(
                    question,
                    IssueCode::UnknownOperator,
                    format!(
                        "condition on '{}' uses an unsupported operator",
                        condition.question_id
                    ),
                ));
            }
        }
    }

    issues.extend(skip_cycles(&ordered));
    issues
}

/// Every question has at most one skip edge, so each walk either ends or
/// closes a single cycle.
fn skip_cycles(ordered: &[&Question]) -> Vec<LogicIssue> {
    let mut index: HashMap<&QuestionId, usize> = HashMap::new();
    for (position, question) in ordered.iter().enumerate() {
        index.entry(&question.id).or_insert(position);
    }
    let edge = |position: usize| -> Option<usize> {
        let question = ordered[position];
        let logic = question.conditional_logic.as_ref()?;
        if logic.action != LogicAction::SkipTo {
            return None;
        }
        let target = logic.target_question_id.as_ref()?;
        if *target == question.id {
            return None;
        }
        index.get(target).copied()
    };

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; ordered.len()];
    let mut issues = Vec::new();
    for start in 0..ordered.len() {
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(position) = cursor {
            match marks[position] {
                Mark::Done => break,
                Mark::OnPath => {
                    let Some(entry) = path.iter().position(|member| *member == position) else {
                        break;
                    };
                    let members = &path[entry..];
                    let anchor = members.iter().copied().min().unwrap_or(position);
                    let chain = members
                        .iter()
                        .map(|member| ordered[*member].id.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    issues.push(LogicIssue::new(
                        ordered[anchor],
                        IssueCode::SkipCycle,
                        format!("skip_to rules form a cycle: {}", chain),
                    ));
                    break;
                }
                Mark::Unvisited => {
                    marks[position] = Mark::OnPath;
                    path.push(position);
                    cursor = edge(position);
                }
            }
        }
        for member in path {
            marks[member] = Mark::Done;
        }
    }
    issues
}
