use serde_json::Value;

/// Controls which bits of state the reports print.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Only the answer to the question asked.
    Clean,
    /// Adds progress counters and per-question detail.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Formats facade responses as human-friendly lines.
pub struct Reporter {
    verbosity: Verbosity,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn visibility(&self, response: &Value) -> Vec<String> {
        let mut lines = vec!["Visible questions:".to_string()];
        for question in array(response, "questions") {
            let visible = question["visible"].as_bool().unwrap_or(false);
            if !visible && !self.verbosity.is_verbose() {
                continue;
            }
            let mut entry = format!(" - {}", display(&question["id"]));
            if !visible {
                entry.push_str(" [hidden]");
            }
            if question["required"].as_bool().unwrap_or(false) {
                entry.push_str(" [required]");
            }
            if question["answered"].as_bool().unwrap_or(false) {
                entry.push_str(" [answered]");
            }
            lines.push(entry);
        }
        lines
    }

    pub fn next(&self, response: &Value) -> Vec<String> {
        let mut lines = Vec::new();
        match response["next_question_id"].as_str() {
            Some(id) => {
                lines.push(format!("Next question: {}", id));
                if let Some(text) = response["text"].as_str().filter(|text| !text.is_empty()) {
                    lines.push(format!("  Text: {}", text));
                }
            }
            None => lines.push("All visible questions are answered.".to_string()),
        }
        if self.verbosity.is_verbose() {
            lines.push(self.progress_line(&response["progress"]));
        }
        lines
    }

    pub fn progress(&self, response: &Value) -> Vec<String> {
        vec![self.progress_line(response)]
    }

    pub fn validation(&self, response: &Value) -> Vec<String> {
        let valid = response["is_valid"].as_bool().unwrap_or(false);
        let mut lines = vec![format!(
            "Validation result: {}",
            if valid { "valid" } else { "invalid" }
        )];
        let missing = array(response, "missing_questions")
            .iter()
            .map(display)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            lines.push(format!("Missing required answers: {}", missing.join(", ")));
        }
        if self.verbosity.is_verbose() {
            lines.push(self.progress_line(&response["progress"]));
        }
        lines
    }

    pub fn path(&self, response: &Value) -> Vec<String> {
        let steps = array(response, "questions")
            .iter()
            .map(display)
            .collect::<Vec<_>>();
        let mut lines = vec![format!("Path: {}", steps.join(" -> "))];
        if response["truncated"].as_bool().unwrap_or(false) {
            lines.push("Path truncated.".to_string());
        }
        if let Some(cycle) = response["cycle"].as_str() {
            lines.push(format!("Cycle detected at question {}", cycle));
        }
        lines
    }

    pub fn lint(&self, response: &Value) -> Vec<String> {
        let issues = array(response, "issues");
        if issues.is_empty() {
            return vec!["No logic issues found.".to_string()];
        }
        let mut lines = vec![format!("Logic issues: {}", issues.len())];
        for issue in issues {
            lines.push(format!(
                "  {} [{}] {}",
                display(&issue["question_id"]),
                display(&issue["code"]),
                display(&issue["message"])
            ));
        }
        lines
    }

    fn progress_line(&self, progress: &Value) -> String {
        format!(
            "Progress: {}/{} ({}%)",
            progress["current"].as_u64().unwrap_or(0),
            progress["total"].as_u64().unwrap_or(0),
            progress["percentage"].as_u64().unwrap_or(0)
        )
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_visibility_skips_hidden_questions() {
        let response = json!({
            "questions": [
                { "id": "1", "visible": true, "required": true, "answered": false },
                { "id": "2", "visible": false, "required": false, "answered": false }
            ]
        });
        let clean = Reporter::new(Verbosity::Clean).visibility(&response);
        assert_eq!(clean, vec!["Visible questions:", " - 1 [required]"]);
        let verbose = Reporter::new(Verbosity::Verbose).visibility(&response);
        assert_eq!(verbose.len(), 3);
        assert_eq!(verbose[2], " - 2 [hidden]");
    }

    #[test]
    fn path_mentions_cycles() {
        let response = json!({ "questions": ["a", "b"], "truncated": false, "cycle": "a" });
        let lines = Reporter::new(Verbosity::Clean).path(&response);
        assert_eq!(lines[0], "Path: a -> b");
        assert_eq!(lines[1], "Cycle detected at question a");
    }
}
