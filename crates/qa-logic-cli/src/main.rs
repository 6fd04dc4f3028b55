mod report;

use clap::{Args, Parser, Subcommand, ValueEnum};
use component_logic::{dynamic_text, lint, next, path, progress, validate_answers, visibility};
use report::{Reporter, Verbosity};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Questionnaire logic inspector",
    long_about = "Evaluates visibility, requiredness, skip navigation, dynamic text and progress for a question registry and a set of answers"
)]
struct Cli {
    /// Show verbose output (progress counters, hidden questions, debug logs).
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct Inputs {
    /// Path to the question registry JSON (an array of questions).
    #[arg(long, value_name = "QUESTIONS")]
    questions: PathBuf,
    /// Optional JSON file containing the answer list.
    #[arg(long, value_name = "ANSWERS")]
    answers: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List visible questions with their requiredness.
    Visible {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Show the question that follows another one (or the first question).
    Next {
        #[command(flatten)]
        inputs: Inputs,
        /// Current question id; omit to get the first visible question.
        #[arg(long, value_name = "ID")]
        from: Option<String>,
    },
    /// Render a question's text with answer interpolation applied.
    Text {
        #[command(flatten)]
        inputs: Inputs,
        /// Question id to render.
        #[arg(long, value_name = "ID")]
        question: String,
    },
    /// Report completion over the visible questions.
    Progress {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Check that every visible required question is answered.
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Walk the navigation path from a question until the end or a cycle.
    Path {
        #[command(flatten)]
        inputs: Inputs,
        /// Question id to start from.
        #[arg(long, value_name = "ID")]
        from: String,
        /// Stop listing after this many questions.
        #[arg(long, value_name = "N")]
        max_len: Option<usize>,
    },
    /// Report structural problems in the question registry.
    Lint {
        /// Path to the question registry JSON.
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
    },
    /// Print the JSON schema of the question registry format.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let reporter = Reporter::new(Verbosity::from_verbose(cli.verbose));
    let format = cli.format;

    match cli.command {
        Command::Visible { inputs } => {
            let (config, answers) = load_inputs(&inputs, None)?;
            let response = parse_component_result(&visibility(&config, &answers))?;
            emit(format, &response, || reporter.visibility(&response))
        }
        Command::Next { inputs, from } => {
            let (config, answers) = load_inputs(&inputs, None)?;
            let current = from.unwrap_or_default();
            let response = parse_component_result(&next(&config, &answers, &current))?;
            emit(format, &response, || reporter.next(&response))
        }
        Command::Text { inputs, question } => {
            let (config, answers) = load_inputs(&inputs, None)?;
            let response = parse_component_result(&dynamic_text(&config, &answers, &question))?;
            emit(format, &response, || {
                vec![response["text"].as_str().unwrap_or_default().to_string()]
            })
        }
        Command::Progress { inputs } => {
            let (config, answers) = load_inputs(&inputs, None)?;
            let response = parse_component_result(&progress(&config, &answers))?;
            emit(format, &response, || reporter.progress(&response))
        }
        Command::Validate { inputs } => {
            let (config, answers) = load_inputs(&inputs, None)?;
            let response = parse_component_result(&validate_answers(&config, &answers))?;
            emit(format, &response, || reporter.validation(&response))?;
            if response["is_valid"].as_bool().unwrap_or(false) {
                Ok(())
            } else {
                Err("validation failed".into())
            }
        }
        Command::Path {
            inputs,
            from,
            max_len,
        } => {
            let (config, answers) = load_inputs(&inputs, max_len)?;
            let response = parse_component_result(&path(&config, &answers, &from))?;
            emit(format, &response, || reporter.path(&response))
        }
        Command::Lint { questions } => {
            let config = config_json(&questions, None)?;
            let response = parse_component_result(&lint(&config))?;
            emit(format, &response, || reporter.lint(&response))?;
            if response["valid"].as_bool().unwrap_or(false) {
                Ok(())
            } else {
                Err("logic issues found".into())
            }
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&qa_logic::questions_schema())?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_json(questions_path: &Path, max_path_len: Option<usize>) -> CliResult<String> {
    let questions_json = fs::read_to_string(questions_path)?;
    debug!(path = %questions_path.display(), "loaded question registry");
    Ok(json!({
        "questions_json": questions_json,
        "max_path_len": max_path_len,
    })
    .to_string())
}

fn load_inputs(inputs: &Inputs, max_path_len: Option<usize>) -> CliResult<(String, String)> {
    let config = config_json(&inputs.questions, max_path_len)?;
    let answers = match &inputs.answers {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    Ok((config, answers))
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn emit(
    format: OutputFormat,
    response: &Value,
    text: impl FnOnce() -> Vec<String>,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Text => {
            for line in text() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
