//! Single-shot predictor: one JSON argument in, one JSON line out, exit 0.
//!
//! ```text
//! $ predict-difficulty '{"score": 80, "time_taken": 300}'
//! {"predicted_difficulty":"Medium"}
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use quizrank_cli::{MODEL_ENV, logging};
use quizrank_core::{DEFAULT_MODEL_PATH, PredictionResponse};

#[derive(Parser)]
#[command(name = "predict-difficulty")]
#[command(about = "Predict quiz difficulty from a JSON request", long_about = None)]
#[command(version)]
struct Args {
    /// JSON object with numeric `score` and `time_taken`
    request: Option<String>,

    /// Model artifact path
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
}

fn main() -> ExitCode {
    logging::init("warn");

    let response = match Args::try_parse() {
        Ok(args) => quizrank_ai::invoke(args.request.as_deref(), &args.model),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => PredictionResponse::failure(usage_error(&e)),
    };

    emit(&response)
}

/// First line of a clap error, without its `error: ` prefix.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let line = rendered.lines().next().unwrap_or("invalid arguments");
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

fn emit(response: &PredictionResponse) -> ExitCode {
    write_response(&mut std::io::stdout().lock(), response);
    ExitCode::SUCCESS
}

/// A write failure is logged but never changes the exit status.
fn write_response(out: &mut impl Write, response: &PredictionResponse) {
    let line = response
        .to_json()
        .unwrap_or_else(|_| r#"{"error":"failed to encode response"}"#.to_string());

    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        tracing::error!(error = %e, "cannot write response to stdout");
    }
}
