//! Implementation of the `casegen eval` command.

use casegen::{evaluate, EvalContext, Scope, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Arguments for the eval command.
#[derive(Debug, clap::Args)]
pub struct EvalArgs {
    /// Expression to evaluate
    pub expression: String,

    /// Bindings in name=expression format (repeatable, evaluated in order)
    #[arg(short = 'b', long = "bind", value_parser = parse_key_val)]
    pub bindings: Vec<(String, String)>,

    /// Seed for randint() and choice()
    #[arg(long, env = "CASEGEN_SEED")]
    pub seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What `--json` prints for one evaluation.
#[derive(Serialize)]
#[serde(untagged)]
enum EvalReport {
    Value { result: Value, display: String },
    Failure { error: String },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, expression)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), expression.to_string()))
        }
        _ => Err(format!("expected name=expression, got '{s}'")),
    }
}

/// Evaluate bindings in order into a fresh scope, then the expression.
fn evaluate_with_bindings(args: &EvalArgs, rng: &mut StdRng) -> Result<Value, String> {
    let mut scope = Scope::new();
    for (name, expression) in &args.bindings {
        let value = evaluate(expression, &mut EvalContext::new(&scope, &mut *rng))
            .map_err(|e| format!("binding '{name}': {e}"))?;
        scope.assign(name.as_str(), value);
    }
    evaluate(&args.expression, &mut EvalContext::new(&scope, rng)).map_err(|e| e.to_string())
}

pub fn run_eval(args: EvalArgs) -> miette::Result<i32> {
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let outcome = evaluate_with_bindings(&args, &mut rng);
    let code = if outcome.is_ok() {
        exitcode::OK
    } else {
        exitcode::DATAERR
    };

    if args.json {
        let report = match outcome {
            Ok(result) => EvalReport::Value {
                display: result.to_string(),
                result,
            },
            Err(error) => EvalReport::Failure { error },
        };
        let rendered = serde_json::to_string_pretty(&report).into_diagnostic()?;
        if code == exitcode::OK {
            println!("{rendered}");
        } else {
            eprintln!("{rendered}");
        }
    } else {
        match outcome {
            Ok(result) => println!("{result}"),
            Err(message) => eprintln!("{} {message}", "error:".red().bold()),
        }
    }
    Ok(code)
}
