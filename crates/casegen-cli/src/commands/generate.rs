//! Implementation of the `casegen gen` command.

use std::fs::read_to_string;
use std::path::PathBuf;

use casegen::{ErrorKind, Generator, Scope, Sink, SinkError};
use miette::{miette, IntoDiagnostic, Report, Result};
use serde::Serialize;

use crate::output::TemplateDiagnostic;

/// Arguments for the gen command.
#[derive(Debug, clap::Args)]
pub struct GenArgs {
    /// Template file (.gen)
    pub template: PathBuf,

    /// Seed for reproducible output
    #[arg(long, env = "CASEGEN_SEED")]
    pub seed: Option<u64>,

    /// Directory that relative template paths are resolved in
    #[arg(long, env = "CASEGEN_TEMPLATES")]
    pub templates_dir: Option<PathBuf>,

    /// Copy the output to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Output as JSON (output, scope and warnings)
    #[arg(long)]
    pub json: bool,
}

/// JSON output for a generation run.
#[derive(Serialize)]
struct GenJson<'a> {
    output: &'a str,
    scope: &'a Scope,
    warnings: Vec<WarningJson>,
}

#[derive(Serialize)]
struct WarningJson {
    line: usize,
    message: String,
}

/// Run the gen command.
pub fn run_gen(args: GenArgs) -> Result<i32> {
    let generator = Generator::builder()
        .maybe_seed(args.seed)
        .maybe_templates_dir(args.templates_dir)
        .maybe_sink(args.copy.then(clipboard_sink))
        .build();

    let path = generator.resolve_path(&args.template);
    let content = match read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Cannot read template {}: {}", path.display(), e);
            return Ok(exitcode::NOINPUT);
        }
    };

    let generation = match generator.run_str(&content) {
        Ok(generation) => generation,
        Err(e) => {
            let diagnostic = TemplateDiagnostic::from_generate_error(&path, &content, &e);
            eprintln!("{:?}", Report::new(diagnostic));
            return Ok(match e.kind() {
                ErrorKind::Io => exitcode::NOINPUT,
                ErrorKind::Sink => exitcode::SOFTWARE,
                _ => exitcode::DATAERR,
            });
        }
    };

    if args.copy {
        generator
            .emit(&generation.output)
            .map_err(|e| miette!("{e}"))?;
    }

    if args.json {
        let output = GenJson {
            output: &generation.output,
            scope: &generation.scope,
            warnings: generation
                .warnings
                .iter()
                .map(|warning| WarningJson {
                    line: warning.line,
                    message: warning.kind.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        print!("{}", generation.output);
    }
    Ok(exitcode::OK)
}

#[cfg(feature = "clipboard")]
fn clipboard_sink() -> Box<dyn Sink> {
    Box::new(|text: &str| {
        cli_clipboard::set_contents(text.to_string()).map_err(|e| SinkError::Unavailable {
            reason: e.to_string(),
        })
    })
}

#[cfg(not(feature = "clipboard"))]
fn clipboard_sink() -> Box<dyn Sink> {
    Box::new(|_: &str| -> Result<(), SinkError> {
        Err(SinkError::Unavailable {
            reason: "casegen was built without the `clipboard` feature".to_string(),
        })
    })
}
