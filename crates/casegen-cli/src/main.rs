//! casegen CLI entry point.
//!
//! Provides command-line tools for working with casegen templates:
//! - `casegen gen` - Generate a test case from a template
//! - `casegen check` - Validate template lines without generating
//! - `casegen eval` - Evaluate a single expression

mod commands;
mod output;

use std::io::{stderr, IsTerminal};
use std::process::exit;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{run_check, run_eval, run_gen, CheckArgs, EvalArgs, GenArgs};
use tracing_subscriber::EnvFilter;

/// Template-driven random test-case generator.
#[derive(Debug, Parser)]
#[command(name = "casegen")]
#[command(about = "Template-driven random test-case generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a test case from a template
    Gen(GenArgs),
    /// Check template syntax without generating
    Check(CheckArgs),
    /// Evaluate a single expression
    Eval(EvalArgs),
}

/// Apply the color preference to stdout output and decide whether log
/// lines on stderr get ANSI escapes.
fn setup_colors(color_when: ColorWhen) -> bool {
    match color_when {
        // owo-colors reads NO_COLOR, FORCE_COLOR and the TTY itself
        ColorWhen::Auto => stderr().is_terminal(),
        ColorWhen::Always => {
            owo_colors::set_override(true);
            true
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
            false
        }
    }
}

/// Log to stderr so stdout carries only generated output.
///
/// `-v` flags take precedence over `RUST_LOG`; without either, only
/// warnings from casegen are shown.
fn setup_tracing(verbose: u8, ansi: bool) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("casegen=warn")),
        1 => EnvFilter::new("casegen=info"),
        _ => EnvFilter::new("casegen=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let ansi = setup_colors(cli.color);
    setup_tracing(cli.verbose, ansi);

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(ansi)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let code = match cli.command {
        Commands::Gen(args) => run_gen(args),
        Commands::Check(args) => run_check(args),
        Commands::Eval(args) => run_eval(args),
    }
    .unwrap_or_else(|report| {
        eprintln!("{report:?}");
        exitcode::SOFTWARE
    });
    exit(code)
}
