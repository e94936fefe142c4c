//! The template driver.
//!
//! The driver locates the `#begin`/`#end` section, dispatches every active
//! line to its type generator in order, accumulates the output buffer and
//! hands it to the configured sink.

use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::interpreter::error::{
    GenerateError, GenerateWarning, LineError, RESERVED_PREFIX, WarningKind, compute_suggestions,
};
use crate::interpreter::generators::generate;
use crate::interpreter::sink::Sink;
use crate::interpreter::{EvalContext, Scope};
use crate::parser::{SourceLine, TYPE_KEYWORDS, TypeSpec, active_lines, parse_line};

/// Log lines longer than this many characters are compacted.
pub const DEFAULT_COMPACT_LENGTH: usize = 80;

/// Runs templates and produces their output buffers.
///
/// A `Generator` holds configuration only; every run gets a fresh
/// [`Scope`] and a fresh random source, so runs never influence each
/// other. With a `seed`, every run of the same template produces the same
/// output.
///
/// # Example
///
/// ```
/// use casegen::Generator;
///
/// let generator = Generator::builder().seed(7).build();
/// let run = generator
///     .run_str("#begin\nn[int](3,3)$\nxs[intlist n](1,1)$\n#end")
///     .unwrap();
///
/// assert_eq!(run.output, "3\n1 1 1\n");
/// assert_eq!(run.scope.len(), 2);
/// ```
#[derive(Builder)]
pub struct Generator {
    /// Seed for the random source; entropy-seeded when absent.
    seed: Option<u64>,

    /// Directory relative template paths are resolved against.
    #[builder(into)]
    templates_dir: Option<PathBuf>,

    /// Maximum length of values echoed into log events.
    #[builder(default = DEFAULT_COMPACT_LENGTH)]
    compact_length: usize,

    /// Destination for emitted buffers.
    sink: Option<Box<dyn Sink>>,
}

/// The result of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// The rendered buffer: one fragment plus suffix per generated line.
    pub output: String,
    /// Every assigned variable with its final value.
    pub scope: Scope,
    /// Non-fatal warnings, in line order.
    pub warnings: Vec<GenerateWarning>,
}

/// Mutable state of a single run.
struct Run {
    scope: Scope,
    rng: StdRng,
    output: String,
    warnings: Vec<GenerateWarning>,
}

impl Default for Generator {
    fn default() -> Self {
        Generator::builder().build()
    }
}

impl Generator {
    /// Create a generator with default settings: entropy-seeded, no sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a template path: relative paths are looked up in the
    /// templates directory when one is configured.
    pub fn resolve_path(&self, template: impl AsRef<Path>) -> PathBuf {
        let template = template.as_ref();
        match &self.templates_dir {
            Some(dir) if template.is_relative() => dir.join(template),
            _ => template.to_path_buf(),
        }
    }

    /// Run a template file and return its buffer.
    ///
    /// With `emit`, the buffer is also pushed to the configured sink.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; no partial buffer is produced.
    pub fn generate(&self, template: impl AsRef<Path>, emit: bool) -> Result<String, GenerateError> {
        let generation = self.run_file(template)?;
        if emit {
            self.emit(&generation.output)?;
        }
        Ok(generation.output)
    }

    /// Run a template file, returning the buffer, scope and warnings.
    pub fn run_file(&self, template: impl AsRef<Path>) -> Result<Generation, GenerateError> {
        let path = self.resolve_path(template);
        let source = fs::read_to_string(&path).map_err(|e| {
            error!("failed to read template {}: {e}", path.display());
            GenerateError::Io {
                path: path.clone(),
                source: e,
            }
        })?;
        debug!("template {} opened", path.display());
        self.run_str(&source)
    }

    /// Run template source text.
    pub fn run_str(&self, source: &str) -> Result<Generation, GenerateError> {
        let Some(lines) = active_lines(source) else {
            error!("no #begin marker found in template");
            return Err(GenerateError::MissingBegin);
        };
        info!("#begin marker found, {} active line(s)", lines.len());

        let mut run = Run {
            scope: Scope::new(),
            rng: self.rng(),
            output: String::new(),
            warnings: Vec::new(),
        };
        for line in &lines {
            self.run_line(line, &mut run).map_err(|source| {
                error!("line {}: {source}", line.number);
                error!("> {}", line.text);
                GenerateError::Line {
                    number: line.number,
                    text: line.text.to_string(),
                    source,
                }
            })?;
        }

        Ok(Generation {
            output: run.output,
            scope: run.scope,
            warnings: run.warnings,
        })
    }

    /// Push a buffer to the configured sink.
    pub fn emit(&self, text: &str) -> Result<(), GenerateError> {
        let Some(sink) = &self.sink else {
            warn!("no output sink configured, buffer not emitted");
            return Ok(());
        };
        sink.emit(text).map_err(|e| {
            error!("failed to emit output: {e}");
            GenerateError::Sink(e)
        })?;
        info!("buffer emitted ({} bytes)", text.len());
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn run_line(&self, line: &SourceLine<'_>, run: &mut Run) -> Result<(), LineError> {
        let parsed = parse_line(line.text);
        let Some(declared) = &parsed.declared_type else {
            if !line.text.trim().is_empty() {
                self.warn(run, line, WarningKind::NoType);
            }
            return Ok(());
        };
        debug!("line {}: identified type [{}]", line.number, declared.text);

        if parsed.extra_brackets > 0 {
            let count = parsed.extra_brackets;
            self.warn(run, line, WarningKind::MultipleBrackets { count });
        }

        let Some(spec) = TypeSpec::parse(&declared.text) else {
            let declared = declared.text.trim().to_string();
            let suggestion = suggest_keyword(&declared);
            self.warn(run, line, WarningKind::UnknownType { declared, suggestion });
            return Ok(());
        };

        let name = parsed
            .variable_name
            .as_ref()
            .map(|fragment| validate_name(&fragment.text))
            .transpose()?;

        let mut ctx = EvalContext::new(&run.scope, &mut run.rng);
        let generated = generate(&spec, &parsed, &mut ctx);
        let line_warnings = ctx.take_warnings();
        for warning in line_warnings {
            self.warn(run, line, warning);
        }
        let generated = generated?;

        info!(
            "{}",
            compact(
                &format!("generated [{}]: {}", spec.keyword(), generated.value.repr()),
                self.compact_length,
            )
        );
        run.output.push_str(&generated.text);
        run.output.push_str(&parsed.suffix);

        if let Some(name) = name {
            info!(
                "{}",
                compact(
                    &format!("assigned {name} = {}", generated.value.repr()),
                    self.compact_length,
                )
            );
            run.scope.assign(name, generated.value);
        }
        Ok(())
    }

    fn warn(&self, run: &mut Run, line: &SourceLine<'_>, kind: WarningKind) {
        let warning = GenerateWarning {
            line: line.number,
            kind,
        };
        warn!("{warning}");
        warn!("> {}", compact(line.text, self.compact_length));
        run.warnings.push(warning);
    }
}

fn validate_name(name: &str) -> Result<String, LineError> {
    if name.starts_with(RESERVED_PREFIX) {
        return Err(LineError::ReservedName {
            name: name.to_string(),
        });
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(LineError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// The closest type keyword to the first word of an unknown declaration.
fn suggest_keyword(declared: &str) -> Option<String> {
    let word = declared
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    let keywords: Vec<String> = TYPE_KEYWORDS.iter().map(|k| (*k).to_string()).collect();
    compute_suggestions(word, &keywords).into_iter().next()
}

/// Trim `text` and shorten it to at most `max` characters, ending in `...`
/// when shortened.
///
/// ```
/// use casegen::compact;
///
/// assert_eq!(compact("  short  ", 80), "short");
/// assert_eq!(compact("abcdefghij", 8), "abcde...");
/// ```
pub fn compact(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
