//! CLI binary for Guided Component Architect: generate UI components that respect a
//! design token set, validating and self-correcting the model output.
//!
//! The generated code is the only thing written to stdout; logs (including the usage
//! summary) and diagnostics go to stderr so the output can be piped straight into a file.

use anyhow::{Context, Result, bail};
use clap::Parser;
use gca_agent::{DemoProvider, GenerationOutcome, LlmProvider, LoopConfig, run_generation};
use gca_core::{DesignTokenSet, GcaConfig};
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Success, or a best-effort result without `--strict`.
const EXIT_OK: u8 = 0;
/// Configuration, input or provider failure; nothing was written to stdout.
const EXIT_FATAL: u8 = 1;
/// Best-effort result under `--strict`; the code was still written to stdout.
const EXIT_RESIDUAL: u8 = 2;

#[derive(Parser)]
#[command(
    name = "gca",
    version,
    about = "Generate design-system compliant UI components"
)]
struct Cli {
    /// Component description (read from stdin when omitted)
    description: Vec<String>,

    /// Project root directory (defaults to current directory)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Design token file, .json or .toml (relative paths resolve against the project root)
    #[arg(short, long)]
    tokens: Option<PathBuf>,

    /// Self-correction attempts after the first generation
    #[arg(short, long)]
    retries: Option<usize>,

    /// Provider: openai, groq, anthropic
    #[arg(long)]
    provider: Option<String>,

    /// Model override
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[arg(long)]
    base_url: Option<String>,

    /// Exit with code 2 when the result still has validation errors
    #[arg(long)]
    strict: bool,

    /// Use the offline demo provider (no API key needed)
    #[arg(long)]
    demo: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Also write the generation outcome as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line flags on top of the loaded configuration.
    fn apply_to(&self, config: &mut GcaConfig) {
        if let Some(retries) = self.retries {
            config.generation.max_retries = retries;
        }
        if let Some(provider) = &self.provider {
            config.provider.name.clone_from(provider);
        }
        if self.model.is_some() {
            config.provider.model.clone_from(&self.model);
        }
        if self.base_url.is_some() {
            config.provider.base_url.clone_from(&self.base_url);
        }
        if self.strict {
            config.generation.fail_on_residual = true;
        }
        if self.demo {
            config.generation.demo = true;
        }
    }
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn tokens_path(project_root: &Path, flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => project_root.join(p),
        None => project_root.join(gca_core::tokens::DEFAULT_TOKENS_FILE),
    }
}

/// Join positional words, or read one line from stdin when there are none.
fn read_description(words: &[String]) -> Result<String> {
    let description = if words.is_empty() {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            eprint!("Describe the component: ");
            std::io::stderr().flush().ok();
        }
        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read description from stdin")?;
        line
    } else {
        words.join(" ")
    };

    let description = description.trim();
    if description.is_empty() {
        bail!("component description must not be empty");
    }
    Ok(description.to_string())
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    ExitCode::from(exit_status(run(&cli)))
}

fn exit_status(result: Result<u8>) -> u8 {
    match result {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    }
}

fn outcome_status(outcome: &GenerationOutcome, fail_on_residual: bool) -> u8 {
    if !outcome.is_success() && fail_on_residual {
        EXIT_RESIDUAL
    } else {
        EXIT_OK
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let project_root = get_project_root(cli)?;

    let mut config = GcaConfig::load(&project_root)?;
    cli.apply_to(&mut config);

    let path = tokens_path(&project_root, cli.tokens.as_deref());
    let tokens = DesignTokenSet::load(&path)?;
    tracing::info!(
        path = %path.display(),
        primary = tokens.primary_color(),
        "loaded design tokens"
    );

    let description = read_description(&cli.description)?;

    let provider: Box<dyn LlmProvider> = if config.generation.demo {
        tracing::info!("using offline demo provider");
        Box::new(DemoProvider::new(&tokens))
    } else {
        gca_agent::create_provider(&config.provider)?
    };
    tracing::info!(model = provider.model_name(), "provider ready");

    let loop_config = LoopConfig {
        max_retries: config.generation.max_retries,
        framework: &config.generation.framework,
        temperature: config.generation.temperature,
        correction_temperature: config.generation.correction_temperature,
        show_progress: !cli.quiet && std::io::stderr().is_terminal(),
        ..LoopConfig::new(provider.as_ref(), &tokens)
    };
    let outcome = run_generation(&description, &loop_config)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", outcome.code).context("failed to write component to stdout")?;
    stdout.flush().context("failed to flush stdout")?;

    summarize(&outcome);
    if let Some(path) = &cli.report {
        write_report(path, &outcome)?;
    }

    Ok(outcome_status(&outcome, config.generation.fail_on_residual))
}

fn write_report(path: &Path, outcome: &GenerationOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("failed to serialize outcome")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote generation report");
    Ok(())
}

fn summarize(outcome: &GenerationOutcome) {
    if outcome.is_success() {
        eprintln!(
            "\nComponent passed all checks after {} regeneration(s).",
            outcome.regenerations
        );
    } else {
        eprintln!(
            "\nBest effort: {} error(s) remain after {} regeneration(s):",
            outcome.errors.len(),
            outcome.regenerations
        );
        for error in &outcome.errors {
            eprintln!("  [{}] {}", error.kind, error.message);
        }
    }
    if !outcome.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &outcome.warnings {
            eprintln!("  [{}] {}", warning.kind, warning.message);
        }
    }
    if outcome.sanitizer_hits > 0 {
        eprintln!(
            "Blocked {} injection phrase(s) in the description.",
            outcome.sanitizer_hits
        );
    }
    tracing::info!(
        calls = outcome.usage.calls,
        input_tokens = outcome.usage.input_tokens,
        output_tokens = outcome.usage.output_tokens,
        "usage: {}",
        outcome.usage
    );
}
