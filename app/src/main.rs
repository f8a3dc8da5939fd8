//! TabTab CLI - headless copy generation against the configured provider.

mod exit_codes;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use exit_codes::*;
use tabtab::{CommandError, Generator, TabTab};
use tabtab_config::ai::{self, ResolvedProviderConfig};
use tabtab_config::guidelines;
use tabtab_config::{AIProvider, PromptConfig, ProviderDiagnostics, Settings};
use tabtab_core::{parse_a1, GridDims, Range, NUM_COLS};
use tabtab_engine::Sheet;
use tabtab_provider::{CompletionProvider, GenerateError, HttpProvider};

#[derive(Parser)]
#[command(name = "tabtab")]
#[command(about = "Draft and rewrite UX copy across tones (headless)")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Provider to use instead of the configured one (ollama, openai, claude, gemini)
    #[arg(long, global = true)]
    provider: Option<AIProvider>,

    /// Model to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite one piece of copy in a tone and print the result
    #[command(after_help = "\
Examples:
  tabtab generate --tone playful 'Sign in to continue'
  tabtab generate --tone formal --provider openai 'Oops, try again'
  tabtab generate --tone concise --config prompts.json 'Your changes were saved'")]
    Generate {
        /// Tone to write in (matched case-insensitively against the prompt config)
        #[arg(long, short = 't')]
        tone: String,

        /// Prompt configuration document
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Source copy
        text: String,
    },

    /// Drag-fill a TSV grid and print the result
    #[command(after_help = "\
Row 1 of the grid holds the tone headers. The fill behaves like dragging
the fill handle from --from to --to: every other cell in the rectangle is
generated from the --from cell.

Examples:
  tabtab fill copy.tsv --from A2 --to C4
  tabtab fill copy.tsv --from B2 --to B10 -o copy.filled.tsv")]
    Fill {
        /// TSV grid file
        grid: PathBuf,

        /// Source cell (A1 notation)
        #[arg(long)]
        from: String,

        /// Opposite corner of the fill rectangle (A1 notation)
        #[arg(long)]
        to: String,

        /// Prompt configuration document
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Write the grid here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the resolved provider configuration
    Doctor {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// List Gemini models that support text generation
    Models,

    /// Save the provider (and optionally its model) to the settings file
    #[command(after_help = "\
Examples:
  tabtab use openai
  tabtab use gemini --model gemini-1.5-flash
  tabtab use ollama --model mistral")]
    Use {
        /// Provider to select
        provider: AIProvider,
    },

    /// Print the house writing guidelines used by `{writingGuidelines}`
    Guidelines {
        /// Every rule instead of the prompt summary
        #[arg(long)]
        full: bool,
    },

    /// Store a provider API key in the system keychain
    #[command(after_help = "\
Examples:
  tabtab set-key openai sk-...
  tabtab set-key gemini AIza...")]
    SetKey {
        /// Provider the key belongs to
        provider: AIProvider,

        /// API key
        key: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let overrides = Overrides {
        settings: cli.settings,
        provider: cli.provider,
        model: cli.model,
    };

    let result = match cli.command {
        Commands::Generate { tone, config, text } => cmd_generate(&overrides, &tone, config, &text),
        Commands::Fill { grid, from, to, config, output } => {
            cmd_fill(&overrides, grid, &from, &to, config, output)
        }
        Commands::Doctor { json } => cmd_doctor(&overrides, json),
        Commands::Models => cmd_models(&overrides),
        Commands::Use { provider } => cmd_use(&overrides, provider),
        Commands::Guidelines { full } => {
            println!("{}", if full { guidelines::full() } else { guidelines::summary() });
            Ok(())
        }
        Commands::SetKey { provider, key } => cmd_set_key(provider, &key),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PROVIDER_NOT_CONFIGURED, message: msg.into(), hint: None }
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PROVIDER_FAILED, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<GenerateError> for CliError {
    fn from(err: GenerateError) -> Self {
        if err.is_configuration() {
            CliError::not_configured(err.to_string())
        } else {
            CliError::provider(err.to_string())
        }
    }
}

/// Hint for a provider that cannot run yet.
fn setup_hint(provider: AIProvider) -> String {
    if provider.needs_api_key() {
        format!(
            "run `tabtab set-key {}` or set {}",
            provider.name(),
            ai::env_var_name(provider.name())
        )
    } else {
        format!("pass --model or set ai.{}_model in {}", provider.name(), Settings::config_path_display())
    }
}

// ============================================================================
// Provider setup
// ============================================================================

/// Command-line overrides applied on top of the settings file.
struct Overrides {
    settings: Option<PathBuf>,
    provider: Option<AIProvider>,
    model: Option<String>,
}

impl Overrides {
    /// Settings as stored, without overrides.
    fn load_stored(&self) -> Settings {
        match &self.settings {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
    }

    fn load_settings(&self) -> Settings {
        let mut settings = self.load_stored();
        if let Some(provider) = self.provider {
            settings.ai.provider = provider;
        }
        self.apply_model(&mut settings);
        settings
    }

    /// `--model` applies to whichever provider ends up selected.
    fn apply_model(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            let provider = settings.ai.provider;
            settings.ai.set_model(provider, model);
        }
    }
}

/// Prompt document: an explicit `--config` must load; the one named in
/// settings falls back to the built-in prompts.
fn load_prompts(explicit: Option<PathBuf>, settings: &Settings) -> Result<PromptConfig, CliError> {
    match explicit {
        Some(path) => PromptConfig::load(&path).map_err(|e| CliError::usage(e.to_string())),
        None => Ok(PromptConfig::load_or_default(settings.prompt_config.as_deref())),
    }
}

fn build_provider(settings: &Settings) -> Result<HttpProvider, CliError> {
    let resolved = ResolvedProviderConfig::from_settings(&settings.ai);
    log::debug!(
        "provider {} model {:?} status {}",
        resolved.provider_name(),
        resolved.model,
        resolved.status.as_str()
    );
    let client = HttpProvider::from_resolved(&resolved).map_err(|e| {
        let hint = setup_hint(resolved.provider);
        CliError::from(e).with_hint(hint)
    })?;
    log::info!("using {} ({})", client.display_name(), client.model());
    Ok(client)
}

// ============================================================================
// generate
// ============================================================================

fn cmd_generate(overrides: &Overrides, tone: &str, config: Option<PathBuf>, text: &str) -> Result<(), CliError> {
    if text.trim().is_empty() {
        return Err(CliError::usage("source text is empty"));
    }
    let settings = overrides.load_settings();
    let prompts = load_prompts(config, &settings)?;
    let provider = build_provider(&settings)?;

    // No placeholder to keep on screen here
    let generator = Generator::new(Box::new(provider), prompts).with_min_display(Duration::ZERO);
    let output = generator.generate_text(&tone.trim().to_lowercase(), text.trim())?;
    println!("{}", output);
    Ok(())
}

// ============================================================================
// fill
// ============================================================================

fn parse_cell_arg(flag: &str, value: &str, dims: GridDims) -> Result<tabtab_core::CellRef, CliError> {
    let cell = parse_a1(value).ok_or_else(|| CliError::usage(format!("{}: invalid cell address '{}'", flag, value)))?;
    if !dims.contains(cell) {
        return Err(CliError::usage(format!("{}: {} is outside the grid", flag, value)));
    }
    Ok(cell)
}

fn cmd_fill(
    overrides: &Overrides,
    grid: PathBuf,
    from: &str,
    to: &str,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let text = fs::read_to_string(&grid)
        .map_err(|e| CliError::usage(format!("cannot read {}: {}", grid.display(), e)))?;

    let settings = overrides.load_settings();
    let line_count = text.lines().count();
    let dims = GridDims::new(settings.rows.max(line_count).max(2), NUM_COLS);

    let origin = parse_cell_arg("--from", from, dims)?;
    let corner = parse_cell_arg("--to", to, dims)?;
    if origin.is_header() {
        return Err(CliError::usage("--from must not be in the header row").with_hint("row 1 holds the tone names"));
    }

    let prompts = load_prompts(config, &settings)?;
    let provider = build_provider(&settings)?;
    let generator = Generator::new(Box::new(provider), prompts)
        .with_min_display(Duration::from_millis(settings.min_display_ms));

    let mut app = TabTab::new(Sheet::from_tsv(dims, &text), generator);
    let report = app
        .fill_dragged_range(origin, Range::spanning(origin, corner))
        .map_err(|e| match e {
            CommandError::NotConfigured(msg) => CliError::not_configured(msg),
            other => CliError::general(other.to_string()),
        })?;

    write_grid(output.as_deref(), &app.sheet().to_tsv())?;

    eprintln!(
        "{}: {} generated, {} failed ({})",
        grid.display(),
        report.generated_count(),
        report.failed_count(),
        app.generator().provider_name()
    );
    if report.failed_count() > 0 {
        return Err(CliError::provider(format!("{} cell(s) failed", report.failed_count()))
            .with_hint("failed cells hold an error marker; run with -v for details"));
    }
    Ok(())
}

fn write_grid(output: Option<&Path>, tsv: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let mut contents = tsv.to_string();
            contents.push('\n');
            fs::write(path, contents)
                .map_err(|e| CliError::general(format!("cannot write {}: {}", path.display(), e)))
        }
        None => {
            println!("{}", tsv);
            Ok(())
        }
    }
}

// ============================================================================
// doctor
// ============================================================================

fn cmd_doctor(overrides: &Overrides, json: bool) -> Result<(), CliError> {
    let settings = overrides.load_settings();
    let diag = ProviderDiagnostics::from_settings(&settings.ai);

    if json {
        let output = serde_json::to_string_pretty(&diag).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", output);
    } else {
        print!("{}", diag);
        println!("Settings:          {}", Settings::config_path_display());
        if !diag.status.is_ready() {
            println!();
            println!("hint: {}", setup_hint(settings.ai.provider));
        }
    }
    Ok(())
}

// ============================================================================
// models
// ============================================================================

fn cmd_models(overrides: &Overrides) -> Result<(), CliError> {
    let mut settings = overrides.load_settings();
    settings.ai.provider = AIProvider::Gemini;
    let resolved = ResolvedProviderConfig::from_settings(&settings.ai);
    if resolved.api_key.is_none() {
        return Err(CliError::not_configured(AIProvider::Gemini.missing_key_message())
            .with_hint(setup_hint(AIProvider::Gemini)));
    }

    // Listing needs no model, so skip the readiness check in from_resolved
    let client = HttpProvider::with_base_url(
        AIProvider::Gemini,
        &resolved.model,
        resolved.api_key.clone(),
        resolved.base_url.clone(),
    )?;
    let models = client.list_gemini_models()?;
    if models.is_empty() {
        eprintln!("no {} models support generateContent", client.display_name());
    }
    for model in models {
        println!("{}", model);
    }
    Ok(())
}

// ============================================================================
// use
// ============================================================================

fn cmd_use(overrides: &Overrides, provider: AIProvider) -> Result<(), CliError> {
    let mut settings = overrides.load_stored();
    settings.ai.provider = provider;
    overrides.apply_model(&mut settings);

    let result = match &overrides.settings {
        Some(path) => settings.save_to(path),
        None => settings.save(),
    };
    result.map_err(|e| CliError::general(format!("cannot save settings: {}", e)))?;

    let status = ResolvedProviderConfig::from_settings(&settings.ai);
    let model = if status.model.is_empty() { "(none)" } else { status.model.as_str() };
    eprintln!("provider: {} (model {})", provider.display_name(), model);
    if let Some(reason) = &status.blocking_reason {
        eprintln!("note:     {}", reason);
        eprintln!("hint:     {}", setup_hint(provider));
    }
    Ok(())
}

// ============================================================================
// set-key
// ============================================================================

fn cmd_set_key(provider: AIProvider, key: &str) -> Result<(), CliError> {
    if !provider.needs_api_key() {
        return Err(CliError::usage(format!("{} does not use an API key", provider.display_name())));
    }
    if key.trim().is_empty() {
        return Err(CliError::usage("key is empty"));
    }
    ai::set_api_key(provider.name(), key).map_err(|e| {
        CliError::general(e).with_hint(format!("set {} instead", ai::env_var_name(provider.name())))
    })?;
    eprintln!("stored {} key in the system keychain", provider.display_name());
    Ok(())
}
