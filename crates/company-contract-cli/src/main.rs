// crates/company-contract-cli/src/main.rs
// ============================================================================
// Module: Company Contract CLI Entry Point
// Description: Command dispatcher for running and inspecting the contract suite.
// Purpose: Run the company API contract suite from a terminal or CI job.
// Dependencies: clap, company-contract, serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! `company-contract run` executes the scenario catalog against the configured
//! base URL and exits non-zero when any case fails. `list` prints the catalog
//! and `config show` prints the effective configuration after file and
//! environment resolution. Diagnostics go to stderr through `tracing`; report
//! lines go to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use company_contract::ArtifactReporter;
use company_contract::CompositeReporter;
use company_contract::ConsoleReporter;
use company_contract::ContractConfig;
use company_contract::ScenarioId;
use company_contract::SuiteRunner;
use company_contract::logging::init_logging;
use company_contract::select_scenarios;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "company-contract", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the contract suite.
    Run(RunCommand),
    /// List catalog scenarios.
    List,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as JSON.
    Show(ConfigShowCommand),
}

/// Arguments for `config show`.
#[derive(Args, Debug)]
struct ConfigShowCommand {
    /// Config file path (defaults to `company-contract.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Config file path (defaults to `company-contract.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL override.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Run only these scenarios (repeatable).
    #[arg(long, value_name = "SCENARIO", value_parser = parse_scenario_arg)]
    only: Vec<ScenarioId>,
    /// Skip these scenarios (repeatable).
    #[arg(long, value_name = "SCENARIO", value_parser = parse_scenario_arg)]
    skip: Vec<ScenarioId>,
    /// Number of creations in `bulk_create`.
    #[arg(long, value_name = "N")]
    bulk_count: Option<usize>,
    /// Delete companies created by the run once it finishes.
    #[arg(long, action = ArgAction::SetTrue)]
    cleanup: bool,
    /// Artifact directory override.
    #[arg(long, value_name = "DIR")]
    run_root: Option<PathBuf>,
    /// Allow writing artifacts into a non-empty run root.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_overwrite: bool,
    /// Skip writing run artifacts.
    #[arg(long, action = ArgAction::SetTrue)]
    no_artifacts: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("company-contract {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    init_logging().map_err(|err| CliError::new(err.to_string()))?;

    match command {
        Commands::Run(command) => command_run(command).await,
        Commands::List => command_list(),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Show(command) => command_config_show(&command),
        },
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes `run`.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = ContractConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_run_overrides(&mut config, &command);
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;

    let scenarios = select_scenarios(&command.only, &command.skip);
    if scenarios.is_empty() {
        return Err(CliError::new("scenario selection is empty".to_string()));
    }
    debug!(scenarios = scenarios.len(), base_url = %config.target.base_url, "resolved run");

    let runner = SuiteRunner::from_config(&config)
        .map_err(|err| CliError::new(err.to_string()))?
        .with_scenarios(scenarios);

    let mut reporter =
        CompositeReporter::new().with(Box::new(ConsoleReporter::new(std::io::stdout())));
    let mut artifact_root = None;
    if config.report.artifacts {
        let artifacts = ArtifactReporter::from_config(&config.report)
            .map_err(|err| CliError::new(err.to_string()))?;
        artifact_root = Some(artifacts.root().to_path_buf());
        reporter = reporter.with(Box::new(artifacts));
    }

    let summary = runner.run(&mut reporter).await.map_err(|err| CliError::new(err.to_string()))?;
    drop(reporter);

    if let Some(root) = artifact_root {
        write_stdout_line(&format!("artifacts: {}", root.display()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(if summary.all_passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Applies `run` flags on top of file and environment configuration.
fn apply_run_overrides(config: &mut ContractConfig, command: &RunCommand) {
    if let Some(base_url) = &command.base_url {
        config.target.base_url.clone_from(base_url);
    }
    if let Some(bulk_count) = command.bulk_count {
        config.suite.bulk_count = bulk_count;
    }
    if command.cleanup {
        config.suite.cleanup = true;
    }
    if let Some(run_root) = &command.run_root {
        config.report.run_root = Some(run_root.clone());
    }
    if command.allow_overwrite {
        config.report.allow_overwrite = true;
    }
    if command.no_artifacts {
        config.report.artifacts = false;
    }
}

/// Parses a scenario label for clap.
fn parse_scenario_arg(value: &str) -> Result<ScenarioId, String> {
    ScenarioId::parse(value).map_err(|err| {
        let known: Vec<&str> = ScenarioId::ALL.iter().map(|id| id.as_str()).collect();
        format!("{err}; expected one of: {}", known.join(", "))
    })
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes `list`.
fn command_list() -> CliResult<ExitCode> {
    for line in catalog_lines() {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders one line per scenario: label, contract row, and title.
fn catalog_lines() -> Vec<String> {
    ScenarioId::ALL
        .iter()
        .map(|id| {
            let row = id.contract();
            format!(
                "{:<22} {:<6} {:<24} {}  {}",
                id.as_str(),
                row.method,
                row.path,
                row.expected_status,
                id.title()
            )
        })
        .collect()
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config show`.
fn command_config_show(command: &ConfigShowCommand) -> CliResult<ExitCode> {
    let config = ContractConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |path| path.display().to_string());
    let rendered = serde_json::to_string_pretty(&config)
        .map_err(|err| CliError::new(format!("failed to render config: {err}")))?;
    write_stdout_line(&format!("# source: {source}"))
        .and_then(|()| write_stdout_line(&rendered))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
