// crates/wiki-relay-cli/src/main.rs
// ============================================================================
// Module: Wiki Relay CLI Entry Point
// Description: Command dispatcher for the Wiki Relay MCP server.
// Purpose: Run the server from a config file and inspect the tool catalog.
// Dependencies: clap, wiki-relay-core, wiki-relay-mcp, tokio
// ============================================================================

//! ## Overview
//! The Wiki Relay CLI runs the MCP server (`serve`) and prints the advertised
//! tool catalog (`tools`). Configuration resolves from the `--config` flag,
//! the `WIKI_RELAY_CONFIG` environment variable, or `wiki-relay.toml` in the
//! working directory. Errors print to stderr and exit non-zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use wiki_relay_core::tool_definitions;
use wiki_relay_mcp::McpServer;
use wiki_relay_mcp::WikiRelayConfig;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Wiki Relay command line interface.
#[derive(Debug, Parser)]
#[command(name = "wiki-relay", about = "MCP server exposing wiki CRUD tools", version)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// Top-level CLI commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the MCP server with the configured transport.
    Serve(ServeCommand),
    /// Print the advertised tool catalog as JSON.
    Tools(ToolsCommand),
}

/// Arguments for the serve command.
#[derive(Debug, clap::Args)]
struct ServeCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Arguments for the tools command.
#[derive(Debug, clap::Args)]
struct ToolsCommand {
    /// Pretty-print the catalog.
    #[arg(long)]
    pretty: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI errors surfaced on stderr.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration loading or validation failed.
    #[error("config error: {0}")]
    Config(#[from] wiki_relay_mcp::ConfigError),
    /// Server initialization or serving failed.
    #[error("server error: {0}")]
    Server(#[from] wiki_relay_mcp::McpServerError),
    /// Output could not be written.
    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(command) => command_serve(command.config.as_deref()).await,
        Command::Tools(command) => command_tools(command.pretty),
    }
}

/// Loads configuration and runs the MCP server.
async fn command_serve(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = WikiRelayConfig::load(config_path)?;
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::Output(format!("server init join failed: {err}")))??;
    server.serve().await?;
    Ok(())
}

/// Prints the tool catalog to stdout.
fn command_tools(pretty: bool) -> Result<(), CliError> {
    let definitions = tool_definitions();
    let rendered = if pretty {
        serde_json::to_string_pretty(&definitions)
    } else {
        serde_json::to_string(&definitions)
    }
    .map_err(|err| CliError::Output(err.to_string()))?;
    write_stdout_line(&rendered).map_err(|err| CliError::Output(err.to_string()))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Prints an error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
