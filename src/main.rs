//! Binary entry point for the goref CLI.
//!
//! ## Usage
//!
//! ```bash
//! # List every use of a symbol declared in a file
//! goref list-refs ./pkg/server.go Server.Start
//!
//! # Rename a symbol across the module
//! goref rename ./pkg/server.go Server.Start Launch
//!
//! # Serve both operations over MCP (stdio)
//! goref mcp
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use goref::cli::{render_error, run_list_refs, run_rename, OutputFormat};
use goref::error::{OutputErrorCode, RefactorError};
use goref::ops::RenameOptions;
use goref::rewrite::WriteMode;

// ============================================================================
// CLI Structure
// ============================================================================

/// Symbol reference listing and safe rename for Go modules.
#[derive(Parser, Debug)]
#[command(
    name = "goref",
    version,
    about = "List references to and safely rename Go symbols"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Output format for reports and errors.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all references to a symbol declared in FILE.
    ///
    /// Prints one `path:line:col` per reference, relative to the module root.
    ListRefs {
        /// File that declares the symbol.
        file: PathBuf,
        /// Symbol name, or `Type.Member` for fields and methods.
        symbol: String,
    },
    /// Rename a symbol declared in FILE and every reference to it.
    Rename {
        /// File that declares the symbol.
        file: PathBuf,
        /// Current name, or `Type.Member` for fields and methods.
        old_symbol: String,
        /// New name (a `Type.Member` form must name the same type).
        new_symbol: String,
        /// Write each file through a temp file in the same directory.
        #[arg(long)]
        atomic: bool,
    },
    /// Run the MCP server over stdio.
    Mcp {
        /// Version reported to MCP clients.
        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        server_version: String,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.global.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            // JSON errors share stdout with JSON reports; text diagnostics go to stderr
            match format {
                OutputFormat::Json => {
                    let _ = io::stdout().write_all(render_error(&err, format).as_bytes());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => {
                    let _ = io::stderr().write_all(render_error(&err, format).as_bytes());
                }
            }
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing. Logs always go to stderr.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), RefactorError> {
    let format = cli.global.format;
    match cli.command {
        Command::ListRefs { file, symbol } => {
            let output = run_list_refs(&file, &symbol, format)?;
            print_output(&output)
        }
        Command::Rename {
            file,
            old_symbol,
            new_symbol,
            atomic,
        } => {
            let options = RenameOptions {
                write_mode: if atomic {
                    WriteMode::Atomic
                } else {
                    WriteMode::InPlace
                },
            };
            let output = run_rename(&file, &old_symbol, &new_symbol, options, format)?;
            print_output(&output)
        }
        Command::Mcp { server_version } => execute_mcp(&server_version),
    }
}

fn print_output(output: &str) -> Result<(), RefactorError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| RefactorError::internal(format!("failed to write output: {}", e)))
}

#[cfg(feature = "mcp")]
fn execute_mcp(server_version: &str) -> Result<(), RefactorError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| RefactorError::internal(format!("failed to start async runtime: {}", e)))?;
    runtime.block_on(goref::mcp::run_mcp_server(server_version))?;
    info!("MCP server stopped");
    Ok(())
}

#[cfg(not(feature = "mcp"))]
fn execute_mcp(_server_version: &str) -> Result<(), RefactorError> {
    info!("MCP support not compiled in");
    Err(RefactorError::invalid_args(
        "MCP support not compiled in; rebuild with --features mcp",
    ))
}

// ============================================================================
// Tests
// ============================================================================
