//! GraphVFS CLI - browse and watch OneDrive drives from the terminal
//!
//! Every path argument is an `onedrive://<drive-id>/<path>` URI; `graphvfs
//! drives` lists the drive ids available to the current token.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use graphvfs_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand,
    config::ConfigCommand,
    drives::DrivesCommand,
    fs::{CatCommand, CpCommand, LsCommand, MkdirCommand, MvCommand, PutCommand, RmCommand, StatCommand},
    token::TokenCommand,
    watch::WatchCommand,
    AppContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "graphvfs", version, about = "OneDrive drives as a virtual filesystem")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token to use instead of the configured token source
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the drives available to the current account
    Drives(DrivesCommand),
    /// List a directory
    Ls(LsCommand),
    /// Show metadata of a file or directory
    Stat(StatCommand),
    /// Print a file's content to stdout
    Cat(CatCommand),
    /// Upload a local file (or stdin) to a remote path
    Put(PutCommand),
    /// Create a directory
    Mkdir(MkdirCommand),
    /// Delete a file or directory
    Rm(RmCommand),
    /// Move or rename an item
    Mv(MvCommand),
    /// Copy an item
    Cp(CpCommand),
    /// Stream change events for a drive until interrupted
    Watch(WatchCommand),
    /// View and check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the access token stored in the system keyring
    #[command(subcommand)]
    Token(TokenCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = AppContext::load(cli.config.clone(), cli.token.clone())?;
    init_tracing(cli.verbose, &ctx.config.logging);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Drives(cmd) => cmd.execute(&ctx, format).await,
        Commands::Ls(cmd) => cmd.execute(&ctx, format).await,
        Commands::Stat(cmd) => cmd.execute(&ctx, format).await,
        Commands::Cat(cmd) => cmd.execute(&ctx, format).await,
        Commands::Put(cmd) => cmd.execute(&ctx, format).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx, format).await,
        Commands::Rm(cmd) => cmd.execute(&ctx, format).await,
        Commands::Mv(cmd) => cmd.execute(&ctx, format).await,
        Commands::Cp(cmd) => cmd.execute(&ctx, format).await,
        Commands::Watch(cmd) => cmd.execute(&ctx, format).await,
        Commands::Config(cmd) => cmd.execute(&ctx, format).await,
        Commands::Token(cmd) => cmd.execute(&ctx, format).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}

/// Installs the global subscriber; logs go to stderr so `cat` output stays clean
///
/// `RUST_LOG` wins over `-v`, which wins over the configured level.
fn init_tracing(verbose: u8, logging: &LoggingConfig) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
