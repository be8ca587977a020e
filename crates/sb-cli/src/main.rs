use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod report;

#[derive(Parser)]
#[command(name = "statusbridge")]
#[command(about = "Publish Jenkins build results as GitHub commit statuses", long_about = None)]
struct Cli {
    /// Debug-level logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass over the Jenkins jobs
    Sync(SyncArgs),

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> local...)
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

#[derive(Args)]
pub struct SyncArgs {
    /// GitHub API token (falls back to the env var named by github.token_env)
    #[arg(short = 't', long = "token")]
    pub token: Option<String>,

    /// Jenkins username (falls back to jenkins.user_env)
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Jenkins password (falls back to jenkins.password_env)
    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,

    /// Layered config paths in merge order
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// Override jenkins.job_prefix
    #[arg(long)]
    pub job_prefix: Option<String>,

    /// Read Jenkins, but keep the cache in memory and write nothing to GitHub
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Exit with status 2 when any publish failed
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Plain console output
    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

fn main() -> ExitCode {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.cmd {
        Commands::Sync(args) => commands::sync::run(args),
        Commands::ConfigHash { config_paths } => {
            let loaded = commands::load_config(&config_paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr; stdout carries the per-build report.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
