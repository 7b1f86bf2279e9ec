//! beakerctl — inspect and prune web sessions stored in a database table
//!
//! The session table is written by the application's session-store library;
//! this tool only reads or deletes rows. Settings come from the application's
//! paste-style deployment file, under a configurable key prefix.
//!
//! # Subcommands
//! - `show <config.ini>`    — print active sessions as a text table
//! - `cleanup <config.ini>` — delete sessions older than the timeout

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use beakerctl_core::{
    cleanup_sessions, create_pool, read_sessions, render_report, resolve_config, BeakerctlError,
    ResolvedConfig, DEFAULT_PREFIX,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "beakerctl",
    version,
    about = "Inspect and prune sessions stored by a web session library"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show sessions stored in the database
    Show {
        /// Deployment configuration file, e.g. project.ini
        config_file: String,

        /// Prefix for the session parameters in the config file
        #[arg(short, long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Show sessions newer than this, e.g. 20s, 1m, 4h, 1d.
        /// Defaults to <prefix>.timeout from the config file;
        /// 0 shows all sessions regardless of the config
        #[arg(short, long)]
        timeout: Option<String>,
    },

    /// Delete old sessions from the database
    Cleanup {
        /// Deployment configuration file, e.g. project.ini
        config_file: String,

        /// Prefix for the session parameters in the config file
        #[arg(short, long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Remove sessions older than this, e.g. 20s, 1m, 4h, 1d.
        /// Defaults to <prefix>.timeout from the config file
        #[arg(short, long)]
        timeout: Option<String>,
    },
}

// ============================================================================
// Command Handlers
// ============================================================================

/// Resolve the deployment config. A malformed `--timeout` is the one error
/// handled here: corrective hint on stderr, exit status 1. Everything else
/// propagates to the process boundary.
fn resolve(
    config_file: &str,
    prefix: &str,
    timeout: Option<&str>,
    accept_zero_timeout: bool,
) -> anyhow::Result<ResolvedConfig> {
    match resolve_config(config_file, prefix, timeout, accept_zero_timeout) {
        Ok(config) => Ok(config),
        Err(BeakerctlError::InvalidTimeout(_)) => {
            eprintln!("Timeout must be seconds, minutes, hours or days. E.g. 20s, 1m, 4h, 1d");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn do_show(config_file: &str, prefix: &str, timeout: Option<&str>) -> anyhow::Result<()> {
    let config = resolve(config_file, prefix, timeout, true)?;
    let pool = create_pool(&config.url).await?;
    let sessions = read_sessions(&pool, &config.table_name, config.timeout).await?;
    println!("{}", render_report(&sessions));
    Ok(())
}

async fn do_cleanup(config_file: &str, prefix: &str, timeout: Option<&str>) -> anyhow::Result<()> {
    let config = resolve(config_file, prefix, timeout, false)?;
    let Some(timeout) = config.timeout else {
        anyhow::bail!("cleanup requires a timeout");
    };
    let pool = create_pool(&config.url).await?;
    cleanup_sessions(&pool, &config.table_name, timeout).await?;
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present (dev convenience)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays clean
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Show {
            config_file,
            prefix,
            timeout,
        } => do_show(&config_file, &prefix, timeout.as_deref()).await,
        Commands::Cleanup {
            config_file,
            prefix,
            timeout,
        } => do_cleanup(&config_file, &prefix, timeout.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("beakerctl: {e:#}");
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
