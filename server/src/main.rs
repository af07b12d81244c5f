//! `pyps` binary — thin CLI shell over the [`pyps`] library crate.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Read-only PyPI Simple-API (PEP 503/691/700/658/714) index server.
#[derive(Parser)]
#[command(name = "pyps", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root of the archive tree (default: `.`, or `PYPS_FILES_DIR`)
    #[arg(long)]
    files_dir: Option<PathBuf>,

    /// Sidecar + store directory (default: `<files-dir>/.cache`, or `PYPS_CACHE_DIR`)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// URL prefix archives are exposed at (default: `/files`, or `PYPS_FILES_URL`)
    #[arg(long)]
    files_url: Option<String>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1
    #[arg(long)]
    bind_all: bool,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-shot scan and print the resulting store stats, without starting the server
    Scan,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pyps=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = pyps::config::resolve(
        cli.files_dir,
        cli.cache_dir,
        cli.files_url,
        cli.bind_all,
        cli.port,
    );

    let code = match cli.command {
        Some(Commands::Scan) => pyps::run_scan(&config),
        None => pyps::serve(config).await,
    };
    std::process::exit(code);
}
