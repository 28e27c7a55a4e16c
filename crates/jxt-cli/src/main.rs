//! jxt - fetch, cache and run jextract

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jxt_cli::cmd;
use jxt_cli::context::Context;
use jxt_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // -v wins over RUST_LOG; otherwise honour RUST_LOG and default to warnings
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::from_cli(&cli);

    match cli.command {
        Commands::Generate { libraries, jobs } => {
            cmd::generate::generate(&ctx, &cli.manifest, &libraries, jobs).await
        }
        Commands::DumpIncludes { library, output } => {
            cmd::dump_includes::dump_includes(&ctx, &cli.manifest, &library, output).await
        }
        Commands::Install {
            java_version,
            local,
        } => cmd::install::install(&ctx, &cli.manifest, java_version, local).await,
        Commands::Resolve { java_version } => {
            cmd::resolve::resolve(&ctx, &cli.manifest, java_version).await
        }
        Commands::Clean { java_version } => {
            cmd::clean::clean(&ctx, &cli.manifest, java_version).await
        }
    }
}
