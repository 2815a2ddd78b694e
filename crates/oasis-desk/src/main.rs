//! Operator entry point for the Oasis back-office.
//!
//! Loads `oasis-desk.yaml` (or defaults when the file is absent), applies
//! environment overrides, initialises logging on stderr, opens a session
//! against the hosted store (or an in-process one with `--memory`) and runs
//! one command.

mod cli;

use anyhow::Context;
use clap::Parser;
use oasis_core::{DeskConfig, Session};
use oasis_store::{MemoryStore, StoreBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        DeskConfig::from_file(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else {
        DeskConfig::parse("")?
    };

    init_logging(&config);
    info!(
        config = %cli.config.display(),
        memory = cli.memory,
        page_size = config.paging.page_size,
        "oasis-desk starting"
    );

    let session = if cli.memory {
        Session::new(
            StoreBackend::from(MemoryStore::new()),
            config.paging.page_size,
        )
    } else {
        Session::connect(&config).context("failed to configure remote store")?
    };
    info!(backend = session.store().name(), "session ready");

    cli::run(cli.command, &session).await
}

/// Structured logging to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(config: &DeskConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
