use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gl_gateway::bootstrap;
use gl_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match args.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let config = Arc::new(cli::load_config(&args.config)?);
            serve(config).await
        }
        Some(Command::Config(cli::ConfigCommand::Validate)) => {
            let config = cli::load_config(&args.config)?;
            if !cli::validate(&config, &args.config) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(cli::ConfigCommand::Show)) => {
            let config = cli::load_config(&args.config)?;
            cli::show(&config);
            Ok(())
        }
    }
}

async fn serve(config: Arc<gl_domain::config::Config>) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config.clone())?;
    let app = gl_gateway::api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "groundline listening");

    axum::serve(listener, app).await.context("serving HTTP")
}
