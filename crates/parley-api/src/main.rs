//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, then either starts the REST
//! API server or runs a user-management command.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;

use parley_infra::config::{load_config, resolve_data_dir};
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use parley_types::config::AppConfig;

use cli::{Cli, Commands, UserCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let enable_otel = std::env::var("PARLEY_OTEL").is_ok_and(|v| v == "1");
    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir();
    let config = load_config(&data_dir).await;

    let result = run(cli.command, config, data_dir).await;
    shutdown_tracing();
    result
}

async fn run(command: Commands, config: AppConfig, data_dir: PathBuf) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::init(config, &data_dir).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(
                addr = %addr,
                model = %state.chat_service.model().model(),
                data_dir = %data_dir.display(),
                "Parley API listening"
            );

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server stopped");
        }

        Commands::User { command } => {
            let db_pool = state::open_database(&config, &data_dir).await?;
            let tokens = state::token_keys(&config)?;
            let repo = SqliteUserRepository::new(db_pool);

            match command {
                UserCommand::Create { name, email } => {
                    let (user, token) = cli::user::create_user(&repo, &tokens, &name, &email).await?;
                    cli::user::print_credentials(&user, &token);
                }
                UserCommand::Token { user_id } => {
                    let token = cli::user::issue_token(&repo, &tokens, &user_id).await?;
                    println!("{token}");
                }
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
