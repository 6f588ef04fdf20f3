//! newsbot CLI and REST API entry point.
//!
//! Parses CLI arguments, initializes tracing, builds the chat pipeline and
//! history store, then dispatches to a command or starts the REST server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};
use newsbot_observe::tracing_setup::{init_tracing, shutdown_tracing, LogFormat};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,newsbot=debug",
        _ => "trace",
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format, filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "newsbot", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.clone()).await?;

    let result = run(&cli, &state).await;

    state.shutdown().await;
    shutdown_tracing();
    result
}

async fn run(cli: &Cli, state: &AppState) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Serve { port, host } => {
            let host = host.clone().unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state.clone(), &host, port, cli.quiet).await?;
        }

        Commands::Ask { session, message } => {
            cli::chat::ask(state, session.clone(), message, cli.json, cli.quiet).await?;
        }

        Commands::History { session_id } => {
            cli::chat::show_history(state, session_id, cli.json).await?;
        }

        Commands::Sessions => {
            cli::chat::list_sessions(state, cli.json).await?;
        }

        Commands::Clear { session_id } => {
            cli::chat::clear(state, session_id, cli.json).await?;
        }

        // Handled before state init
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Bind, serve until a shutdown signal, then stop the expiry sweeper.
async fn serve(state: AppState, host: &str, port: u16, quiet: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let sweeper = state.spawn_sweeper(cancel.clone());

    let router = http::router::build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!();
        println!(
            "  {} newsbot listening on {}",
            console::style("▶").green().bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!(
            "  {} Chat endpoint: {}",
            console::style("i").blue().bold(),
            console::style(format!("http://{addr}/api/chat")).dim()
        );
        println!();
    }
    tracing::info!(%addr, "server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "expiry sweeper task failed");
    }

    if !quiet {
        println!("\n  Server stopped.");
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
