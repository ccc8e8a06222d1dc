//! signbridge entry point.
//!
//! Binary name: `signbridge`
//!
//! Loads configuration, initializes tracing, then either serves the REST API
//! or runs one of the small admin commands.

mod cli;
mod http;
mod state;

use clap::Parser;

use signbridge_infra::adobe::AdobeOAuthClient;
use signbridge_infra::auth::RequestSigner;
use signbridge_infra::config::load_config;
use signbridge_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions {
        default_filter: TracingOptions::filter_for_verbosity(cli.verbose).to_string(),
        json: cli.json_logs,
        enable_otel: cli.otel,
    };
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = AppState::init(&config).await?;
            if !state.tokens.is_authorized().await {
                tracing::warn!(
                    "no provider token stored; visit /admin/login to authorize the bridge"
                );
            }

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, public_url = %config.server.public_url, "signbridge listening");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("server stopped");
        }

        Commands::Sign => {
            let signer = RequestSigner::new(
                &config.security.signature_secret,
                config.security.signature_max_age_secs,
            );
            let issued = signer.issue(chrono::Utc::now());
            println!("{}", serde_json::to_string_pretty(&issued)?);
        }

        Commands::AuthorizeUrl => {
            let oauth = AdobeOAuthClient::new(signbridge_infra::http_client(), &config);
            println!("{}", oauth.authorize_url()?);
        }
    }

    shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
