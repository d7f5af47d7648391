#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use signal_relay_server::config;
use signal_relay_server::logging;
use signal_relay_server::server::{ServerConfig, ServerEvent, SignalServer};
use signal_relay_server::websocket;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;

/// Signal relay -- authenticated WebSocket signaling for P2P encrypted channels
#[derive(Parser, Debug)]
#[command(name = "signal-relay-server")]
#[command(about = "An authenticated, in-memory WebSocket signaling relay")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // load() never validates; this is the one validation pass, shared by
    // --validate-config and normal startup.
    let validation_result = config::validate(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!(
                    "  Expiry window: {}s",
                    cfg.security.expiry_window_secs
                );
                println!("  Max message size: {}", cfg.security.max_message_size);
                println!("  CORS origins: {}", cfg.security.cors_origins);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "Starting signal relay server");

    let server_config = ServerConfig {
        expiry_window: Duration::from_secs(cfg.security.expiry_window_secs),
        max_message_size: cfg.security.max_message_size,
        outbound_queue_size: cfg.server.outbound_queue_size,
        event_buffer_size: cfg.server.event_buffer_size,
    };
    let server = SignalServer::new(server_config);

    // Surface lifecycle events for presence diagnostics.
    let mut events = server.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ServerEvent::PeerAdded(peer_id)) => {
                    tracing::debug!(%peer_id, "peer-added");
                }
                Ok(ServerEvent::PeerRemoved(peer_id)) => {
                    tracing::debug!(%peer_id, "peer-removed");
                }
                Ok(ServerEvent::ConnectionError { peer_id, message }) => {
                    tracing::debug!(%peer_id, %message, "connection-error");
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let app = websocket::create_router(&cfg.security.cors_origins).with_state(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.security.cors_origins,
        "Server started - WebSocket endpoint: /ws"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn cli_default_no_flags() {
        let cli = Cli::try_parse_from(["signal-relay-server"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn cli_validate_config_short_and_long() {
        for flag in ["--validate-config", "-c"] {
            let cli = Cli::try_parse_from(["signal-relay-server", flag]).unwrap();
            assert!(cli.validate_config);
            assert!(!cli.print_config);
        }
    }

    #[test]
    fn cli_validate_and_print_config_conflict() {
        let result =
            Cli::try_parse_from(["signal-relay-server", "--validate-config", "--print-config"]);
        assert!(result.is_err());
    }
}
