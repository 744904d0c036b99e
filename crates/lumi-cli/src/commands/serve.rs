//! Serve command implementation.

use std::sync::Arc;

use anyhow::Result;
use lumi_core::channel::{BroadcastEndpoint, DeferredEventChannel};
use lumi_core::pickers::TerminalPickers;
use lumi_core::web::{AppState, WebServer, WebServerConfig};

use super::ServeArgs;

/// Run the serve command.
///
/// File dialogs requested by the UI are answered on this terminal.
pub async fn run(args: ServeArgs) -> Result<()> {
    let global_config = super::load_config();

    let mut config = WebServerConfig::from(&global_config.web);
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.public {
        config.localhost_only = false;
    }

    let endpoint = Arc::new(BroadcastEndpoint::default());
    let events = DeferredEventChannel::with_endpoint(endpoint.clone());
    let controller = super::controller_builder(&global_config, Arc::new(TerminalPickers::stdin()))
        .with_events(events)
        .build();

    println!();
    println!("Lumi Bridge");
    println!("{}", "─".repeat(40));
    println!();
    println!("  http://{}", config.bind_addr());
    println!("  content: {}", global_config.paths.content_dir.display());
    println!();
    println!("Press Ctrl+C to stop the server.");

    let server = WebServer::new(config, AppState::new(Arc::new(controller), endpoint));
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    println!();
    println!("Server stopped.");

    Ok(())
}
