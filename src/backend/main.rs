/**
 * Kontexted Collab Server Entry Point
 *
 * Serves the web tier routes and the collaboration service from one
 * process.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use kontexted_collab::backend::server::{create_app, load_config};

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = load_config().map_err(|e| {
        tracing::error!("[Server] Invalid configuration: {}", e);
        e
    })?;
    let port = config.port;

    // Fails here when production has no signing secret
    let (app, app_state) = create_app(config).map_err(|e| {
        tracing::error!("[Server] Startup failed: {}", e);
        e
    })?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Server] Listening on {}", addr);

    let shutdown = app_state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[Server] Failed to listen for shutdown signal: {:?}", e);
                std::future::pending::<()>().await;
            }
            shutdown.trigger();
        })
        .await?;

    tracing::info!("[Server] Stopped");
    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin kontexted-collab --features ssr");
    std::process::exit(1);
}
