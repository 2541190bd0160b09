use ferrous_doh_api::{create_doh_routes, AppState};
use ferrous_doh_infrastructure::dns::UpstreamLink;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn start_web_server(
    bind_addr: SocketAddr,
    state: AppState,
    link: Arc<UpstreamLink>,
) -> anyhow::Result<()> {
    let app = create_doh_routes(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!(
        "running stub server http://{} <--> {}://{}",
        bind_addr,
        link.protocol(),
        link.server()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("stopping stub server");
    link.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Received shutdown signal");
}
