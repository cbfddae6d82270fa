//! Broker bootstrap: router, listener and graceful shutdown.

use std::{future::Future, io, net::SocketAddr, sync::Arc};

use agora_shared::stomp::HeartBeat;
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::infrastructure::repository::InMemorySessionRepository;

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Websocket upgrade path clients connect to.
pub const WS_PATH: &str = "/ws-chat";

fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(WS_PATH, get(websocket_handler))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the broker on an already bound listener until `shutdown` resolves.
///
/// `heart_beat` is the offer sent in CONNECTED; each connection beats at
/// the period agreed with its client.
pub async fn serve<F>(
    listener: TcpListener,
    heart_beat: HeartBeat,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let repository = Arc::new(InMemorySessionRepository::new());
    let state = Arc::new(AppState::new(repository).with_heart_beat(heart_beat));
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn run(addr: SocketAddr, heart_beat: HeartBeat) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "Broker listening on ws://{}{} (heart-beat {})",
        listener.local_addr()?,
        WS_PATH,
        heart_beat
    );

    serve(listener, heart_beat, shutdown_signal()).await?;

    tracing::info!("Broker stopped");
    Ok(())
}
