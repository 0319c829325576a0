//! HTTP front end for reverse-proxy subrequests.
//!
//! Every GET, whatever the path, is answered `200 OK` if the client may pass
//! and `403 FORBIDDEN` otherwise. The client is the first address in
//! `X-Forwarded-For`; the proxy in front is trusted to set it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use geowl::Gatekeeper;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Header carrying the client address
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build the router answering subrequests with `gate`
pub fn router(gate: Gatekeeper) -> Router {
    Router::new()
        .route("/", get(authorize))
        .route("/*path", get(authorize))
        .layer(TraceLayer::new_for_http())
        .with_state(gate)
}

/// The client address: first element of `X-Forwarded-For`, trimmed
pub fn client_address(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then_some(first)
}

async fn authorize(State(gate): State<Gatekeeper>, headers: HeaderMap) -> (StatusCode, &'static str) {
    let Some(addr) = client_address(&headers) else {
        warn!("BLOCK - request without {FORWARDED_FOR}");
        return forbidden();
    };

    if gate.decide(addr).await {
        (StatusCode::OK, "OK")
    } else {
        forbidden()
    }
}

const fn forbidden() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, "FORBIDDEN")
}

/// Serve subrequests on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    gate: Gatekeeper,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(gate))
        .with_graceful_shutdown(shutdown)
        .await
}
