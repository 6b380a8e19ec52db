//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;

/// Header the echo upstream uses to report the method it saw.
pub const ECHO_METHOD: &str = "x-echo-method";

/// Header the echo upstream uses to report the path and query it saw.
pub const ECHO_URI: &str = "x-echo-uri";

/// Header the echo upstream uses to report the `x-mode` header it saw.
pub const ECHO_MODE: &str = "x-echo-mode";

/// Echo handler: returns the received body verbatim and reports the method
/// and URI in response headers.
pub async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let mode = headers
        .get("x-mode")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (
        StatusCode::OK,
        [
            (ECHO_METHOD, method.to_string()),
            (ECHO_URI, path_and_query),
            (ECHO_MODE, mode),
        ],
        body,
    )
}

/// Router that echoes every request.
pub fn echo_router() -> Router {
    Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
}

/// Start the echo upstream on an ephemeral port.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, echo_router()).await;
    });

    addr
}
