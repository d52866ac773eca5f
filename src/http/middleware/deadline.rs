use crate::http::error::error_response;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Duration;

/// Drops the handler future when the deadline fires. Any unit of work it
/// held is rolled back on drop.
pub async fn enforce(
    State(timeout): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(resp) => resp,
        Err(_) => {
            tracing::warn!("request to {} exceeded {:?} deadline", path, timeout);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("request exceeded {}ms deadline", timeout.as_millis()),
                "request timed out",
            )
        }
    }
}
