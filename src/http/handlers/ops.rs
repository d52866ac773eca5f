use crate::repo::RecordStore;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

pub async fn readiness<P: RecordStore, T: RecordStore>(
    State(state): State<AppState<P, T>>,
) -> impl IntoResponse {
    let payments_ok = state.payments.store.ping().await.is_ok();
    let transfers_ok = state.transfers.store.ping().await.is_ok();

    let ok = payments_ok && transfers_ok;
    let status = if ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": ok,
            "payments_store": payments_ok,
            "transfers_store": transfers_ok
        })),
    )
        .into_response()
}

pub async fn liveness() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
