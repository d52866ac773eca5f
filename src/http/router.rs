use crate::http::handlers::{ops, records};
use crate::http::middleware::{cors, deadline, request_id};
use crate::repo::RecordStore;
use crate::AppState;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;

pub fn build_router<P: RecordStore, T: RecordStore>(state: AppState<P, T>) -> Router {
    let api = records::routes(state.payments.clone(), state.update_credentials.clone())
        .merge(records::routes(
            state.transfers.clone(),
            state.update_credentials.clone(),
        ));

    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/readiness", get(ops::readiness::<P, T>))
        .route("/ops/liveness", get(ops::liveness))
        .with_state(state)
        .nest("/api/v1", api)
        .layer(from_fn_with_state(request_timeout, deadline::enforce))
        .layer(from_fn(cors::cors))
        .layer(from_fn(request_id::request_id))
}
