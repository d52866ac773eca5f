use crate::domain::entity::Entity;
use crate::domain::error::ServiceError;
use crate::domain::page::PageRequest;
use crate::domain::record::{CreateRecordRequest, StatusView, UpdateStatusRequest};
use crate::http::middleware::basic_auth::{require_basic_auth, BasicCredentials};
use crate::repo::RecordStore;
use crate::service::record_service::RecordService;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::collections::HashMap;

/// Routes for one entity, relative to the API prefix.
pub fn routes<S: RecordStore>(service: RecordService<S>, credentials: BasicCredentials) -> Router {
    let name = <S::Entity as Entity>::NAME;
    let guarded_update =
        put(update_status::<S>).route_layer(from_fn_with_state(credentials, require_basic_auth));

    Router::new()
        .route(&format!("/{name}"), post(create_record::<S>))
        .route(
            &format!("/{name}/:id"),
            get(get_status::<S>)
                .delete(cancel_record::<S>)
                .merge(guarded_update),
        )
        .route(&format!("/user/:user_id/{name}"), get(list_by_owner_id::<S>))
        .route(&format!("/user/{name}"), get(list_by_owner_email::<S>))
        .with_state(service)
}

fn name_of<S: RecordStore>() -> &'static str {
    <S::Entity as Entity>::NAME
}

fn parse_id<S: RecordStore>(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>().map_err(|e| {
        ServiceError::validation(e.to_string(), format!("invalid {} id", name_of::<S>()))
    })
}

fn bad_body<S: RecordStore>(rejection: JsonRejection) -> ServiceError {
    ServiceError::validation(
        rejection.body_text(),
        format!("invalid request body, can't decode it to {}", name_of::<S>()),
    )
}

pub async fn create_record<S: RecordStore>(
    State(service): State<RecordService<S>>,
    body: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body::<S>(rejection).into_response(),
    };

    match service.create(req).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_status<S: RecordStore>(
    State(service): State<RecordService<S>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id::<S>(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match service.get_status(id).await {
        Ok(status) => (StatusCode::OK, Json(StatusView { status })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_status<S: RecordStore>(
    State(service): State<RecordService<S>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id::<S>(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body::<S>(rejection).into_response(),
    };

    match service.update_status(id, req.status).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn cancel_record<S: RecordStore>(
    State(service): State<RecordService<S>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id::<S>(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match service.cancel(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_by_owner_id<S: RecordStore>(
    State(service): State<RecordService<S>>,
    Path(user_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let owner_id = match user_id.parse::<i64>() {
        Ok(id) => id,
        Err(e) => {
            return ServiceError::validation(e.to_string(), "invalid user id").into_response()
        }
    };
    let page = page_from(&params);

    match service.list_by_owner_id(owner_id, page).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_by_owner_email<S: RecordStore>(
    State(service): State<RecordService<S>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let email = params.get("email").map(String::as_str).unwrap_or("");
    let page = page_from(&params);

    match service.list_by_owner_email(email, page).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn page_from(params: &HashMap<String, String>) -> PageRequest {
    PageRequest::from_query(
        params.get("cursor").map(String::as_str),
        params.get("limit").map(String::as_str),
    )
}
