use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use medtour_api::{ApiError, ApiResult};
use medtour_core::{Kpi, Record, Repository, SearchResults, kpi, search_all, time::today_utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "MedTour Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub async fn readyz(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.storage.ping().await.map_err(|e| {
        tracing::warn!(
            backend = state.storage.backend_name(),
            error = %e,
            "readiness check failed"
        );
        ApiError::service_unavailable(format!("Storage is not ready: {e}"))
    })?;
    Ok((StatusCode::OK, Json(json!({"status": "ready"}))))
}

/// Unwraps a JSON body, reporting malformed input with the usual error body.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::payload_too_large(rejection.body_text()))
        }
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

fn query_params(query: Result<Query<ListQuery>, QueryRejection>) -> ApiResult<ListQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn path_id(path: Result<Path<String>, PathRejection>) -> ApiResult<String> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}

pub async fn list_records<T: Record>(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<T>>> {
    let query = query_params(query)?;
    // Collections without search fields ignore `q`
    let q = if T::SEARCH_FIELDS.is_empty() {
        None
    } else {
        query.q.as_deref()
    };
    let records = Repository::<T>::new(state.storage.clone()).list(q).await?;
    Ok(Json(records))
}

pub async fn get_record<T: Record>(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<T>> {
    let id = path_id(id)?;
    let record = Repository::<T>::new(state.storage.clone()).get(&id).await?;
    Ok(Json(record))
}

pub async fn create_record<T: Record>(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let body = json_body(payload)?;
    let record = Repository::<T>::new(state.storage.clone())
        .create_from_value(body)
        .await?;
    tracing::info!(entity = T::ENTITY, id = record.id(), "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record<T: Record>(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<T>> {
    let id = path_id(id)?;
    let patch = json_body(payload)?;
    let record = Repository::<T>::new(state.storage.clone())
        .update(&id, patch)
        .await?;
    Ok(Json(record))
}

pub async fn delete_record<T: Record>(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path_id(id)?;
    Repository::<T>::new(state.storage.clone()).delete(&id).await?;
    tracing::info!(entity = T::ENTITY, %id, "record deleted");
    Ok(Json(MessageResponse {
        message: format!("{} deleted successfully", T::ENTITY),
    }))
}

/// `POST /users`: the password is hashed before storage.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<medtour_core::models::User>)> {
    let body = json_body(payload)?;
    let user = state.users.create_from_value(body).await?;
    tracing::info!(id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_kpi(State(state): State<AppState>) -> ApiResult<Json<Kpi>> {
    let kpi = kpi::compute(&state.storage, today_utc()).await?;
    Ok(Json(kpi))
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<SearchResults>> {
    let query = query_params(query)?;
    let results = search_all(&state.storage, query.q.as_deref().unwrap_or_default()).await?;
    Ok(Json(results))
}
