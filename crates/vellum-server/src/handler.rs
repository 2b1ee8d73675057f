use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{self, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use vellum_index::{Entries, EntryQuery, Query};
use vellum_ledger::Content;
use vellum_sdk::Vellum;
use vellum_types::Ref;

use crate::error::{ServerError, ServerResult};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub vellum: Arc<Vellum>,
}

impl AppState {
    pub fn new(vellum: Vellum) -> Self {
        Self {
            vellum: Arc::new(vellum),
        }
    }
}

/// Run store work off the async runtime.
async fn blocking<T, F>(state: &AppState, f: F) -> ServerResult<T>
where
    F: FnOnce(&Vellum) -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let vellum = Arc::clone(&state.vellum);
    tokio::task::spawn_blocking(move || f(&vellum))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

fn parse_ref(s: &str) -> ServerResult<Ref> {
    Ref::parse(s).map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn head_blob(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ServerResult<StatusCode> {
    let id = parse_ref(&hash)?;
    if blocking(&state, move |v| Ok(v.store().exists(&id)?)).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ServerError::NotFound(hash))
    }
}

pub async fn get_blob(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = parse_ref(&hash)?;
    let bytes = blocking(&state, move |v| Ok(v.raw(&id)?)).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// Store bytes under a caller-chosen ref; refused unless they hash to it.
pub async fn put_blob(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    body: Bytes,
) -> ServerResult<StatusCode> {
    let id = parse_ref(&hash)?;
    blocking(&state, move |v| Ok(v.store().write_hash(&id, &body)?)).await?;
    debug!(blob = %hash, "stored blob");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_blob(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let id = blocking(&state, move |v| Ok(v.store().write(&body)?)).await?;
    debug!(blob = %id, "stored blob");
    Ok((StatusCode::CREATED, Json(json!({ "hash": id }))))
}

/// Page through the index's entry log.
pub async fn query_entries(
    State(state): State<AppState>,
    params: Result<extract::Query<EntryQuery>, QueryRejection>,
) -> ServerResult<Json<Entries>> {
    let extract::Query(query) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let entries = blocking(&state, move |v| Ok(v.query(&query)?)).await?;
    Ok(Json(entries))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl SearchParams {
    fn into_query(self) -> ServerResult<Query> {
        let mut query = Query::parse(&self.q).map_err(|e| ServerError::BadRequest(e.to_string()))?;
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(skip) = self.skip {
            query = query.skip(skip);
        }
        Ok(query)
    }
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<extract::Query<SearchParams>, QueryRejection>,
) -> ServerResult<Json<Value>> {
    let extract::Query(params) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let query = params.into_query()?;
    let refs = blocking(&state, move |v| Ok(v.index().search(&query)?)).await?;
    Ok(Json(json!({ "refs": refs })))
}

/// Latest indexed version of an id.
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Content>> {
    let content = blocking(&state, move |v| Ok(v.read(&id)?)).await?;
    Ok(Json(content))
}
