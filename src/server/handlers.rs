use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::EnvRequestContext;
use crate::environment;
use crate::location::{PostalRecord, ResolvedGeo};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/geo ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeoQuery {
    pub ip: Option<String>,
}

pub async fn geo(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeoQuery>,
) -> Result<Json<ResolvedGeo>, Response> {
    let ip = params.ip.as_deref().unwrap_or("").trim();
    if ip.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'ip' parameter").into_response());
    }

    // Provider calls are blocking; serialize them behind the lock the
    // same way the CLI path does.
    let resolved = {
        let resolver = state.resolver.lock().unwrap();
        resolver.resolve_with_source(Some(ip))
    };

    Ok(Json(resolved))
}

// ─── GET /api/postal ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PostalQuery {
    pub zip: Option<String>,
}

pub async fn postal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostalQuery>,
) -> Result<Json<PostalRecord>, Response> {
    let zip = params.zip.as_deref().unwrap_or("").trim();
    if zip.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'zip' parameter").into_response());
    }

    Ok(Json(state.postal.resolve_us(zip)))
}

// ─── GET /api/env ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EnvResponse {
    pub cli: bool,
    pub localhost: bool,
    pub development: bool,
}

pub async fn env() -> Json<EnvResponse> {
    let ctx = EnvRequestContext;
    Json(EnvResponse {
        cli: environment::is_cli(&ctx),
        localhost: environment::is_localhost(&ctx),
        development: environment::is_development(&ctx),
    })
}
