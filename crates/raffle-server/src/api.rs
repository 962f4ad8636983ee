//! HTTP API route handlers for the raffle board.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use raffle::error::RaffleError;
use raffle::export::ReportKind;
use raffle::service::RaffleService;
use raffle::types::{SlotId, SlotState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::page::{render, PageContext};

/// Name of the admin session cookie.
pub const ADMIN_COOKIE: &str = "raffle_admin";

const NAME_REQUIRED_MSG: &str = "Escribí tu nombre para poder elegir.";
const INTERNAL_ERROR_MSG: &str = "Error interno";

/// Shared application state.
pub struct AppState {
    /// Board operations.
    pub service: Arc<RaffleService>,
    /// Registry backing the `/metrics` endpoint.
    pub registry: Registry,
}

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
}

/// Query parameters of the board page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// View key unlocking the admin panel for this request.
    pub admin: Option<String>,
    /// `noname` shows the name-required notice.
    pub err: Option<String>,
}

/// Form body of a claim.
#[derive(Debug, Default, Deserialize)]
pub struct PickForm {
    pub name: Option<String>,
}

/// Form body or query carrying an admin credential.
#[derive(Debug, Default, Deserialize)]
pub struct KeyParams {
    pub key: Option<String>,
}

/// Create the HTTP router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Board
        .route("/", get(index))
        .route("/pick/:num", post(pick))
        .route("/api/state", get(api_state))
        // Administration
        .route("/release/:num", post(release))
        .route("/reset", post(reset))
        .route("/export.xlsx", get(export_full))
        .route("/export-occupied.xlsx", get(export_occupied))
        .route("/export-ocupados.xlsx", get(export_occupied))
        .route("/admin-login", get(admin_login))
        .route("/admin-logout", get(admin_logout))
        // Operations
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Extract a cookie value from the request headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Render the board page.
async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let slots = state.service.list_state().await?;
    let show_admin = state.service.shows_admin_panel(
        query.admin.as_deref(),
        cookie_value(&headers, ADMIN_COOKIE),
    );
    let error_msg = (query.err.as_deref() == Some("noname")).then_some(NAME_REQUIRED_MSG);

    Ok(Html(render(&PageContext {
        config: state.service.config(),
        slots: &slots,
        show_admin,
        error_msg,
    })))
}

/// Claim a slot.
///
/// Script callers (`X-Requested-With: XMLHttpRequest`) get a short status
/// code in the body; plain form posts are redirected back to the board.
async fn pick(
    State(state): State<Arc<AppState>>,
    Path(num): Path<String>,
    headers: HeaderMap,
    Form(form): Form<PickForm>,
) -> Response {
    let xhr = is_xhr(&headers);
    let reply = |status: StatusCode, code: &'static str, redirect: &'static str| {
        if xhr {
            (status, code).into_response()
        } else {
            Redirect::to(redirect).into_response()
        }
    };

    if num.parse::<SlotId>().is_err() {
        return reply(StatusCode::BAD_REQUEST, "NUMERO_INVALIDO", "/");
    }

    let name = form.name.unwrap_or_default();
    match state.service.claim(&num, &name).await {
        Ok(_) => reply(StatusCode::OK, "OK", "/"),
        Err(RaffleError::Validation { .. }) => {
            reply(StatusCode::BAD_REQUEST, "NOMBRE_REQUERIDO", "/?err=noname")
        }
        Err(RaffleError::SlotTaken { .. }) => reply(StatusCode::CONFLICT, "OCUPADO", "/"),
        Err(e) => {
            tracing::error!(slot = %num, error = %e, "claim failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, "ERROR_DB", "/")
        }
    }
}

/// Current board state for polling.
async fn api_state(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SlotState>>, AppError> {
    Ok(Json(state.service.list_state().await?))
}

/// Free one slot.
async fn release(
    State(state): State<Arc<AppState>>,
    Path(num): Path<String>,
    Form(form): Form<KeyParams>,
) -> Result<Redirect, AppError> {
    match state
        .service
        .release(&num, form.key.as_deref().unwrap_or_default())
        .await
    {
        Ok(()) | Err(RaffleError::Validation { .. }) => Ok(Redirect::to("/")),
        Err(e) => Err(e.into()),
    }
}

/// Free every slot.
async fn reset(
    State(state): State<Arc<AppState>>,
    Form(form): Form<KeyParams>,
) -> Result<Redirect, AppError> {
    state
        .service
        .reset(form.key.as_deref().unwrap_or_default())
        .await?;
    Ok(Redirect::to("/"))
}

async fn export(
    state: &AppState,
    kind: ReportKind,
    query: &KeyParams,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let file = state
        .service
        .export(
            kind,
            query.key.as_deref(),
            cookie_value(headers, ADMIN_COOKIE),
        )
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

/// Download every slot as a spreadsheet.
async fn export_full(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    export(&state, ReportKind::Full, &query, &headers).await
}

/// Download taken slots and the collected total as a spreadsheet.
async fn export_occupied(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    export(&state, ReportKind::Occupied, &query, &headers).await
}

/// Open an admin session when the view key matches. Always redirects home.
async fn admin_login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyParams>,
) -> Response {
    let key = query.key.as_deref().unwrap_or_default();
    match state.service.login(key) {
        Some(token) => {
            let max_age = state.service.config().admin_session_max_age.as_secs();
            let cookie = format!(
                "{ADMIN_COOKIE}={token}; Max-Age={max_age}; Path=/; HttpOnly; Secure; SameSite=Lax"
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}

/// Drop the admin session cookie.
async fn admin_logout() -> impl IntoResponse {
    let cookie = format!("{ADMIN_COOKIE}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/"))
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus text exposition.
async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&state.registry.gather(), &mut buf)
        .map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("metrics encoding failed"))
        })?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buf).into_response())
}

/// Application error type.
///
/// Clients only see a generic status line; details go to the log.
#[derive(Debug)]
pub enum AppError {
    /// A board operation failed.
    Raffle(RaffleError),
    /// Server-side failure unrelated to the board.
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Raffle(err) => match err {
                RaffleError::Validation { .. } => (StatusCode::BAD_REQUEST, "Solicitud inválida"),
                RaffleError::Unauthorized => (StatusCode::UNAUTHORIZED, "No autorizado"),
                RaffleError::SlotTaken { .. } => (StatusCode::CONFLICT, "OCUPADO"),
                RaffleError::Storage { .. } => {
                    tracing::error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "ERROR_DB")
                }
                RaffleError::Export { .. } | RaffleError::InvalidConfig { .. } => {
                    tracing::error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG)
                }
            },
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG)
            }
        };
        (status, body).into_response()
    }
}

impl From<RaffleError> for AppError {
    fn from(err: RaffleError) -> Self {
        Self::Raffle(err)
    }
}
