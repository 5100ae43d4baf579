//! Partline BOM Report Service
//!
//! Expanded BOM reporting over a remote PLM part catalog: catalog session
//! login, basic leveled reports, and parent-annotated relations reports.

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod catalog;
mod flatten;
mod service;
mod session;
mod traversal;

use catalog::PlmCatalogClient;
use partline_models::{BomRelationsRequest, BomRequest, ReportRow};
use partline_utils::{init_logging, AppConfig, ErrorResponse, PartlineError};
use service::BomReportService;
use session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    service: BomReportService,
    sessions: SessionStore,
    config: AppConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Partline BOM Report Service");

    let state = AppState {
        service: BomReportService::new(),
        sessions: SessionStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = create_app(state, &config);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("BOM Report Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/sessions", post(login))
        .route("/api/v1/bom", post(expanded_bom))
        .route("/api/v1/bom/relations", post(relations_bom))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size)),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bom-report",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Establish a catalog session
#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    message: String,
    session_id: String,
    user_id: Option<String>,
    name: String,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let client = PlmCatalogClient::login(&state.config.catalog, &request.username, &request.password)
        .await
        .map_err(error_response)?;

    let user_id = client.user_id().map(str::to_string);
    let session_id = state
        .sessions
        .create(request.username.clone(), user_id.clone(), Arc::new(client))
        .await;
    info!(username = %request.username, "Catalog session established");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        session_id,
        user_id,
        name: request.username,
    }))
}

async fn expanded_bom(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BomRequest>,
) -> Result<Json<Vec<ReportRow>>, (StatusCode, Json<ErrorResponse>)> {
    let session = session::authorize(&state.sessions, &headers)
        .await
        .map_err(error_response)?;

    let rows = state
        .service
        .expanded_bom(session.catalog.as_ref(), &request)
        .await
        .map_err(error_response)?;

    Ok(Json(rows))
}

async fn relations_bom(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BomRelationsRequest>,
) -> Result<Json<Vec<ReportRow>>, (StatusCode, Json<ErrorResponse>)> {
    let session = session::authorize(&state.sessions, &headers)
        .await
        .map_err(error_response)?;

    let rows = state
        .service
        .relations_bom(session.catalog.as_ref(), &request)
        .await
        .map_err(error_response)?;

    Ok(Json(rows))
}

fn error_response(error: PartlineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = StatusCode::from_u16(error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(error)))
}
