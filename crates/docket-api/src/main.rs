//! docket-api - HTTP API server for docket

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use docket_core::{
    CaseRepository, ClientRepository, DocumentRepository, ExtractionBackend, GenerationBackend,
    IngestBackend, StrategyRepository,
};
use docket_db::{
    Database, PgCaseRepository, PgClientRepository, PgDocumentRepository, PgStrategyRepository,
};
use docket_inference::{Extractor, OpenAIBackend};
use docket_ingest::IngestClient;
use docket_workflow::{DocumentPipeline, IntakeService, StrategyService};

use handlers::{cases, clients, documents, notes, strategies};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Shared state handed to every handler.
#[derive(Clone)]
pub(crate) struct AppState {
    pub db: Arc<Database>,
    pub intake: Arc<IntakeService>,
    pub documents: Arc<DocumentPipeline>,
    pub strategy: Arc<StrategyService>,
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub(crate) enum ApiError {
    Internal(docket_core::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<docket_core::Error> for ApiError {
    fn from(err: docket_core::Error) -> Self {
        match &err {
            docket_core::Error::NotFound(_)
            | docket_core::Error::CaseNotFound(_)
            | docket_core::Error::DocumentNotFound(_) => ApiError::NotFound(err.to_string()),
            docket_core::Error::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            docket_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    let friendly_msg = if msg.contains("case_strategy") {
                        "A strategy version with this number already exists for the case; retry"
                            .to_string()
                    } else if msg.contains("case_number") {
                        "The case number was allocated concurrently; retry".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Internal(err)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parse CORS_ALLOWED_ORIGINS (comma-separated) into header values.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let raw = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "docket-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "docket_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docket_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("docket-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/docket".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Connect to database
    info!("Connecting to database...");
    let db = Arc::new(Database::connect(&database_url).await?);
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // External backends
    let ingest_client = IngestClient::from_env()?;
    info!("Ingestion backend: {}", ingest_client.base_url());
    let ingest: Arc<dyn IngestBackend> = Arc::new(ingest_client);

    let generation: Arc<dyn GenerationBackend> = Arc::new(OpenAIBackend::from_env()?);
    info!("Generation backend model: {}", generation.model_name());
    let extraction: Arc<dyn ExtractionBackend> = Arc::new(Extractor::new(generation.clone()));

    // Repositories behind the trait seams used by the workflow services
    let pool = db.pool.clone();
    let cases: Arc<dyn CaseRepository> = Arc::new(PgCaseRepository::new(pool.clone()));
    let clients: Arc<dyn ClientRepository> = Arc::new(PgClientRepository::new(pool.clone()));
    let document_repo: Arc<dyn DocumentRepository> = Arc::new(PgDocumentRepository::new(pool.clone()));
    let strategies: Arc<dyn StrategyRepository> = Arc::new(PgStrategyRepository::new(pool.clone()));

    let state = AppState {
        db,
        intake: Arc::new(IntakeService::new(cases.clone())),
        documents: Arc::new(DocumentPipeline::new(
            cases.clone(),
            document_repo.clone(),
            ingest.clone(),
            extraction,
        )),
        strategy: Arc::new(StrategyService::new(
            cases,
            clients,
            document_repo,
            strategies,
            ingest,
            generation,
        )),
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health))
        // Cases
        .route(
            "/api/v1/cases",
            post(cases::create_case).get(cases::list_cases),
        )
        .route("/api/v1/cases/:id", get(cases::get_case))
        // Documents
        .route(
            "/api/v1/cases/:id/documents",
            post(documents::upload_documents).get(documents::list_documents),
        )
        .route(
            "/api/v1/cases/:id/documents/urls",
            post(documents::add_url_documents),
        )
        .route("/api/v1/documents/:id", get(documents::get_document))
        // Notes
        .route(
            "/api/v1/cases/:id/notes",
            post(notes::create_note).get(notes::list_notes),
        )
        .route(
            "/api/v1/notes/:id",
            axum::routing::patch(notes::update_note).delete(notes::delete_note),
        )
        // Clients
        .route(
            "/api/v1/clients/:id",
            get(clients::get_client).put(clients::update_client),
        )
        // Strategy
        .route(
            "/api/v1/cases/:id/strategy",
            get(strategies::current_strategy)
                .post(strategies::generate_strategy)
                .put(strategies::edit_strategy),
        )
        .route(
            "/api/v1/cases/:id/strategy/versions",
            get(strategies::list_versions),
        )
        .route(
            "/api/v1/cases/:id/strategy/versions/:version",
            get(strategies::get_version),
        )
        .route(
            "/api/v1/cases/:id/strategy/diff",
            get(strategies::diff_versions),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // Allow up to 100MB uploads (multi-file document batches)
        .layer(RequestBodyLimitLayer::new(100 * 1024 * 1024))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
