//! HTTP API server implementation

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::AppConfig;
use crate::core::models::{Mode, TranslationRequest, TranslationResult};
use crate::core::translator::Translator;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    translator: Translator,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(translator: Translator, config: AppConfig) -> Self {
        Self {
            translator,
            config: Arc::new(config),
        }
    }
}

/// Root info response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InfoResponse {
    pub app: String,
    pub status: String,
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Capture route status response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RouteStatusResponse {
    pub status: String,
    pub message: String,
}

fn default_capture_source() -> String {
    "clipboard".to_string()
}

/// Captured text sent by the desktop client
#[derive(Debug, Deserialize, ToSchema)]
pub struct CaptureRequest {
    pub text: String,
    /// Where the text came from (clipboard, manual, ...)
    #[serde(default = "default_capture_source")]
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaptureResponse {
    pub success: bool,
    pub text: String,
    pub length: usize,
    pub message: Option<String>,
}

/// Translation request body.
///
/// Missing or empty languages fall back to the configured defaults.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub mode: Mode,
}

/// Translation response; failures are reported in-payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranslateResponse {
    pub success: bool,
    pub original_text: String,
    pub translated_text: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl From<TranslationResult> for TranslateResponse {
    fn from(result: TranslationResult) -> Self {
        Self {
            success: result.success,
            original_text: result.original_text,
            translated_text: result.translated_text,
            source_lang: result.source_lang,
            target_lang: result.target_lang,
            model: result.model,
            error: result.error,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Errors rendered as HTTP status codes
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Body missing, not JSON, or not matching the request schema
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse { detail: self.to_string() })).into_response()
    }
}

/// JSON body extractor whose rejections render as `{"detail": ...}`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// OpenAPI description of the HTTP surface
#[derive(OpenApi)]
#[openapi(
    info(title = "Tiny Translator", description = "Local translation and text processing API"),
    paths(root, health_check, capture_text, capture_test, translate_text),
    components(schemas(
        InfoResponse,
        HealthResponse,
        RouteStatusResponse,
        CaptureRequest,
        CaptureResponse,
        TranslateRequest,
        TranslateResponse,
        ErrorResponse,
        Mode
    )),
    tags((name = "capture"), (name = "translate"))
)]
pub struct ApiDoc;

/// Root endpoint
#[utoipa::path(get, path = "/", responses((status = 200, body = InfoResponse)))]
async fn root(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        app: state.config.app_name.clone(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check handler
#[utoipa::path(get, path = "/health", responses((status = 200, body = HealthResponse)))]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Echo captured text back after trimming
#[utoipa::path(
    post,
    path = "/api/capture",
    tag = "capture",
    request_body = CaptureRequest,
    responses(
        (status = 200, body = CaptureResponse),
        (status = 400, body = ErrorResponse, description = "Empty text"),
        (status = 422, body = ErrorResponse, description = "Invalid body")
    )
)]
async fn capture_text(ApiJson(payload): ApiJson<CaptureRequest>) -> Result<Json<CaptureResponse>, ApiError> {
    let text = payload.text.trim();

    if text.is_empty() {
        warn!("Rejected empty capture from {}", payload.source);
        return Err(ApiError::BadRequest("Empty text provided".to_string()));
    }

    let length = text.chars().count();
    info!("Captured text from {}: {} chars", payload.source, length);

    Ok(Json(CaptureResponse {
        success: true,
        text: text.to_string(),
        length,
        message: Some("Text captured successfully".to_string()),
    }))
}

/// Capture route liveness check
#[utoipa::path(get, path = "/api/capture/test", tag = "capture", responses((status = 200, body = RouteStatusResponse)))]
async fn capture_test() -> Json<RouteStatusResponse> {
    Json(RouteStatusResponse {
        status: "ok".to_string(),
        message: "Capture route is operational".to_string(),
    })
}

/// Translate text or explain a word
#[utoipa::path(
    post,
    path = "/api/translate",
    tag = "translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, body = TranslateResponse, description = "Success or in-payload failure"),
        (status = 422, body = ErrorResponse, description = "Invalid body"),
        (status = 500, body = ErrorResponse)
    )
)]
async fn translate_text(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let or_default = |lang: Option<String>, default: &str| {
        lang.map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let request = TranslationRequest {
        source_lang: or_default(payload.source_lang, &state.config.default_source_lang),
        target_lang: or_default(payload.target_lang, &state.config.default_target_lang),
        text: payload.text,
        mode: payload.mode,
    };

    info!(
        "Translation request ({}): {} -> {}, text length: {}",
        request.mode,
        request.source_lang,
        request.target_lang,
        request.text.chars().count()
    );

    match state.translator.translate(&request).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            error!("Error in translate_text: {}", e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/capture", post(capture_text))
        .route("/api/capture/test", get(capture_test))
        .route("/api/translate", post(translate_text))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Backend shutting down...");
}

/// Run the HTTP server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let translator = Translator::from_config(&config.provider)?;
    let addr = config.bind_addr();

    info!("{} backend starting...", config.app_name);
    info!("   Host: {}", config.host);
    info!("   Port: {}", config.port);
    info!("   Model: {}", translator.model());
    if !translator.is_configured() {
        warn!("   Provider not configured; /api/translate will report errors");
    }

    let app = router(AppState::new(translator, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, TranslationError};

    #[tokio::test]
    async fn test_capture_trims_and_counts_chars() {
        let payload = CaptureRequest {
            text: "  你好, world \n".to_string(),
            source: default_capture_source(),
        };

        let Json(response) = capture_text(ApiJson(payload)).await.unwrap();

        assert!(response.success);
        assert_eq!(response.text, "你好, world");
        assert_eq!(response.length, 9);
        assert_eq!(response.message.as_deref(), Some("Text captured successfully"));
    }

    #[tokio::test]
    async fn test_capture_rejects_blank() {
        let payload = CaptureRequest {
            text: " \t ".to_string(),
            source: "manual".to_string(),
        };

        let err = capture_text(ApiJson(payload)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_body_uses_detail_shape() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/capture")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"source": "manual"}"#))
            .unwrap();

        let err = ApiJson::<CaptureRequest>::from_request(request, &()).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().contains("missing field `text`"));
    }

    #[tokio::test]
    async fn test_translate_defaults_applied() {
        let state = Arc::new(AppState::new(Translator::new(None, "m"), AppConfig::default()));
        let payload: TranslateRequest = serde_json::from_str(r#"{"text": "Hello", "source_lang": ""}"#).unwrap();

        let Json(response) = translate_text(State(state), ApiJson(payload)).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.source_lang, "auto");
        assert_eq!(response.target_lang, "zh-CN");
        assert_eq!(response.original_text, "Hello");
        assert!(response.error.unwrap().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_response_keeps_null_fields() {
        let request = TranslationRequest::new("x", "en");
        let result = TranslationResult::failed(&request, &TranslationError::EmptyInput);
        assert_eq!(result.error_kind, Some(ErrorKind::EmptyInput));

        let json = serde_json::to_value(TranslateResponse::from(result)).unwrap();
        assert!(json["translated_text"].is_null());
        assert!(json["model"].is_null());
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/health", "/api/capture", "/api/capture/test", "/api/translate"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
