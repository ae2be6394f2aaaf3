//! # API REST
//!
//! REST API implementation for the healthcare assistant.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Uses `api-shared` for request/response types.

#![warn(rust_2018_idioms)]

pub mod config;
mod handlers;

pub use config::ServerConfig;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use hca_core::PatientService;
use hca_summarizer::Summarizer;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
///
/// Either dependency may be missing: the store can be unreachable at startup and the model
/// endpoint is optional. Handlers answer 503 for whatever is absent.
#[derive(Clone, Default)]
pub struct AppState {
    patients: Option<Arc<PatientService>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl AppState {
    pub fn new(
        patients: Option<PatientService>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        Self {
            patients: patients.map(Arc::new),
            summarizer,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::health,
        handlers::list_patients,
        handlers::get_patient,
        handlers::explain_note,
        handlers::summarize_note,
    ),
    components(schemas(
        api_shared::MessageRes,
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::PatientRes,
        api_shared::MedicalNoteReq,
        api_shared::ExplainNoteRes,
        api_shared::SummarizeNoteRes,
    ))
)]
pub struct ApiDoc;

/// CORS policy: listed origins only, credentials allowed, methods and headers mirrored.
pub fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/patients", get(handlers::list_patients))
        .route("/patients/:id", get(handlers::get_patient))
        .route("/explain_note", post(handlers::explain_note))
        .route("/summarize_note", post(handlers::summarize_note))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(config.cors_origins()))
        .with_state(state)
}

/// Bind `config.addr()` and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(state, config);
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("++ Serving REST API on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use hca_core::{CoreConfig, DocumentStore, PatientRecord, PatientSink};
    use hca_summarizer::{SummarizerError, SummaryRequest};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct FixedSummarizer;

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
            Ok(format!("{:?} of {} chars", request.task, request.text.len()))
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _request: &SummaryRequest) -> Result<String, SummarizerError> {
            Err(SummarizerError::Parse("out of memory".into()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct UnreachableSummarizer;

    #[async_trait]
    impl Summarizer for UnreachableSummarizer {
        async fn summarize(&self, _request: &SummaryRequest) -> Result<String, SummarizerError> {
            Err(SummarizerError::Unavailable("llama3.2: connection refused".into()))
        }
        fn name(&self) -> &str {
            "unreachable"
        }
    }

    fn seeded_patients(temp_dir: &TempDir) -> PatientService {
        let cfg = CoreConfig::from_values(
            Some(temp_dir.path().to_string_lossy().into_owned()),
            None,
            None,
            None,
        )
        .expect("valid config");
        let store = DocumentStore::connect(&cfg).expect("connect");
        let mut collection = store.collection(cfg.collection()).expect("collection");
        collection
            .insert_many(&[PatientRecord {
                id: "p1".into(),
                name: "Jane Doe".into(),
                gender: "female".into(),
                birth_date: "1980-01-01".into(),
                conditions: vec!["Hypertension".into()],
                ..PatientRecord::default()
            }])
            .expect("seed");
        store.close();
        PatientService::new(collection)
    }

    fn app(state: AppState) -> Router {
        router(state, &ServerConfig::default())
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = send(app(AppState::default()), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], api_shared::ROOT_MESSAGE);

        let (status, body) = send(app(AppState::default()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_list_patients_returns_stored_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = AppState::new(Some(seeded_patients(&temp_dir)), None);

        let (status, body) = send(app(state), Method::GET, "/patients", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "_id": "p1",
                "name": "Jane Doe",
                "gender": "female",
                "birthDate": "1980-01-01",
                "conditions": ["Hypertension"],
                "medications": [],
                "reports_text": []
            }])
        );
    }

    #[tokio::test]
    async fn test_get_patient_found_and_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = AppState::new(Some(seeded_patients(&temp_dir)), None);

        let (status, body) = send(app(state.clone()), Method::GET, "/patients/p1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Jane Doe");

        let (status, body) = send(app(state), Method::GET, "/patients/p9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Patient not found: p9");
    }

    #[tokio::test]
    async fn test_patients_without_store_is_unavailable() {
        for uri in ["/patients", "/patients/p1"] {
            let (status, body) = send(app(AppState::default()), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, json!({"detail": "Database service unavailable"}));
        }
    }

    #[tokio::test]
    async fn test_explain_note_success() {
        let state = AppState::new(None, Some(Arc::new(FixedSummarizer)));
        let (status, body) = send(
            app(state),
            Method::POST,
            "/explain_note",
            Some(json!({"medical_text": "BP 150/95"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"original_text": "BP 150/95", "simplified_explanation": "Explain of 9 chars"})
        );
    }

    #[tokio::test]
    async fn test_summarize_note_success() {
        let state = AppState::new(None, Some(Arc::new(FixedSummarizer)));
        let (status, body) = send(
            app(state),
            Method::POST,
            "/summarize_note",
            Some(json!({"medical_text": "BP 150/95"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Summarize of 9 chars");
        assert_eq!(body["original_text"], "BP 150/95");
    }

    #[tokio::test]
    async fn test_model_check_comes_before_text_check() {
        let (status, body) = send(
            app(AppState::default()),
            Method::POST,
            "/explain_note",
            Some(json!({"medical_text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Explainer model is not available.");
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let state = AppState::new(None, Some(Arc::new(FixedSummarizer)));
        let (status, body) = send(
            app(state),
            Method::POST,
            "/explain_note",
            Some(json!({"medical_text": " \n\t"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Medical text cannot be empty.");
    }

    #[tokio::test]
    async fn test_model_failure_maps_to_internal_error() {
        let state = AppState::new(None, Some(Arc::new(FailingSummarizer)));
        let (status, body) = send(
            app(state.clone()),
            Method::POST,
            "/explain_note",
            Some(json!({"medical_text": "BP 150/95"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "Failed to generate explanation: parse error: out of memory"
        );

        let (_, body) = send(
            app(state),
            Method::POST,
            "/summarize_note",
            Some(json!({"medical_text": "BP 150/95"})),
        )
        .await;
        assert_eq!(
            body["detail"],
            "Failed to generate summary: parse error: out of memory"
        );
    }

    #[tokio::test]
    async fn test_unreachable_model_maps_to_service_unavailable() {
        let state = AppState::new(None, Some(Arc::new(UnreachableSummarizer)));
        for uri in ["/explain_note", "/summarize_note"] {
            let (status, body) = send(
                app(state.clone()),
                Method::POST,
                uri,
                Some(json!({"medical_text": "BP 150/95"})),
            )
            .await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            assert_eq!(body["detail"], "Explainer model is not available.", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let response = app(AppState::default())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/patients")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let (status, body) = send(
            app(AppState::default()),
            Method::GET,
            "/api-docs/openapi.json",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/explain_note"].is_object());
        assert!(body["paths"]["/patients/{id}"].is_object());
    }
}
