use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, ServerConfig};
use hca_core::{CoreConfig, DocumentStore, PatientService};
use hca_summarizer::{HttpSummarizer, Summarizer};

/// Main entry point for the healthcare assistant backend
///
/// Connects to the document store, sets up the optional note model and serves the REST API
/// until Ctrl-C. A store that cannot be reached does not stop startup: the patient endpoints
/// answer 503 instead. Without `HCA_MODEL_URL` the note endpoints do the same.
///
/// # Environment Variables
/// - `HCA_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `HCA_DATA_DIR`: Document store root (default: "patient_data")
/// - `HCA_DATABASE`: Database name (default: "healthcare_assistant_db")
/// - `HCA_COLLECTION`: Collection name (default: "patients")
/// - `HCA_MODEL_URL`: Text-to-text inference endpoint (unset: no model)
/// - `HCA_MODEL_NAME`: Model name used in logs (default: "t5-small")
/// - `HCA_CORS_ORIGINS`: Comma-separated allowed origins
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hca_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hca_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = |key: &str| std::env::var(key).ok();

    let server_cfg = ServerConfig::from_values(env("HCA_REST_ADDR"), env("HCA_CORS_ORIGINS"))?;
    let core_cfg = Arc::new(CoreConfig::from_values(
        env("HCA_DATA_DIR"),
        env("HCA_DATABASE"),
        env("HCA_COLLECTION"),
        None,
    )?);

    tracing::info!("++ Starting healthcare assistant REST on {}", server_cfg.addr());

    let store = match DocumentStore::connect(&core_cfg) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!("Could not connect to document store: {}", e);
            None
        }
    };

    let patients = match &store {
        Some(store) => match store.collection(core_cfg.collection()) {
            Ok(collection) => Some(PatientService::new(collection)),
            Err(e) => {
                tracing::error!("Could not open patient collection: {}", e);
                None
            }
        },
        None => None,
    };

    let summarizer: Option<Arc<dyn Summarizer>> = match env("HCA_MODEL_URL") {
        Some(url) if !url.trim().is_empty() => {
            let name = env("HCA_MODEL_NAME").unwrap_or_else(|| "t5-small".into());
            tracing::info!("Note model '{}' at {}", name, url);
            Some(Arc::new(HttpSummarizer::new(&url, &name)))
        }
        _ => {
            tracing::warn!("HCA_MODEL_URL not set; note endpoints will answer 503");
            None
        }
    };

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("-- Shutdown requested");
    };

    let result = api_rest::serve(&server_cfg, AppState::new(patients, summarizer), shutdown).await;

    if let Some(store) = store {
        store.close();
    }
    result
}
