//! Route handlers.
//!
//! Every error response carries an [`ErrorRes`] body: `{"detail": "<message>"}`.

use crate::AppState;
use api_shared::{
    ErrorRes, ExplainNoteRes, HealthRes, HealthService, MedicalNoteReq, MessageRes, PatientRes,
    SummarizeNoteRes, ROOT_MESSAGE,
};
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use hca_core::PatientService;
use hca_summarizer::{NoteTask, SummarizerError, SummaryRequest};
use std::sync::Arc;

pub(crate) type ApiError = (StatusCode, Json<ErrorRes>);

const DB_UNAVAILABLE: &str = "Database service unavailable";
const MODEL_UNAVAILABLE: &str = "Explainer model is not available.";
const EMPTY_TEXT: &str = "Medical text cannot be empty.";

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(detail)))
}

fn patient_service(state: &AppState) -> Result<Arc<PatientService>, ApiError> {
    state
        .patients
        .clone()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, DB_UNAVAILABLE))
}

/// Run blocking store access off the async runtime.
async fn with_patients<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&PatientService) -> hca_core::StoreResult<T> + Send + 'static,
{
    let service = patient_service(state)?;
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| {
            tracing::error!("Patient store task failed: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?
        .map_err(|e| {
            tracing::error!("Patient store error: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn root() -> Json<MessageRes> {
    Json(MessageRes {
        message: ROOT_MESSAGE.into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not touch the store or model.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All stored patients, ordered by id", body = [PatientRes]),
        (status = 503, description = "Database service unavailable", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all patients in the store
///
/// # Errors
/// Returns `503 Service Unavailable` if the store is not connected, and
/// `500 Internal Server Error` if the collection cannot be read.
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let records = with_patients(&state, |service| service.list_patients()).await?;
    Ok(Json(records.into_iter().map(PatientRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes),
        (status = 503, description = "Database service unavailable", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let lookup_id = id.clone();
    match with_patients(&state, move |service| service.get_patient(&lookup_id)).await? {
        Some(record) => Ok(Json(PatientRes::from(record))),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Patient not found: {id}"),
        )),
    }
}

/// Shared path of the note endpoints: model check, input check, generation.
async fn run_note_task(
    state: &AppState,
    req: &MedicalNoteReq,
    task: NoteTask,
    failure: &str,
) -> Result<String, ApiError> {
    let summarizer = state
        .summarizer
        .clone()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_UNAVAILABLE))?;

    if req.medical_text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, EMPTY_TEXT));
    }

    let request = SummaryRequest::new(task, req.medical_text.clone());
    summarizer
        .summarize(&request)
        .await
        .map_err(|e| match e {
            SummarizerError::Unavailable(_) => {
                tracing::warn!("{} unavailable for {:?}: {}", summarizer.name(), task, e);
                api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_UNAVAILABLE)
            }
            e => {
                tracing::error!("{} failed for {:?}: {}", summarizer.name(), task, e);
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{failure}: {e}"),
                )
            }
        })
}

#[utoipa::path(
    post,
    path = "/explain_note",
    request_body = MedicalNoteReq,
    responses(
        (status = 200, description = "Plain-language explanation", body = ExplainNoteRes),
        (status = 400, description = "Medical text cannot be empty", body = ErrorRes),
        (status = 503, description = "Explainer model is not available", body = ErrorRes),
        (status = 500, description = "Failed to generate explanation", body = ErrorRes)
    )
)]
/// Explain a clinical note in plain language
///
/// The model availability check comes before input validation.
#[axum::debug_handler]
pub(crate) async fn explain_note(
    State(state): State<AppState>,
    Json(req): Json<MedicalNoteReq>,
) -> Result<Json<ExplainNoteRes>, ApiError> {
    let simplified_explanation = run_note_task(
        &state,
        &req,
        NoteTask::Explain,
        "Failed to generate explanation",
    )
    .await?;

    Ok(Json(ExplainNoteRes {
        original_text: req.medical_text,
        simplified_explanation,
    }))
}

#[utoipa::path(
    post,
    path = "/summarize_note",
    request_body = MedicalNoteReq,
    responses(
        (status = 200, description = "Short summary", body = SummarizeNoteRes),
        (status = 400, description = "Medical text cannot be empty", body = ErrorRes),
        (status = 503, description = "Explainer model is not available", body = ErrorRes),
        (status = 500, description = "Failed to generate summary", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn summarize_note(
    State(state): State<AppState>,
    Json(req): Json<MedicalNoteReq>,
) -> Result<Json<SummarizeNoteRes>, ApiError> {
    let summary = run_note_task(
        &state,
        &req,
        NoteTask::Summarize,
        "Failed to generate summary",
    )
    .await?;

    Ok(Json(SummarizeNoteRes {
        original_text: req.medical_text,
        summary,
    }))
}
