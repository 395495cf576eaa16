//! Identification workflow API handlers
//!
//! POST /identify, GET /identify/session, POST /identify/save,
//! POST /identify/cancel

use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::plant::GeoFix;
use crate::models::session::{ImagePayload, SessionSnapshot};
use crate::pipeline::{SaveOutcome, SaveRequest};
use crate::AppState;

/// POST /identify
///
/// Multipart form: `image` (required, the captured photo), `latitude` and
/// `longitude` (optional, the device fix). Returns 200 with the snapshot of
/// the freshly started session; recognition and enrichment continue in the
/// background and are observable via GET /identify/session and /events.
pub async fn start_identification(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SessionSnapshot>> {
    let mut image: Option<ImagePayload> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let declared_type = field.content_type().map(|c| c.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?
                    .to_vec();

                // Sniffed type wins over the declared one
                let content_type = infer::get(&bytes)
                    .map(|kind| kind.mime_type().to_string())
                    .or(declared_type)
                    .unwrap_or_else(|| "image/jpeg".to_string());

                if !content_type.starts_with("image/") {
                    return Err(ApiError::BadRequest(format!(
                        "Uploaded payload is not an image: {}",
                        content_type
                    )));
                }

                image = Some(ImagePayload {
                    bytes,
                    content_type,
                });
            }
            "latitude" => {
                let text = field.text().await.unwrap_or_default();
                latitude = text.trim().parse().ok();
            }
            "longitude" => {
                let text = field.text().await.unwrap_or_default();
                longitude = text.trim().parse().ok();
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing image field".to_string()))?;
    if image.bytes.is_empty() {
        return Err(ApiError::BadRequest("Image field is empty".to_string()));
    }

    let geo_fix = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoFix {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let snapshot = state.orchestrator.begin_capture(image, geo_fix).await;

    // Recognition and enrichment run in the background; stale results are
    // discarded by the generation token if a newer capture arrives.
    let orchestrator = Arc::clone(&state.orchestrator);
    let generation = snapshot.generation;
    tokio::spawn(async move {
        orchestrator.run_identification(generation).await;
    });

    Ok(Json(snapshot))
}

/// GET /identify/session
///
/// Snapshot of the current session for the observing presentation layer.
pub async fn session_status(
    State(state): State<AppState>,
) -> ApiResult<Json<SessionSnapshot>> {
    match state.orchestrator.snapshot().await {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(ApiError::NotFound(
            "No identification session in progress".to_string(),
        )),
    }
}

/// POST /identify/save
///
/// Runs the save gate. Responds with `saved`, or `confirmation_required`
/// when the encoded payload exceeds the confirm threshold and `force` was
/// not set.
pub async fn save_plant(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> ApiResult<Json<SaveOutcome>> {
    let outcome = state.orchestrator.save(request).await?;
    Ok(Json(outcome))
}

/// POST /identify/cancel
///
/// Cancels the current session, clearing draft and image.
pub async fn cancel_identification(
    State(state): State<AppState>,
) -> ApiResult<Json<SessionSnapshot>> {
    let snapshot = state.orchestrator.cancel().await?;
    Ok(Json(snapshot))
}

/// Build identification workflow routes
pub fn identify_routes() -> Router<AppState> {
    Router::new()
        .route("/identify", post(start_identification))
        .route("/identify/session", get(session_status))
        .route("/identify/save", post(save_plant))
        .route("/identify/cancel", post(cancel_identification))
}
