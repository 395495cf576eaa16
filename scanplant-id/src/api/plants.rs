//! Persisted plant record API handlers
//!
//! Thin pass-through views over the persistence gateway.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::plants::{self, PlantSummary};
use crate::error::{ApiError, ApiResult};
use crate::models::plant::PlantRecord;
use crate::AppState;

/// GET /plants query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub owner_id: Option<String>,
}

/// PATCH /plants/:id request
#[derive(Debug, Deserialize)]
pub struct UpdatePlantRequest {
    pub common_name: String,
}

/// GET /plants
pub async fn list_plants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<PlantSummary>>> {
    let summaries = plants::list_plants(&state.db, query.owner_id.as_deref()).await?;
    Ok(Json(summaries))
}

/// GET /plants/:id
pub async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PlantRecord>> {
    match plants::get_plant(&state.db, id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("Plant not found: {}", id))),
    }
}

/// PATCH /plants/:id
///
/// Updates the user-editable common name; the moderation gate applies here
/// the same way it does at save time.
pub async fn update_plant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlantRequest>,
) -> ApiResult<Json<PlantRecord>> {
    if state.moderation.find_violation(&request.common_name).is_some() {
        return Err(ApiError::BadRequest(
            "O Nome Comum contém palavras impróprias. Por favor, insira um nome válido."
                .to_string(),
        ));
    }

    if !plants::update_common_name(&state.db, id, &request.common_name).await? {
        return Err(ApiError::NotFound(format!("Plant not found: {}", id)));
    }

    match plants::get_plant(&state.db, id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("Plant not found: {}", id))),
    }
}

/// DELETE /plants/:id
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    if !plants::delete_plant(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Plant not found: {}", id)));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Build plant record routes
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/plants", get(list_plants))
        .route("/plants/:id", get(get_plant))
        .route("/plants/:id", patch(update_plant))
        .route("/plants/:id", delete(delete_plant))
}
