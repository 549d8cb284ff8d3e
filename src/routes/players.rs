use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::error::ApiError;
use crate::models::LookupResponse;
use crate::routes::AppState;

// GET /api/player/{id} - Resolve a player through the upstream endpoints
pub async fn get_player(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let (data, source) = state.prober.lookup(&uid).await.into_result()?;

    Ok(Json(LookupResponse {
        success: true,
        data,
        source,
    }))
}
