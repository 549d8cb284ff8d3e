use axum::{extract::State, response::Json};

use crate::models::ConnectivityResponse;
use crate::routes::AppState;

// GET /api/test-connectivity - HEAD the leading upstream endpoints
pub async fn test_connectivity(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    let results = state.prober.check_connectivity().await;

    Json(ConnectivityResponse {
        success: true,
        message: "Upstream connectivity test".to_string(),
        results,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
