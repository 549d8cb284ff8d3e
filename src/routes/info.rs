use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
};

use crate::models::{ApiInfo, ApiRoutes};
use crate::routes::AppState;

// GET / - Send browsers to the hosted frontend when one is configured
pub async fn root(State(state): State<AppState>) -> Response {
    match &state.config.frontend_url {
        Some(url) => Redirect::temporary(url).into_response(),
        None => concat!("Player Lookup API - v", env!("CARGO_PKG_VERSION")).into_response(),
    }
}

// GET /api - Describe the available routes
pub async fn api_info(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "Player Lookup API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        frontend: state.config.frontend_url.clone(),
        endpoints: ApiRoutes {
            health: "/api/health".to_string(),
            player: "/api/player/{uid}".to_string(),
            connectivity: "/api/test-connectivity".to_string(),
        },
    })
}
