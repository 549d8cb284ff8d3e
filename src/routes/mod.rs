use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{AllowedOrigins, Config};
use crate::prober::Prober;

pub mod connectivity;
pub mod health;
pub mod info;
pub mod players;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub prober: Arc<Prober>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, prober: Prober) -> Self {
        Self {
            prober: Arc::new(prober),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let static_dir = state.config.static_dir.clone();

    let app = Router::new()
        // Root and service info
        .route("/", get(info::root))
        .route("/api", get(info::api_info))
        .route("/api/health", get(health::health_check))

        // Lookup
        .route("/api/player/{id}", get(players::get_player))
        .route("/api/test-connectivity", get(connectivity::test_connectivity));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
