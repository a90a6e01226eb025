//! HTTP API for skyroute.
//!
//! All flight endpoints are mounted under `/api`; `/health` sits at the root.

pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use handlers::routes::RouteResponse;
pub use state::{AppState, SWEEP_INTERVAL};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/airspace", get(handlers::airspace::airspace))
        .route("/flight/summary", get(handlers::flight::summary))
        .route("/flight/track", get(handlers::flight::track))
        .route("/routes/:callsign", get(handlers::routes::route));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
