//! HTTP API server with observability for the catering order engine.
//!
//! Exposes the catalog, quoting, navigation and order submission over REST,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use services::OrderGateway;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::{AppState, create_default_state};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: OrderGateway + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::health::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<G>))
        .route("/menus", get(routes::catalog::menus::<G>))
        .route("/products", get(routes::catalog::products::<G>))
        .route("/accessories", get(routes::catalog::accessories::<G>))
        .route("/status", get(routes::catalog::status::<G>))
        .route("/postal", get(routes::catalog::city::<G>))
        .route("/postal/{code}", get(routes::catalog::postal_code::<G>))
        .route("/quote", post(routes::wizard::quote::<G>))
        .route("/navigate", post(routes::wizard::navigate::<G>))
        .route("/orders", post(routes::orders::create::<G>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
