//! HTTP API Layer
//!
//! Read-only REST API over the fee ledger, built with Axum. Every endpoint
//! goes through [`FeeAccountService`], so the termly view, the payment
//! history, receipts and the class dashboard all report the same balances.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, health, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{http::HeaderName, middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_fees::FeeAccountService;

use crate::config::ApiConfig;
use crate::handlers::{fees, health};
use crate::middleware::{request_log_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub fees: Arc<FeeAccountService>,
    pub health: Arc<dyn HealthCheckable>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(
        fees: FeeAccountService,
        health: Arc<dyn HealthCheckable>,
        config: ApiConfig,
    ) -> Self {
        Self {
            fees: Arc::new(fees),
            health,
            config: Arc::new(config),
        }
    }
}

/// Creates the API router with every route and layer
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let student_routes = Router::new()
        .route("/:id/fees", get(fees::student_fees))
        .route("/:id/payments", get(fees::payment_history))
        .route("/:id/payments/:payment_id/receipt", get(fees::payment_receipt));

    let class_routes = Router::new().route("/:class_name/fees", get(fees::class_dashboard));

    let api_routes = Router::new()
        .nest("/students", student_routes)
        .nest("/classes", class_routes);

    // The last layer added sees the request first, so ids exist before logging.
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(request_log_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
