//! FRA Claim Service
//!
//! REST API over the claim lifecycle for the Gram Sabha dashboard. Every
//! response uses the `{success, data | code, message}` envelope and every
//! `/api/gs` route identifies the caller through the `X-Officer-Id` header.
//!
//! ## Endpoints
//!
//! - `GET /api/gs/claims` - List claims
//!   (filters: jurisdiction, stage, outcome, claimType, search, page, limit)
//! - `POST /api/gs/claims` - File a new claim
//! - `GET /api/gs/claims/{id}` - Get a claim
//! - `POST /api/gs/claims/{id}/transition` - Apply a status transition
//! - `POST /api/gs/claims/{id}/stage` - Move a claim on the pipeline board
//! - `GET /api/gs/claims/{id}/transitions` - List currently allowed target states
//! - `PUT /api/gs/claims/{id}/map` - Attach map data
//! - `PUT /api/gs/claims/{id}/details` - Edit claimant / land details
//! - `GET /api/gs/statistics` - Dashboard statistics
//! - `GET|PUT /api/gs/officer/profile` - Officer profile
//! - `GET /health` - Health check

pub mod config;
pub mod handlers;
pub mod seed;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use claim_lifecycle::{ClaimRepository, ClaimService, MemoryRepository, RedisRepository};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{Config, StorageBackend};
pub use handlers::{AppState, OFFICER_HEADER};

impl AppState {
    pub fn new(service: ClaimService) -> Self {
        Self { service }
    }

    /// Build the state described by `config`: storage, vocabulary and seed
    pub async fn from_config(config: &Config) -> Result<Self> {
        let repository: Arc<dyn ClaimRepository> = match config.storage_backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Arc::new(MemoryRepository::new())
            }
            StorageBackend::Redis => {
                let repository = RedisRepository::new(&config.redis_url)
                    .await
                    .context("Failed to initialize storage")?;
                repository
                    .health_check()
                    .await
                    .context("Redis health check failed")?;
                Arc::new(repository)
            }
        };

        let service = ClaimService::load(repository, config.vocabulary()?)
            .await
            .context("Failed to load claims")?;

        if let Some(path) = &config.seed_file {
            info!("Applying seed file {}", path.display());
            let seed_data = seed::load_seed(path)?;
            seed::apply_seed(&service, seed_data).await?;
        }

        Ok(Self::new(service))
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/gs/claims",
            get(handlers::list_claims_handler).post(handlers::create_claim_handler),
        )
        .route("/api/gs/claims/{id}", get(handlers::get_claim_handler))
        .route(
            "/api/gs/claims/{id}/transition",
            post(handlers::transition_handler),
        )
        .route("/api/gs/claims/{id}/stage", post(handlers::stage_handler))
        .route(
            "/api/gs/claims/{id}/transitions",
            get(handlers::allowed_transitions_handler),
        )
        .route("/api/gs/claims/{id}/map", put(handlers::attach_map_handler))
        .route(
            "/api/gs/claims/{id}/details",
            put(handlers::update_details_handler),
        )
        .route("/api/gs/statistics", get(handlers::statistics_handler))
        .route(
            "/api/gs/officer/profile",
            get(handlers::get_profile_handler).put(handlers::update_profile_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
