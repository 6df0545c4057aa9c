//! API request handlers for the Claim Service

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use claim_lifecycle::{
    Claim, ClaimDetailsUpdate, ClaimQuery, ClaimService, MapData, NewClaim, OfficerProfile,
    ProfileUpdate, Statistics,
};
use fra_common::{ClaimStatus, Envelope, Error, PipelineStage};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Header naming the calling officer
pub const OFFICER_HEADER: &str = "x-officer-id";

/// Shared application state
pub struct AppState {
    pub service: ClaimService,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope::failure(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::InvalidTransition { .. } | Error::TerminalState(_) => StatusCode::CONFLICT,
            Error::MissingPrerequisite(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Storage(_) | Error::JsonSerialization(_) | Error::Other(_) => {
                error!("Internal error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        ApiError {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text()).into()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok(data)))
}

fn officer_id(headers: &HeaderMap) -> Result<String, ApiError> {
    let id = headers
        .get(OFFICER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match id {
        Some(id) => Ok(id.to_string()),
        None => {
            warn!("Request without {} header", OFFICER_HEADER);
            Err(Error::Forbidden(format!("Missing {} header", OFFICER_HEADER)).into())
        }
    }
}

/// Request to move a claim to a new status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub to_status: String,

    #[serde(default)]
    pub remarks: Option<String>,
}

/// Pipeline-board drop of a claim into a stage column
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRequest {
    pub stage: PipelineStage,

    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub jurisdiction: Option<String>,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "claim-service"
    }))
}

/// List claims in the officer's jurisdiction
pub async fn list_claims_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<ClaimQuery>, QueryRejection>,
) -> ApiResult<Vec<Claim>> {
    let officer = officer_id(&headers)?;
    let Query(query) = query?;

    info!("Listing claims for officer: {}", officer);
    ok(state.service.list_claims(&officer, &query).await?)
}

/// File a new claim
pub async fn create_claim_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewClaim>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Claim>>), ApiError> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!("Creating claim for officer: {}", officer);
    let claim = state.service.create_claim(&officer, payload).await?;

    Ok((StatusCode::CREATED, Json(Envelope::ok(claim))))
}

/// Get a single claim
pub async fn get_claim_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> ApiResult<Claim> {
    let officer = officer_id(&headers)?;

    info!("Getting claim {} for officer: {}", claim_id, officer);
    ok(state.service.get_claim(&officer, &claim_id).await?)
}

/// Apply a lifecycle transition
pub async fn transition_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> ApiResult<Claim> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!(
        "Officer {} requests {} -> {}",
        officer, claim_id, payload.to_status
    );
    let claim = state
        .service
        .transition(&officer, &claim_id, &payload.to_status, payload.remarks)
        .await?;

    ok(claim)
}

/// Move a claim to a pipeline stage
pub async fn stage_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    payload: Result<Json<StageRequest>, JsonRejection>,
) -> ApiResult<Claim> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!(
        "Officer {} moves {} to stage {:?}",
        officer, claim_id, payload.stage
    );
    let claim = state
        .service
        .move_to_stage(&officer, &claim_id, payload.stage, payload.remarks)
        .await?;

    ok(claim)
}

/// States the officer may move a claim to
pub async fn allowed_transitions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> ApiResult<Vec<ClaimStatus>> {
    let officer = officer_id(&headers)?;
    ok(state.service.allowed_transitions(&officer, &claim_id).await?)
}

/// Attach map data to an editable claim
pub async fn attach_map_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    payload: Result<Json<MapData>, JsonRejection>,
) -> ApiResult<Claim> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!("Officer {} attaches map to {}", officer, claim_id);
    ok(state.service.attach_map(&officer, &claim_id, payload).await?)
}

/// Edit claimant or land details of an editable claim
pub async fn update_details_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    payload: Result<Json<ClaimDetailsUpdate>, JsonRejection>,
) -> ApiResult<Claim> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!("Officer {} updates details of {}", officer, claim_id);
    ok(state
        .service
        .update_details(&officer, &claim_id, payload)
        .await?)
}

/// Dashboard statistics for the officer's jurisdiction
pub async fn statistics_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Statistics> {
    let officer = officer_id(&headers)?;
    let Query(query) = query?;

    ok(state
        .service
        .statistics(&officer, query.jurisdiction.as_deref())
        .await?)
}

/// Get the calling officer's profile
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<OfficerProfile> {
    let officer = officer_id(&headers)?;
    ok(state.service.profile(&officer).await?)
}

/// Update the calling officer's self-service fields
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<OfficerProfile> {
    let officer = officer_id(&headers)?;
    let Json(payload) = payload?;

    info!("Updating profile for officer: {}", officer);
    ok(state.service.update_profile(&officer, payload).await?)
}
