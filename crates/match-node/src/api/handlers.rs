//! Route handlers. Each one maps a request onto one `MatchConsensusApi` call.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use match_consensus::{
    MatchListFilter, MatchRequest, MatchResult, ProposeMatch, ReportOutcome, TeamStatistics,
};
use match_telemetry::{
    encode_metrics, metric_inc, time_operation, MATCHES_COMPLETED, MATCHES_PROPOSED,
    MATCHES_RESPONDED, OUTCOMES_REPORTED, OUTCOMES_VERIFIED,
};
use serde::Deserialize;
use shared_types::{MatchDecision, MatchRequestId, MatchResultId, TeamId, VerificationDecision};
use std::str::FromStr;

use super::auth::Caller;
use super::error::ApiError;
use super::AppState;

/// Body of `POST /matches/{id}/respond`.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondBody {
    /// Accept or decline.
    pub decision: MatchDecision,
}

/// Body of `POST /outcomes/{id}/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyBody {
    /// Confirm or dispute.
    pub decision: VerificationDecision,
    /// Optional note from the verifier.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Query of `GET /matches`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Direction filter, `all` when absent.
    #[serde(default)]
    pub filter: MatchListFilter,
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id<T: FromStr>(raw: &str) -> ApiResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| ApiError::bad_request(e.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub(super) async fn propose_match(
    State(state): State<AppState>,
    Caller(actor): Caller,
    payload: Result<Json<ProposeMatch>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MatchRequest>)> {
    let _timer = time_operation!("propose_match");
    let request = state.api.propose_match(actor, body(payload)?).await?;
    metric_inc!(MATCHES_PROPOSED);
    Ok((StatusCode::CREATED, Json(request)))
}

pub(super) async fn list_matches(
    State(state): State<AppState>,
    Caller(actor): Caller,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MatchRequest>>> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let requests = state.api.list_matches(actor, query.filter).await?;
    Ok(Json(requests))
}

pub(super) async fn get_match(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<MatchRequest>> {
    let request_id: MatchRequestId = parse_id(&id)?;
    Ok(Json(state.api.get_match(actor, request_id).await?))
}

pub(super) async fn respond_to_match(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    payload: Result<Json<RespondBody>, JsonRejection>,
) -> ApiResult<Json<MatchRequest>> {
    let _timer = time_operation!("respond_to_match");
    let request_id: MatchRequestId = parse_id(&id)?;
    let RespondBody { decision } = body(payload)?;
    let request = state
        .api
        .respond_to_match(actor, request_id, decision)
        .await?;
    metric_inc!(MATCHES_RESPONDED, &[&decision.to_string()]);
    Ok(Json(request))
}

pub(super) async fn complete_match(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<MatchRequest>> {
    let _timer = time_operation!("complete_match");
    let request_id: MatchRequestId = parse_id(&id)?;
    let request = state.api.complete_match(actor, request_id).await?;
    metric_inc!(MATCHES_COMPLETED);
    Ok(Json(request))
}

pub(super) async fn report_outcome(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    payload: Result<Json<ReportOutcome>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MatchResult>)> {
    let _timer = time_operation!("report_outcome");
    let request_id: MatchRequestId = parse_id(&id)?;
    let result = state
        .api
        .report_outcome(actor, request_id, body(payload)?)
        .await?;
    metric_inc!(OUTCOMES_REPORTED);
    Ok((StatusCode::CREATED, Json(result)))
}

pub(super) async fn get_outcome(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<MatchResult>> {
    let request_id: MatchRequestId = parse_id(&id)?;
    Ok(Json(state.api.get_outcome(actor, request_id).await?))
}

pub(super) async fn verify_outcome(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    payload: Result<Json<VerifyBody>, JsonRejection>,
) -> ApiResult<Json<MatchResult>> {
    let _timer = time_operation!("verify_outcome");
    let result_id: MatchResultId = parse_id(&id)?;
    let VerifyBody { decision, feedback } = body(payload)?;
    let result = state
        .api
        .verify_outcome(actor, result_id, decision, feedback)
        .await?;
    metric_inc!(OUTCOMES_VERIFIED, &[&decision.to_string()]);
    Ok(Json(result))
}

pub(super) async fn team_statistics(
    State(state): State<AppState>,
    Caller(_actor): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<TeamStatistics>> {
    let team_id: TeamId = parse_id(&id)?;
    Ok(Json(state.api.team_statistics(team_id).await?))
}

pub(super) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}

pub(super) async fn metrics() -> ApiResult<impl IntoResponse> {
    let text = encode_metrics().map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}
