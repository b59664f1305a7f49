use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::Datelike;
use serde::Deserialize;
use storage::dto::{participant::ParticipantResponse, pick::PickResponse};
use utoipa::IntoParams;

use crate::error::WebError;
use crate::middleware::auth::Requester;
use crate::state::AppState;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SeasonQuery {
    /// Defaults to the current year
    pub season: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/participants",
    responses(
        (status = 200, description = "All participants", body = Vec<ParticipantResponse>)
    ),
    tag = "participants"
)]
pub async fn list_participants(State(state): State<AppState>) -> Result<Response, WebError> {
    let participants = services::list_participants(state.db.pool()).await?;

    let response: Vec<ParticipantResponse> = participants
        .into_iter()
        .map(ParticipantResponse::from)
        .collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}/picks",
    params(
        ("id" = i64, Path, description = "Participant id"),
        SeasonQuery
    ),
    security(
        (),
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "The participant's picks visible to the requester", body = Vec<PickResponse>),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn participant_picks(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    Query(query): Query<SeasonQuery>,
) -> Result<Response, WebError> {
    let season = query
        .season
        .unwrap_or_else(|| chrono::Local::now().year());

    let picks = services::participant_picks(state.db.pool(), id, season, requester.id()).await?;

    let response: Vec<PickResponse> = picks.into_iter().map(PickResponse::from).collect();

    Ok(Json(response).into_response())
}
