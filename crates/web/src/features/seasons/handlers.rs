use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        pick::PickEntry,
        season::{FirstBloodEntry, LeaderboardEntry, ParticipantStats, SeasonSummary},
    },
    models::Season,
};

use crate::error::WebError;
use crate::middleware::auth::Requester;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/seasons",
    responses(
        (status = 200, description = "All known seasons, newest first", body = Vec<Season>)
    ),
    tag = "seasons"
)]
pub async fn list_seasons(State(state): State<AppState>) -> Result<Response, WebError> {
    let seasons = services::list_seasons(state.db.pool()).await?;

    Ok(Json(seasons).into_response())
}

#[utoipa::path(
    get,
    path = "/api/seasons/{year}",
    params(
        ("year" = i32, Path, description = "Season year")
    ),
    responses(
        (status = 200, description = "Season configuration and time remaining", body = SeasonSummary),
        (status = 400, description = "Invalid season year")
    ),
    tag = "seasons"
)]
pub async fn get_season(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Response, WebError> {
    let summary = services::get_summary(state.db.pool(), year).await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    get,
    path = "/api/seasons/{year}/leaderboard",
    params(
        ("year" = i32, Path, description = "Season year")
    ),
    responses(
        (status = 200, description = "Participants ranked by points", body = Vec<LeaderboardEntry>)
    ),
    tag = "seasons"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Response, WebError> {
    let leaderboard = services::get_leaderboard(state.db.pool(), year).await?;

    Ok(Json(leaderboard).into_response())
}

#[utoipa::path(
    get,
    path = "/api/seasons/{year}/first-blood",
    params(
        ("year" = i32, Path, description = "Season year")
    ),
    responses(
        (status = 200, description = "Picks sharing the earliest death date of the season", body = Vec<FirstBloodEntry>)
    ),
    tag = "seasons"
)]
pub async fn get_first_blood(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Response, WebError> {
    let entries = services::get_first_blood(state.db.pool(), year).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/seasons/{year}/picks",
    params(
        ("year" = i32, Path, description = "Season year")
    ),
    security(
        (),
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Picks visible to the requester", body = Vec<PickEntry>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "seasons"
)]
pub async fn get_picks(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(year): Path<i32>,
) -> Result<Response, WebError> {
    let picks = services::get_picks(state.db.pool(), year, requester.id()).await?;

    Ok(Json(picks).into_response())
}

#[utoipa::path(
    get,
    path = "/api/seasons/{year}/stats",
    params(
        ("year" = i32, Path, description = "Season year")
    ),
    security(
        (),
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Age statistics per participant", body = Vec<ParticipantStats>)
    ),
    tag = "seasons"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(year): Path<i32>,
) -> Result<Response, WebError> {
    let stats = services::get_stats(state.db.pool(), year, requester.id()).await?;

    Ok(Json(stats).into_response())
}
