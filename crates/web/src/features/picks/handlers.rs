use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::pick::{
    CreatePickRequest, ImportPicksRequest, ImportSummary, MarkDeathRequest, PickResponse,
    UpdateDateRequest,
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Requester;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/picks",
    request_body = CreatePickRequest,
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 201, description = "Pick drafted", body = PickResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Picks can only be drafted for yourself"),
        (status = 409, description = "Subject already picked this season")
    ),
    tag = "picks"
)]
pub async fn create_pick(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Json(req): Json<CreatePickRequest>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;
    req.validate()?;

    let pick = services::create_pick(state.db.pool(), requester, &req).await?;

    Ok((StatusCode::CREATED, Json(PickResponse::from(pick))).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/picks/{id}",
    params(
        ("id" = i64, Path, description = "Pick id")
    ),
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 204, description = "Pick deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your pick"),
        (status = 404, description = "Pick not found")
    ),
    tag = "picks"
)]
pub async fn delete_pick(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;

    services::delete_pick(state.db.pool(), requester, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/picks/{id}/resolve",
    params(
        ("id" = i64, Path, description = "Pick id")
    ),
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Pick resolved against the knowledge source", body = PickResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your pick"),
        (status = 404, description = "Pick not found, or no data found for the subject"),
        (status = 503, description = "Knowledge source unavailable, try again later")
    ),
    tag = "picks"
)]
pub async fn resolve_pick(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;

    let resolution = services::resolve_pick(&state.resolver(), requester, id).await?;

    Ok(Json(PickResponse::from(resolution.pick)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/picks/{id}/death",
    params(
        ("id" = i64, Path, description = "Pick id")
    ),
    request_body = MarkDeathRequest,
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Pick marked deceased", body = PickResponse),
        (status = 400, description = "Birth date unknown or after the death date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your pick"),
        (status = 404, description = "Pick not found")
    ),
    tag = "picks"
)]
pub async fn mark_death(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    Json(req): Json<MarkDeathRequest>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;

    let resolution =
        services::mark_death(&state.resolver(), requester, id, req.death_date).await?;

    Ok(Json(PickResponse::from(resolution.pick)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/picks/{id}/death",
    params(
        ("id" = i64, Path, description = "Pick id")
    ),
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Pick reverted to living", body = PickResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your pick"),
        (status = 404, description = "Pick not found")
    ),
    tag = "picks"
)]
pub async fn unmark_death(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;

    let resolution = services::unmark_death(&state.resolver(), requester, id).await?;

    Ok(Json(PickResponse::from(resolution.pick)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/picks/{id}/date",
    params(
        ("id" = i64, Path, description = "Pick id")
    ),
    request_body = UpdateDateRequest,
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Date corrected and scores recomputed", body = PickResponse),
        (status = 400, description = "Inconsistent dates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your pick"),
        (status = 404, description = "Pick not found")
    ),
    tag = "picks"
)]
pub async fn update_date(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDateRequest>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;

    let resolution =
        services::update_date(&state.resolver(), requester, id, req.date_type, req.new_date)
            .await?;

    Ok(Json(PickResponse::from(resolution.pick)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/picks/import",
    request_body = ImportPicksRequest,
    security(
        ("basic_auth" = [])
    ),
    responses(
        (status = 200, description = "Living picks carried into the target season", body = ImportSummary),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "picks"
)]
pub async fn import_picks(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Json(req): Json<ImportPicksRequest>,
) -> Result<Response, WebError> {
    let requester = requester.require()?;
    req.validate()?;

    let summary = services::import_picks(state.db.pool(), requester, &req).await?;

    Ok(Json(summary).into_response())
}
