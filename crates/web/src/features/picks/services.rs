use chrono::NaiveDate;
use resolver::{PickResolver, Resolution};
use sqlx::SqlitePool;
use storage::{
    dto::pick::{CreatePickRequest, DateKind, ImportPicksRequest, ImportSummary},
    error::Result,
    models::Pick,
    services::picks,
};

pub async fn create_pick(
    pool: &SqlitePool,
    requester: i64,
    request: &CreatePickRequest,
) -> Result<Pick> {
    picks::add_pick(
        pool,
        Some(requester),
        request.participant_id,
        &request.subject_name,
        request.season_year,
    )
    .await
}

pub async fn delete_pick(pool: &SqlitePool, requester: i64, pick_id: i64) -> Result<Pick> {
    picks::delete_pick(pool, Some(requester), pick_id).await
}

/// Carry the requester's living picks forward, by default from the
/// previous season
pub async fn import_picks(
    pool: &SqlitePool,
    requester: i64,
    request: &ImportPicksRequest,
) -> Result<ImportSummary> {
    let from_season = request.from_season.unwrap_or(request.to_season - 1);
    picks::import_living_picks(pool, Some(requester), requester, from_season, request.to_season)
        .await
}

pub async fn resolve_pick(
    resolver: &PickResolver<'_>,
    requester: i64,
    pick_id: i64,
) -> resolver::Result<Resolution> {
    resolver.resolve(pick_id, Some(requester)).await
}

pub async fn mark_death(
    resolver: &PickResolver<'_>,
    requester: i64,
    pick_id: i64,
    death_date: NaiveDate,
) -> resolver::Result<Resolution> {
    resolver.mark_death(pick_id, Some(requester), death_date).await
}

pub async fn unmark_death(
    resolver: &PickResolver<'_>,
    requester: i64,
    pick_id: i64,
) -> resolver::Result<Resolution> {
    resolver.unmark_death(pick_id, Some(requester)).await
}

pub async fn update_date(
    resolver: &PickResolver<'_>,
    requester: i64,
    pick_id: i64,
    kind: DateKind,
    new_date: NaiveDate,
) -> resolver::Result<Resolution> {
    resolver
        .update_date(pick_id, Some(requester), kind, new_date)
        .await
}
