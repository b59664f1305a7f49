use sqlx::SqlitePool;
use storage::{
    dto::{
        pick::PickEntry,
        season::{FirstBloodEntry, LeaderboardEntry, ParticipantStats, SeasonSummary},
    },
    error::Result,
    models::Season,
    repository::season::SeasonRepository,
    services::picks,
};

pub async fn list_seasons(pool: &SqlitePool) -> Result<Vec<Season>> {
    SeasonRepository::new(pool).list().await
}

pub async fn get_summary(pool: &SqlitePool, year: i32) -> Result<SeasonSummary> {
    picks::season_summary(pool, year).await
}

pub async fn get_leaderboard(pool: &SqlitePool, year: i32) -> Result<Vec<LeaderboardEntry>> {
    SeasonRepository::new(pool).leaderboard(year).await
}

pub async fn get_first_blood(pool: &SqlitePool, year: i32) -> Result<Vec<FirstBloodEntry>> {
    SeasonRepository::new(pool).first_blood(year).await
}

/// Picks of a season, hiding other participants' drafts while unlocked
pub async fn get_picks(
    pool: &SqlitePool,
    year: i32,
    viewer: Option<i64>,
) -> Result<Vec<PickEntry>> {
    picks::picks_for_viewer(pool, year, viewer).await
}

pub async fn get_stats(
    pool: &SqlitePool,
    year: i32,
    viewer: Option<i64>,
) -> Result<Vec<ParticipantStats>> {
    picks::participant_stats(pool, year, viewer).await
}
