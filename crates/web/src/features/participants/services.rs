use sqlx::SqlitePool;
use storage::{
    error::Result,
    models::{Participant, Pick},
    repository::{
        participant::ParticipantRepository, pick::PickRepository, season::SeasonRepository,
    },
};

pub async fn list_participants(pool: &SqlitePool) -> Result<Vec<Participant>> {
    ParticipantRepository::new(pool).list().await
}

/// One participant's picks for a season. Drafts of an unlocked season are
/// only shown to their owner.
pub async fn participant_picks(
    pool: &SqlitePool,
    participant_id: i64,
    season_year: i32,
    viewer: Option<i64>,
) -> Result<Vec<Pick>> {
    ParticipantRepository::new(pool)
        .find_by_id(participant_id)
        .await?;
    let season = SeasonRepository::new(pool).get_or_create(season_year).await?;

    if !season.picks_locked && viewer != Some(participant_id) {
        return Ok(Vec::new());
    }

    PickRepository::new(pool)
        .list_by_participant(participant_id, season_year)
        .await
}
