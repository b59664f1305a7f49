use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::dto::pick::{ImportSummary, PickEntry};
use crate::dto::season::{ParticipantStats, PickAgeInfo, SeasonSummary};
use crate::error::{Result, StorageError};
use crate::models::Pick;
use crate::repository::participant::ParticipantRepository;
use crate::repository::pick::PickRepository;
use crate::repository::season::SeasonRepository;
use crate::services::first_blood;

/// Fail unless the requester is the participant who owns the resource.
/// An anonymous requester is never allowed to mutate anything.
pub fn authorize(requester: Option<i64>, owner_id: i64) -> Result<()> {
    match requester {
        Some(id) if id == owner_id => Ok(()),
        _ => Err(StorageError::Forbidden),
    }
}

/// Load a pick and check that the requester owns it
pub async fn owned_pick(pool: &SqlitePool, requester: Option<i64>, pick_id: i64) -> Result<Pick> {
    let pick = PickRepository::new(pool).find_by_id(pick_id).await?;
    authorize(requester, pick.participant_id)?;
    Ok(pick)
}

/// Draft a new subject for a participant. Duplicate subjects per participant
/// and season are rejected.
pub async fn add_pick(
    pool: &SqlitePool,
    requester: Option<i64>,
    participant_id: i64,
    subject_name: &str,
    season_year: i32,
) -> Result<Pick> {
    authorize(requester, participant_id)?;

    let subject_name = subject_name.trim();
    if subject_name.is_empty() {
        return Err(StorageError::InvalidInput(
            "Subject name cannot be empty".to_string(),
        ));
    }

    SeasonRepository::new(pool).get_or_create(season_year).await?;
    let pick = PickRepository::new(pool)
        .create(participant_id, subject_name, season_year)
        .await?;

    tracing::info!(
        "Participant {} picked '{}' for {}",
        participant_id,
        pick.subject_name,
        season_year
    );
    Ok(pick)
}

/// Delete a pick on behalf of its owner, reconciling first blood if the
/// pick was deceased.
pub async fn delete_pick(pool: &SqlitePool, requester: Option<i64>, pick_id: i64) -> Result<Pick> {
    let picks = PickRepository::new(pool);

    let mut tx = crate::begin_write(pool).await?;
    let pick = picks.find_by_id_in(&mut tx, pick_id).await?;
    authorize(requester, pick.participant_id)?;
    picks.delete(&mut tx, pick_id).await?;
    if pick.is_deceased() {
        first_blood::reconcile(pool, &mut tx, pick.season_year).await?;
    }
    tx.commit().await?;

    tracing::info!("Deleted pick {} ('{}')", pick.id, pick.subject_name);
    Ok(pick)
}

/// Copy a participant's still-living picks from one season into another,
/// skipping subjects already drafted in the target season.
pub async fn import_living_picks(
    pool: &SqlitePool,
    requester: Option<i64>,
    participant_id: i64,
    from_season: i32,
    to_season: i32,
) -> Result<ImportSummary> {
    authorize(requester, participant_id)?;

    if from_season == to_season {
        return Err(StorageError::InvalidInput(
            "Cannot import a season into itself".to_string(),
        ));
    }

    let picks = PickRepository::new(pool);
    let seasons = SeasonRepository::new(pool);

    let mut tx = crate::begin_write(pool).await?;
    seasons.ensure_in(&mut tx, to_season).await?;

    let living = picks
        .list_living_in(&mut tx, participant_id, from_season)
        .await?;
    let mut existing = picks
        .subject_names_in(&mut tx, participant_id, to_season)
        .await?;

    let mut summary = ImportSummary::default();
    for pick in &living {
        if !existing.insert(pick.subject_name.clone()) {
            summary.skipped += 1;
            continue;
        }
        picks.insert_carried_over(&mut tx, pick, to_season).await?;
        summary.imported += 1;
    }

    tx.commit().await?;

    tracing::info!(
        "Imported {} picks from {} to {} for participant {} ({} skipped)",
        summary.imported,
        from_season,
        to_season,
        participant_id,
        summary.skipped
    );
    Ok(summary)
}

/// Picks of a season as seen by `viewer`.
///
/// Until the season is locked picks are drafts: each participant sees only
/// their own, and an anonymous viewer sees none.
pub async fn picks_for_viewer(
    pool: &SqlitePool,
    season_year: i32,
    viewer: Option<i64>,
) -> Result<Vec<PickEntry>> {
    let season = SeasonRepository::new(pool).get_or_create(season_year).await?;
    let picks = PickRepository::new(pool).list_for_season(season_year).await?;

    if season.picks_locked {
        return Ok(picks);
    }

    Ok(picks
        .into_iter()
        .filter(|entry| Some(entry.pick.participant_id) == viewer)
        .collect())
}

pub async fn season_summary(pool: &SqlitePool, season_year: i32) -> Result<SeasonSummary> {
    let seasons = SeasonRepository::new(pool);
    let season = seasons.get_or_create(season_year).await?;
    let available = seasons.list_years().await?;
    Ok(SeasonSummary::new(
        season,
        chrono::Local::now().naive_local(),
        available,
    ))
}

/// Age statistics for every participant over the picks `viewer` may see
pub async fn participant_stats(
    pool: &SqlitePool,
    season_year: i32,
    viewer: Option<i64>,
) -> Result<Vec<ParticipantStats>> {
    let participants = ParticipantRepository::new(pool).list().await?;
    let visible = picks_for_viewer(pool, season_year, viewer).await?;

    let mut by_participant: BTreeMap<i64, Vec<&Pick>> = BTreeMap::new();
    for entry in &visible {
        by_participant
            .entry(entry.pick.participant_id)
            .or_default()
            .push(&entry.pick);
    }

    Ok(participants
        .into_iter()
        .map(|participant| {
            let picks = by_participant
                .get(&participant.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            stats_for(participant.id, participant.name, picks)
        })
        .collect())
}

fn stats_for(participant_id: i64, name: String, picks: &[&Pick]) -> ParticipantStats {
    let aged: Vec<(&Pick, i32)> = picks
        .iter()
        .filter_map(|pick| pick.age.filter(|age| *age > 0).map(|age| (*pick, age)))
        .collect();

    let avg_age = if aged.is_empty() {
        None
    } else {
        let total: i64 = aged.iter().map(|(_, age)| i64::from(*age)).sum();
        Some((total as f64 / aged.len() as f64 * 10.0).round() / 10.0)
    };

    let to_info = |(pick, age): &(&Pick, i32)| PickAgeInfo {
        pick_id: pick.id,
        subject_name: pick.subject_name.clone(),
        age: *age,
    };

    ParticipantStats {
        participant_id,
        name,
        avg_age,
        oldest: aged.iter().max_by_key(|(_, age)| *age).map(to_info),
        youngest: aged.iter().min_by_key(|(_, age)| *age).map(to_info),
        picks_with_age_count: aged.len(),
    }
}
