use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use storage::StorageError;
use storage::dto::pick::ImportSummary;
use storage::models::{Participant, Pick, Season};
use storage::repository::participant::ParticipantRepository;
use storage::repository::pick::PickRepository;
use storage::repository::season::SeasonRepository;
use storage::services::picks::add_pick;
use tracing::{debug, info};

use crate::error::Result;

/// Draft sheet for one season: participant name to subject names
pub type PickSheet = BTreeMap<String, Vec<String>>;

/// Full dump of the store. Credentials are never included.
#[derive(Debug, Serialize, Deserialize)]
pub struct Export {
    pub participants: Vec<Participant>,
    pub seasons: Vec<Season>,
    pub picks: Vec<Pick>,
}

/// Load a draft sheet into a season, creating unknown participants and
/// skipping subjects a participant already picked.
pub async fn import_pick_sheet(
    pool: &SqlitePool,
    season_year: i32,
    sheet: &PickSheet,
) -> Result<ImportSummary> {
    let participants = ParticipantRepository::new(pool);
    let mut summary = ImportSummary::default();

    for (name, subjects) in sheet {
        let participant = participants.find_or_create(name.trim()).await?;

        for subject in subjects {
            match add_pick(pool, Some(participant.id), participant.id, subject, season_year).await {
                Ok(_) => summary.imported += 1,
                Err(StorageError::ConstraintViolation(msg)) => {
                    debug!("Skipping for {}: {}", participant.name, msg);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!(
        "Imported {} pick(s) into season {} ({} skipped)",
        summary.imported, season_year, summary.skipped
    );
    Ok(summary)
}

pub async fn export(pool: &SqlitePool) -> Result<Export> {
    let seasons = SeasonRepository::new(pool).list().await?;
    let pick_repo = PickRepository::new(pool);

    let mut picks = Vec::new();
    for season in &seasons {
        let entries = pick_repo.list_for_season(season.season_year).await?;
        picks.extend(entries.into_iter().map(|entry| entry.pick));
    }

    Ok(Export {
        participants: ParticipantRepository::new(pool).list().await?,
        seasons,
        picks,
    })
}
