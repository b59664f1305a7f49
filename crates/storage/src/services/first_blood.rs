use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::Tx;
use crate::error::Result;
use crate::repository::season::SeasonRepository;

/// Season first-blood state after reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstBlood {
    pub earliest_death: Option<NaiveDate>,
    /// Picks whose death date equals the earliest, lowest id first
    pub holder_pick_ids: Vec<i64>,
    pub winner_id: Option<i64>,
}

impl FirstBlood {
    pub fn is_holder(&self, pick_id: i64) -> bool {
        self.holder_pick_ids.contains(&pick_id)
    }
}

/// Recompute first blood for a season from scratch.
///
/// A pick holds first blood exactly when its death date equals the minimum
/// death date of the season. Every pick flag is brought in line with that,
/// then the season's single winner reference is settled: the current winner
/// is kept while they still own a holder pick, otherwise it moves to the
/// owner of the lowest-id holder, or is cleared when nobody has died.
///
/// Must run in the same transaction as the pick mutation that triggered it.
pub async fn reconcile(
    pool: &SqlitePool,
    tx: &mut Tx<'_>,
    season_year: i32,
) -> Result<FirstBlood> {
    let seasons = SeasonRepository::new(pool);
    let season = seasons.ensure_in(tx, season_year).await?;
    let earliest_death = seasons.earliest_death_in(tx, season_year).await?;

    let flipped = sqlx::query(
        r#"
        UPDATE picks
        SET is_first_blood = COALESCE(death_date = ?1, 0),
            updated_at = CURRENT_TIMESTAMP
        WHERE season_year = ?2
          AND is_first_blood != COALESCE(death_date = ?1, 0)
        "#,
    )
    .bind(earliest_death)
    .bind(season_year)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    let holders: Vec<(i64, i64)> = match earliest_death {
        Some(earliest) => {
            sqlx::query_as(
                "SELECT id, participant_id FROM picks WHERE season_year = ? AND death_date = ? ORDER BY id",
            )
            .bind(season_year)
            .bind(earliest)
            .fetch_all(&mut **tx)
            .await?
        }
        None => Vec::new(),
    };

    let winner_id = match season.first_blood_winner_id {
        Some(current) if holders.iter().any(|(_, owner)| *owner == current) => Some(current),
        _ => holders.first().map(|(_, owner)| *owner),
    };

    if winner_id != season.first_blood_winner_id {
        tracing::info!(
            "Season {} first blood winner changed from {:?} to {:?}",
            season_year,
            season.first_blood_winner_id,
            winner_id
        );
        seasons
            .set_first_blood_winner(tx, season_year, winner_id)
            .await?;
    }

    if flipped > 0 {
        tracing::debug!(
            "Season {}: {} first blood flag(s) updated, earliest death {:?}",
            season_year,
            flipped,
            earliest_death
        );
    }

    Ok(FirstBlood {
        earliest_death,
        holder_pick_ids: holders.into_iter().map(|(id, _)| id).collect(),
        winner_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::repository::participant::ParticipantRepository;

    async fn insert_pick(db: &Database, owner: i64, subject: &str, death: Option<&str>) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO picks (participant_id, subject_name, season_year, death_date, death_age, points)
            VALUES (?1, ?2, 2025, ?3, CASE WHEN ?3 IS NULL THEN NULL ELSE 80 END,
                    CASE WHEN ?3 IS NULL THEN 0 ELSE 20 END)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(subject)
        .bind(death)
        .fetch_one(db.pool())
        .await
        .unwrap()
    }

    async fn reconcile_now(db: &Database) -> FirstBlood {
        let mut tx = db.pool().begin().await.unwrap();
        let state = reconcile(db.pool(), &mut tx, 2025).await.unwrap();
        tx.commit().await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_ties_share_first_blood() {
        let db = Database::in_memory().await.unwrap();
        let participants = ParticipantRepository::new(db.pool());
        let jim = participants.create("Jim").await.unwrap().id;
        let drew = participants.create("Drew").await.unwrap().id;

        let a = insert_pick(&db, jim, "A", Some("2025-03-01")).await;
        let b = insert_pick(&db, drew, "B", Some("2025-03-01")).await;
        let c = insert_pick(&db, drew, "C", Some("2025-06-01")).await;
        insert_pick(&db, jim, "D", None).await;

        let state = reconcile_now(&db).await;
        assert_eq!(state.holder_pick_ids, vec![a, b]);
        assert_eq!(state.winner_id, Some(jim));
        assert!(!state.is_holder(c));

        let listed = SeasonRepository::new(db.pool()).first_blood(2025).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|e| e.pick_id).collect();
        assert_eq!(ids, vec![b, a]);

        let flagged: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM picks WHERE is_first_blood = 1 ORDER BY id")
                .fetch_all(db.pool())
                .await
                .unwrap();
        assert_eq!(flagged, vec![a, b]);
    }

    #[tokio::test]
    async fn test_no_deaths_clears_winner() {
        let db = Database::in_memory().await.unwrap();
        let jim = ParticipantRepository::new(db.pool())
            .create("Jim")
            .await
            .unwrap()
            .id;
        insert_pick(&db, jim, "A", None).await;

        let seasons = SeasonRepository::new(db.pool());
        seasons.get_or_create(2025).await.unwrap();
        let mut tx = db.pool().begin().await.unwrap();
        seasons
            .set_first_blood_winner(&mut tx, 2025, Some(jim))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(seasons.find(2025).await.unwrap().first_blood_winner_id, Some(jim));

        let state = reconcile_now(&db).await;
        assert_eq!(state.earliest_death, None);
        assert!(state.holder_pick_ids.is_empty());
        assert_eq!(state.winner_id, None);

        let season = SeasonRepository::new(db.pool()).find(2025).await.unwrap();
        assert_eq!(season.first_blood_winner_id, None);
    }
}
