use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::Tx;
use crate::dto::season::{FirstBloodEntry, LeaderboardEntry};
use crate::error::{Result, StorageError};
use crate::models::Season;

const SEASON_COLUMNS: &str =
    "id, season_year, end_date, picks_locked, first_blood_winner_id, created_at";

pub struct SeasonRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SeasonRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a season, creating it with an end-of-year deadline on first sight
    pub async fn get_or_create(&self, season_year: i32) -> Result<Season> {
        let mut tx = crate::begin_write(self.pool).await?;
        let season = self.ensure_in(&mut tx, season_year).await?;
        tx.commit().await?;
        Ok(season)
    }

    pub async fn ensure_in(&self, tx: &mut Tx<'_>, season_year: i32) -> Result<Season> {
        let end_date = Season::default_end_date(season_year).ok_or_else(|| {
            StorageError::InvalidInput(format!("Invalid season year: {}", season_year))
        })?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO season_config (season_year, end_date) VALUES (?, ?)",
        )
        .bind(season_year)
        .bind(end_date)
        .execute(&mut **tx)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!("Created season {}", season_year);
        }

        self.find_in(tx, season_year).await
    }

    pub async fn find(&self, season_year: i32) -> Result<Season> {
        let season = sqlx::query_as::<_, Season>(&format!(
            "SELECT {} FROM season_config WHERE season_year = ?",
            SEASON_COLUMNS
        ))
        .bind(season_year)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(season)
    }

    pub async fn find_in(&self, tx: &mut Tx<'_>, season_year: i32) -> Result<Season> {
        let season = sqlx::query_as::<_, Season>(&format!(
            "SELECT {} FROM season_config WHERE season_year = ?",
            SEASON_COLUMNS
        ))
        .bind(season_year)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(season)
    }

    /// Known season years, newest first
    pub async fn list_years(&self) -> Result<Vec<i32>> {
        let years = sqlx::query_scalar::<_, i32>(
            "SELECT season_year FROM season_config ORDER BY season_year DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(years)
    }

    pub async fn list(&self) -> Result<Vec<Season>> {
        let seasons = sqlx::query_as::<_, Season>(&format!(
            "SELECT {} FROM season_config ORDER BY season_year DESC",
            SEASON_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(seasons)
    }

    pub async fn set_picks_locked(&self, season_year: i32, locked: bool) -> Result<Season> {
        let mut tx = crate::begin_write(self.pool).await?;
        self.ensure_in(&mut tx, season_year).await?;

        sqlx::query("UPDATE season_config SET picks_locked = ? WHERE season_year = ?")
            .bind(locked)
            .bind(season_year)
            .execute(&mut *tx)
            .await?;

        let season = self.find_in(&mut tx, season_year).await?;
        tx.commit().await?;
        Ok(season)
    }

    pub async fn set_first_blood_winner(
        &self,
        tx: &mut Tx<'_>,
        season_year: i32,
        winner_id: Option<i64>,
    ) -> Result<()> {
        sqlx::query("UPDATE season_config SET first_blood_winner_id = ? WHERE season_year = ?")
            .bind(winner_id)
            .bind(season_year)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Per-participant point totals and death counts, best first
    pub async fn leaderboard(&self, season_year: i32) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                p.id AS participant_id,
                p.name,
                COALESCE(SUM(pk.points), 0) AS total_points,
                COUNT(pk.death_date) AS deaths_count
            FROM participants p
            LEFT JOIN picks pk ON p.id = pk.participant_id AND pk.season_year = ?
            GROUP BY p.id, p.name
            ORDER BY total_points DESC, deaths_count DESC, p.name
            "#,
        )
        .bind(season_year)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Every deceased pick sharing the season's earliest death date
    pub async fn first_blood(&self, season_year: i32) -> Result<Vec<FirstBloodEntry>> {
        let entries = sqlx::query_as::<_, FirstBloodEntry>(
            r#"
            SELECT
                pk.id AS pick_id,
                p.id AS participant_id,
                p.name AS participant_name,
                pk.subject_name,
                pk.death_date,
                pk.death_age,
                pk.points
            FROM picks pk
            JOIN participants p ON pk.participant_id = p.id
            WHERE pk.season_year = ?1
              AND pk.death_date = (
                  SELECT MIN(death_date)
                  FROM picks
                  WHERE death_date IS NOT NULL AND season_year = ?1
              )
            ORDER BY p.name, pk.id
            "#,
        )
        .bind(season_year)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn earliest_death_in(
        &self,
        tx: &mut Tx<'_>,
        season_year: i32,
    ) -> Result<Option<NaiveDate>> {
        let earliest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MIN(death_date) FROM picks WHERE season_year = ? AND death_date IS NOT NULL",
        )
        .bind(season_year)
        .fetch_one(&mut **tx)
        .await?;

        Ok(earliest)
    }
}
