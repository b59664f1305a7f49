use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::Tx;
use crate::dto::pick::PickEntry;
use crate::error::{Result, StorageError};
use crate::models::Pick;

const PICK_COLUMNS: &str = "id, participant_id, subject_name, season_year, birth_date, age, \
     death_date, death_age, points, is_first_blood, source_url, description, \
     created_at, updated_at";

const PICK_ENTRY_COLUMNS: &str = "pk.id, pk.participant_id, pk.subject_name, pk.season_year, \
     pk.birth_date, pk.age, pk.death_date, pk.death_age, pk.points, pk.is_first_blood, \
     pk.source_url, pk.description, pk.created_at, pk.updated_at, p.name AS participant_name";

/// Facts learned about a subject while it is still considered living
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivingFacts<'a> {
    pub birth_date: NaiveDate,
    pub age: i32,
    pub source_url: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Every column that changes together when a pick is recorded as deceased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathRecord<'a> {
    pub birth_date: Option<NaiveDate>,
    pub death_date: NaiveDate,
    pub death_age: i32,
    pub points: i32,
    pub source_url: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub struct PickRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PickRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Pick> {
        let pick = sqlx::query_as::<_, Pick>(&format!(
            "SELECT {} FROM picks WHERE id = ?",
            PICK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(pick)
    }

    /// Re-read a pick inside a transaction, seeing its own uncommitted writes
    pub async fn find_by_id_in(&self, tx: &mut Tx<'_>, id: i64) -> Result<Pick> {
        let pick = sqlx::query_as::<_, Pick>(&format!(
            "SELECT {} FROM picks WHERE id = ?",
            PICK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(pick)
    }

    /// All picks of a season, grouped by participant name then subject
    pub async fn list_for_season(&self, season_year: i32) -> Result<Vec<PickEntry>> {
        let picks = sqlx::query_as::<_, PickEntry>(&format!(
            r#"
            SELECT {}
            FROM picks pk
            JOIN participants p ON pk.participant_id = p.id
            WHERE pk.season_year = ?
            ORDER BY p.name, pk.subject_name
            "#,
            PICK_ENTRY_COLUMNS
        ))
        .bind(season_year)
        .fetch_all(self.pool)
        .await?;

        Ok(picks)
    }

    pub async fn list_by_participant(
        &self,
        participant_id: i64,
        season_year: i32,
    ) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(&format!(
            r#"
            SELECT {}
            FROM picks
            WHERE participant_id = ? AND season_year = ?
            ORDER BY subject_name
            "#,
            PICK_COLUMNS
        ))
        .bind(participant_id)
        .bind(season_year)
        .fetch_all(self.pool)
        .await?;

        Ok(picks)
    }

    /// Picks still missing a birth date or age, ordered by subject
    pub async fn list_unresolved(&self, season_year: i32) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(&format!(
            r#"
            SELECT {}
            FROM picks
            WHERE season_year = ? AND (age IS NULL OR birth_date IS NULL)
            ORDER BY subject_name
            "#,
            PICK_COLUMNS
        ))
        .bind(season_year)
        .fetch_all(self.pool)
        .await?;

        Ok(picks)
    }

    /// Create a new unresolved pick
    pub async fn create(
        &self,
        participant_id: i64,
        subject_name: &str,
        season_year: i32,
    ) -> Result<Pick> {
        let result = sqlx::query_as::<_, Pick>(&format!(
            r#"
            INSERT INTO picks (participant_id, subject_name, season_year)
            VALUES (?, ?, ?)
            RETURNING {}
            "#,
            PICK_COLUMNS
        ))
        .bind(participant_id)
        .bind(subject_name)
        .bind(season_year)
        .fetch_one(self.pool)
        .await;

        result.map_err(|e| duplicate_subject(e.into(), subject_name))
    }

    /// Subject names a participant has already drafted for a season
    pub async fn subject_names_in(
        &self,
        tx: &mut Tx<'_>,
        participant_id: i64,
        season_year: i32,
    ) -> Result<HashSet<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT subject_name FROM picks WHERE participant_id = ? AND season_year = ?",
        )
        .bind(participant_id)
        .bind(season_year)
        .fetch_all(&mut **tx)
        .await?;

        Ok(names.into_iter().collect())
    }

    pub async fn list_living_in(
        &self,
        tx: &mut Tx<'_>,
        participant_id: i64,
        season_year: i32,
    ) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(&format!(
            r#"
            SELECT {}
            FROM picks
            WHERE participant_id = ? AND season_year = ? AND death_date IS NULL
            ORDER BY id
            "#,
            PICK_COLUMNS
        ))
        .bind(participant_id)
        .bind(season_year)
        .fetch_all(&mut **tx)
        .await?;

        Ok(picks)
    }

    /// Copy a living pick's subject and resolved facts into another season
    pub async fn insert_carried_over(
        &self,
        tx: &mut Tx<'_>,
        source: &Pick,
        season_year: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO picks (participant_id, subject_name, season_year, age, birth_date, source_url, description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(source.participant_id)
        .bind(&source.subject_name)
        .bind(season_year)
        .bind(source.age)
        .bind(source.birth_date)
        .bind(&source.source_url)
        .bind(&source.description)
        .execute(&mut **tx)
        .await
        .map_err(|e| duplicate_subject(e.into(), &source.subject_name))?;

        Ok(())
    }

    /// Record birth date, current age and provenance. Death columns are left alone.
    ///
    /// Writes (and bumps `updated_at`) only when a value actually differs.
    pub async fn record_living(
        &self,
        tx: &mut Tx<'_>,
        id: i64,
        facts: &LivingFacts<'_>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE picks
            SET birth_date = ?1, age = ?2, source_url = ?3, description = ?4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?5
              AND (birth_date IS NOT ?1 OR age IS NOT ?2
                   OR source_url IS NOT ?3 OR description IS NOT ?4)
            "#,
        )
        .bind(facts.birth_date)
        .bind(facts.age)
        .bind(facts.source_url)
        .bind(facts.description)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a death. `age` becomes the age at death. Provenance columns
    /// are only overwritten when new values are supplied.
    pub async fn record_death(
        &self,
        tx: &mut Tx<'_>,
        id: i64,
        record: &DeathRecord<'_>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE picks
            SET birth_date = COALESCE(?1, birth_date),
                age = ?3, death_date = ?2, death_age = ?3, points = ?4,
                source_url = COALESCE(?5, source_url),
                description = COALESCE(?6, description),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?7
              AND (birth_date IS NOT COALESCE(?1, birth_date)
                   OR age IS NOT ?3 OR death_date IS NOT ?2
                   OR death_age IS NOT ?3 OR points IS NOT ?4
                   OR source_url IS NOT COALESCE(?5, source_url)
                   OR description IS NOT COALESCE(?6, description))
            "#,
        )
        .bind(record.birth_date)
        .bind(record.death_date)
        .bind(record.death_age)
        .bind(record.points)
        .bind(record.source_url)
        .bind(record.description)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revert a pick to living. `age` falls back to the current age when
    /// the birth date is known, otherwise keeps its stored value.
    pub async fn clear_death(&self, tx: &mut Tx<'_>, id: i64, age: Option<i32>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE picks
            SET death_date = NULL, death_age = NULL, points = 0, is_first_blood = 0,
                age = COALESCE(?1, age),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2
            "#,
        )
        .bind(age)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, tx: &mut Tx<'_>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM picks WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn duplicate_subject(error: StorageError, subject_name: &str) -> StorageError {
    if error.is_unique_violation() {
        StorageError::ConstraintViolation(format!(
            "'{}' has already been picked for this season",
            subject_name
        ))
    } else if error.is_foreign_key_violation() {
        StorageError::InvalidInput("Unknown participant".to_string())
    } else {
        error
    }
}
