use sqlx::SqlitePool;

use crate::error::{Result, StorageError};
use crate::models::Participant;

const PARTICIPANT_COLUMNS: &str = "id, name, username, password_hash, created_at";

pub struct ParticipantRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {} FROM participants ORDER BY name",
            PARTICIPANT_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {} FROM participants WHERE id = ?",
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {} FROM participants WHERE name = ? ORDER BY id LIMIT 1",
            PARTICIPANT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {} FROM participants WHERE username = ?",
            PARTICIPANT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }

    pub async fn create(&self, name: &str) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "INSERT INTO participants (name) VALUES (?) RETURNING {}",
            PARTICIPANT_COLUMNS
        ))
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        tracing::info!("Created participant {} ({})", participant.name, participant.id);
        Ok(participant)
    }

    /// Look a participant up by display name, creating them if unknown
    pub async fn find_or_create(&self, name: &str) -> Result<Participant> {
        match self.find_by_name(name).await {
            Ok(participant) => Ok(participant),
            Err(StorageError::NotFound) => self.create(name).await,
            Err(e) => Err(e),
        }
    }

    /// Set or reset login credentials. `password_hash` must already be hashed.
    pub async fn set_credentials(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
    ) -> Result<Participant> {
        let result = sqlx::query_as::<_, Participant>(&format!(
            "UPDATE participants SET username = ?, password_hash = ? WHERE id = ? RETURNING {}",
            PARTICIPANT_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(self.pool)
        .await;

        match result {
            Ok(Some(participant)) => Ok(participant),
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => {
                let error = StorageError::from(e);
                if error.is_unique_violation() {
                    Err(StorageError::ConstraintViolation(format!(
                        "Username '{}' is already taken",
                        username
                    )))
                } else {
                    Err(error)
                }
            }
        }
    }
}
