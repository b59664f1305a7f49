use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub username: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}
