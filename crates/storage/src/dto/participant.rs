use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Participant;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub name: String,
    pub username: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id,
            name: participant.name,
            username: participant.username,
            created_at: participant.created_at,
        }
    }
}
