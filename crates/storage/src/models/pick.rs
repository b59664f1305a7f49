use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One participant's bet on one named subject for one season.
///
/// `death_date` and `death_age` are set together. `points` is 0 while the
/// subject is living and reflects `death_age` once deceased. `age` holds the
/// current age of a living subject and the final age of a deceased one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Pick {
    pub id: i64,
    pub participant_id: i64,
    pub subject_name: String,
    pub season_year: i32,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i32>,
    pub death_date: Option<NaiveDate>,
    pub death_age: Option<i32>,
    pub points: i32,
    pub is_first_blood: bool,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Unresolved,
    Living,
    Deceased,
}

impl Pick {
    pub fn status(&self) -> PickStatus {
        match (self.birth_date, self.death_date) {
            (_, Some(_)) => PickStatus::Deceased,
            (Some(_), None) => PickStatus::Living,
            (None, None) => PickStatus::Unresolved,
        }
    }

    pub fn is_deceased(&self) -> bool {
        self.death_date.is_some()
    }
}
