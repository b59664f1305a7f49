use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A yearly competition instance, keyed by `season_year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Season {
    pub id: i64,
    pub season_year: i32,
    pub end_date: NaiveDateTime,
    pub picks_locked: bool,
    pub first_blood_winner_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl Season {
    /// Last second of the year, used when a season is created lazily.
    pub fn default_end_date(season_year: i32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(season_year, 12, 31)?.and_hms_opt(23, 59, 59)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.season_year, 1, 1)
    }
}
