use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Pick, PickStatus};

/// A pick joined with its owner's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PickEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pick: Pick,
    pub participant_name: String,
}

/// Response describing a single pick and its derived status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickResponse {
    #[serde(flatten)]
    pub pick: Pick,
    pub status: PickStatus,
}

impl From<Pick> for PickResponse {
    fn from(pick: Pick) -> Self {
        Self {
            status: pick.status(),
            pick,
        }
    }
}

/// Request payload for drafting a new pick
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePickRequest {
    pub participant_id: i64,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Subject name must be between 1 and 255 characters"
    ))]
    pub subject_name: String,

    #[validate(range(min = 1900, max = 2200, message = "Season year is out of range"))]
    pub season_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkDeathRequest {
    pub death_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Birth,
    Death,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDateRequest {
    pub date_type: DateKind,
    pub new_date: NaiveDate,
}

/// Request payload for carrying living picks into another season
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImportPicksRequest {
    /// Defaults to the season before `to_season`
    pub from_season: Option<i32>,

    #[validate(range(min = 1900, max = 2200, message = "Season year is out of range"))]
    pub to_season: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub imported: u32,
    pub skipped: u32,
}
