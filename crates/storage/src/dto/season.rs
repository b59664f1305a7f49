use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::Season;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub participant_id: i64,
    pub name: String,
    pub total_points: i64,
    pub deaths_count: i64,
}

/// A deceased pick holding the season's earliest death date
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FirstBloodEntry {
    pub pick_id: i64,
    pub participant_id: i64,
    pub participant_name: String,
    pub subject_name: String,
    pub death_date: NaiveDate,
    pub death_age: i32,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeasonSummary {
    pub season: Season,
    pub season_start: Option<NaiveDate>,
    pub days_remaining: i64,
    pub hours_remaining: i64,
    pub available_seasons: Vec<i32>,
}

impl SeasonSummary {
    pub fn new(season: Season, now: NaiveDateTime, available_seasons: Vec<i32>) -> Self {
        let remaining = season.end_date - now;
        let (days_remaining, hours_remaining) = if remaining.num_seconds() > 0 {
            (remaining.num_days(), remaining.num_hours() % 24)
        } else {
            (0, 0)
        };

        Self {
            season_start: season.start_date(),
            season,
            days_remaining,
            hours_remaining,
            available_seasons,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickAgeInfo {
    pub pick_id: i64,
    pub subject_name: String,
    pub age: i32,
}

/// Per-participant age statistics over the picks a viewer can see
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantStats {
    pub participant_id: i64,
    pub name: String,
    pub avg_age: Option<f64>,
    pub oldest: Option<PickAgeInfo>,
    pub youngest: Option<PickAgeInfo>,
    pub picks_with_age_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season(end: &str) -> Season {
        Season {
            id: 1,
            season_year: 2025,
            end_date: NaiveDateTime::parse_from_str(end, "%Y-%m-%d %H:%M:%S").unwrap(),
            picks_locked: false,
            first_blood_winner_id: None,
            created_at: NaiveDateTime::parse_from_str("2025-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    #[test]
    fn test_time_remaining_split_into_days_and_hours() {
        let now = NaiveDateTime::parse_from_str("2025-12-29 20:59:59", "%Y-%m-%d %H:%M:%S").unwrap();
        let summary = SeasonSummary::new(season("2025-12-31 23:59:59"), now, vec![2025]);
        assert_eq!(summary.days_remaining, 2);
        assert_eq!(summary.hours_remaining, 3);
        assert_eq!(summary.season_start, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn test_time_remaining_floors_at_zero() {
        let now = NaiveDateTime::parse_from_str("2026-02-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let summary = SeasonSummary::new(season("2025-12-31 23:59:59"), now, vec![]);
        assert_eq!(summary.days_remaining, 0);
        assert_eq!(summary.hours_remaining, 0);
    }
}
