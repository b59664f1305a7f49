use axum::{Router, routing::get};

use super::handlers::{
    get_first_blood, get_leaderboard, get_picks, get_season, get_stats, list_seasons,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_seasons))
        .route("/:year", get(get_season))
        .route("/:year/leaderboard", get(get_leaderboard))
        .route("/:year/first-blood", get(get_first_blood))
        .route("/:year/picks", get(get_picks))
        .route("/:year/stats", get(get_stats))
}
