use axum::{Router, routing::get};

use super::handlers::{list_participants, participant_picks};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_participants))
        .route("/:id/picks", get(participant_picks))
}
