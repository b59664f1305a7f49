use axum::{
    Router,
    routing::{delete, post, put},
};

use super::handlers::{
    create_pick, delete_pick, import_picks, mark_death, resolve_pick, unmark_death, update_date,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pick))
        .route("/import", post(import_picks))
        .route("/:id", delete(delete_pick))
        .route("/:id/resolve", post(resolve_pick))
        .route("/:id/death", post(mark_death).delete(unmark_death))
        .route("/:id/date", put(update_date))
}
