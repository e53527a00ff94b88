use crate::{handlers::session::get_session_laps, utils::state::AppState};
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/session", get(get_session_laps))
}
