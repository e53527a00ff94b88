use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use http::StatusCode;
use tracing::{debug, info, warn};

use crate::{
    models::{
        cache::ResponseCache,
        error::Error,
        response::{Detail, SessionQuery, SessionResponse},
    },
    utils::{aggregate::aggregate, response_builder::build_response, state::AppState},
};

pub async fn get_session_laps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionQuery>,
) -> Result<impl IntoResponse, Error> {
    let SessionQuery {
        season,
        round,
        detail,
    } = params;
    let detail = Detail::from_param(detail.as_deref());

    let key = ResponseCache::key(season, round, detail);
    if let Some(cached) = state.response_cache.get(&key) {
        debug!("Serving {key} from cache");
        return Ok((StatusCode::OK, Json(cached)));
    }

    let laps = state
        .provider
        .load_laps(season, round)
        .await
        .map_err(|err| {
            warn!("Failed to load laps for season {season} round {round}: {err}");
            Error::from(err)
        })?;

    let source = state.provider.source();
    let res = if laps.is_empty() {
        info!("No lap data for season {season} round {round}");
        SessionResponse::empty(source, season, round, detail)
    } else {
        build_response(source, season, round, aggregate(&laps, detail))
    };
    debug!(
        "Built {} response with {} drivers for {key}",
        detail.as_str(),
        res.drivers.len()
    );

    state.response_cache.insert(key, res.clone());
    Ok((StatusCode::OK, Json(res)))
}
