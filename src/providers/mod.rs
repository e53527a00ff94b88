pub mod ergast;

use async_trait::async_trait;
use snafu::Snafu;
use tokio::sync::AcquireError;

use crate::models::lap::LapTable;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("Request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },
    #[snafu(display("Request to {url} returned {status}"))]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[snafu(display("Could not decode response from {url}: {source}"))]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[snafu(display("No race session found for season {season} round {round}"))]
    SessionNotFound { season: i32, round: i32 },
    #[snafu(display("Provider rate limiter closed"))]
    RateLimiterClosed { source: AcquireError },
}

/// Source of race session laps.
///
/// Implementations may block on network I/O and keep their own caches; callers
/// get either the session's full lap table or the reason it could not be
/// loaded. A session that exists but has no lap data yields an empty table.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Name of the data origin, reported as `source` in responses.
    fn source(&self) -> &'static str;

    async fn load_laps(&self, season: i32, round: i32) -> Result<LapTable, ProviderError>;
}
