use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::from_str;
use snafu::{ensure, ResultExt};
use tracing::{debug, info};

use crate::{
    models::{
        ergast::{ErgastResponse, Lap, RaceResult, RawLapTime},
        lap::{LapRecord, LapTable, LapTime},
    },
    providers::{
        DecodeSnafu, ProviderError, RateLimiterClosedSnafu, RequestSnafu, SessionNotFoundSnafu,
        SessionProvider, UpstreamStatusSnafu,
    },
    utils::rate_limiter::RateLimiter,
};

pub const SOURCE: &str = "ergast";

/// Largest page the API hands out.
const PAGE_SIZE: usize = 100;

/// Driver details from the race classification, keyed by driver id.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverInfo {
    pub code: Option<String>,
    pub number: Option<u32>,
}

pub struct ErgastProvider {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
}

impl ErgastProvider {
    pub fn new(client: Client, base_url: &str, limiter: RateLimiter) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    async fn fetch(&self, url: &str) -> Result<ErgastResponse, ProviderError> {
        let _guard = self.limiter.acquire().await.context(RateLimiterClosedSnafu)?;
        debug!(
            "GET {url} ({} provider slots free)",
            self.limiter.available_permits()
        );

        let res = self.client.get(url).send().await.context(RequestSnafu { url })?;
        let status = res.status();
        ensure!(status.is_success(), UpstreamStatusSnafu { url, status });

        let body = res.text().await.context(RequestSnafu { url })?;
        from_str(&body).context(DecodeSnafu { url })
    }

    /// Looks the race up in the results table. Fails when the round does not
    /// exist for the season.
    async fn load_drivers(
        &self,
        season: i32,
        round: i32,
    ) -> Result<HashMap<String, DriverInfo>, ProviderError> {
        let url = format!(
            "{}/{season}/{round}/results/?format=json&limit={PAGE_SIZE}",
            self.base_url
        );
        let res = self.fetch(&url).await?;
        let Some(race) = res.mr_data.race_table.races.first() else {
            return SessionNotFoundSnafu { season, round }.fail();
        };
        info!(
            "Found {} for season {season} round {round}",
            race.race_name.as_deref().unwrap_or("race")
        );
        Ok(driver_map(&race.results))
    }

    async fn load_lap_pages(&self, season: i32, round: i32) -> Result<Vec<Lap>, ProviderError> {
        let mut laps = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/{season}/{round}/laps/?format=json&limit={PAGE_SIZE}&offset={offset}",
                self.base_url
            );
            let res = self.fetch(&url).await?;
            let total = res.mr_data.total();
            let Some(race) = res.mr_data.race_table.races.into_iter().next() else {
                break;
            };

            let timings: usize = race.laps.iter().map(|lap| lap.timings.len()).sum();
            laps.extend(race.laps);
            offset += PAGE_SIZE;
            if timings == 0 || offset >= total {
                break;
            }
        }
        Ok(laps)
    }
}

#[async_trait]
impl SessionProvider for ErgastProvider {
    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn load_laps(&self, season: i32, round: i32) -> Result<LapTable, ProviderError> {
        let drivers = self.load_drivers(season, round).await?;
        let laps = self.load_lap_pages(season, round).await?;
        let table = lap_table(&laps, &drivers);
        info!(
            "Loaded {} laps for {} drivers, season {season} round {round}",
            table.len(),
            drivers.len()
        );
        Ok(table)
    }
}

pub fn driver_map(results: &[RaceResult]) -> HashMap<String, DriverInfo> {
    results
        .iter()
        .map(|result| {
            let number = result
                .number
                .as_deref()
                .or(result.driver.permanent_number.as_deref())
                .and_then(|number| number.parse().ok());
            let info = DriverInfo {
                code: result.driver.code.clone().filter(|code| !code.is_empty()),
                number,
            };
            (result.driver.driver_id.clone(), info)
        })
        .collect()
}

fn lap_time(raw: &RawLapTime) -> LapTime {
    match raw {
        RawLapTime::Text(text) => LapTime::parse(text),
        RawLapTime::Number(seconds) => LapTime::Seconds(*seconds),
    }
}

/// Flattens the API's lap-major timings into one record per driver and lap.
pub fn lap_table(laps: &[Lap], drivers: &HashMap<String, DriverInfo>) -> LapTable {
    laps.iter()
        .flat_map(|lap| {
            let lap_number = lap.number.as_deref().and_then(|n| n.parse().ok());
            lap.timings.iter().map(move |timing| {
                let info = drivers.get(&timing.driver_id);
                LapRecord {
                    driver: info
                        .and_then(|info| info.code.clone())
                        .or_else(|| Some(timing.driver_id.clone())),
                    driver_number: info.and_then(|info| info.number),
                    lap_number,
                    lap_time: timing.time.as_ref().map(lap_time),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS: &str = r#"{
        "MRData": {
            "total": "2",
            "RaceTable": {
                "season": "2024",
                "round": "5",
                "Races": [{
                    "raceName": "Chinese Grand Prix",
                    "Results": [
                        {"number": "1", "Driver": {"driverId": "max_verstappen", "code": "VER", "permanentNumber": "33"}},
                        {"Driver": {"driverId": "de_vries", "permanentNumber": "21"}}
                    ]
                }]
            }
        }
    }"#;

    const LAPS: &str = r#"{
        "MRData": {
            "limit": "100",
            "offset": "0",
            "total": "5",
            "RaceTable": {
                "Races": [{
                    "Laps": [
                        {"number": "1", "Timings": [
                            {"driverId": "max_verstappen", "position": "1", "time": "1:40.512"},
                            {"driverId": "de_vries", "position": "2", "time": "1:41.002"}
                        ]},
                        {"number": "2", "Timings": [
                            {"driverId": "max_verstappen", "position": "1", "time": 98.25},
                            {"driverId": "de_vries", "position": "2"},
                            {"driverId": "unknown_driver", "position": "3", "time": "DNF"}
                        ]}
                    ]
                }]
            }
        }
    }"#;

    fn fixture() -> (HashMap<String, DriverInfo>, Vec<Lap>) {
        let results: ErgastResponse = from_str(RESULTS).unwrap();
        let drivers = driver_map(&results.mr_data.race_table.races[0].results);
        let laps: ErgastResponse = from_str(LAPS).unwrap();
        let laps = laps.mr_data.race_table.races.into_iter().next().unwrap().laps;
        (drivers, laps)
    }

    #[test]
    fn test_driver_map() {
        let (drivers, _) = fixture();
        assert_eq!(
            drivers["max_verstappen"],
            DriverInfo {
                code: Some("VER".to_string()),
                number: Some(1)
            }
        );
        assert_eq!(
            drivers["de_vries"],
            DriverInfo {
                code: None,
                number: Some(21)
            }
        );
    }

    #[test]
    fn test_lap_table_flattens_timings() {
        let (drivers, laps) = fixture();
        let table = lap_table(&laps, &drivers);

        assert_eq!(table.len(), 5);
        assert_eq!(
            table[0],
            LapRecord {
                driver: Some("VER".to_string()),
                driver_number: Some(1),
                lap_number: Some(1),
                lap_time: Some(LapTime::Duration(TimeDelta::milliseconds(100_512))),
            }
        );
        assert_eq!(table[1].driver.as_deref(), Some("de_vries"));
        assert_eq!(table[2].lap_time, Some(LapTime::Seconds(98.25)));
        assert_eq!(table[3].lap_time, None);
        assert_eq!(table[4].driver.as_deref(), Some("unknown_driver"));
        assert_eq!(table[4].driver_number, None);
        assert_eq!(table[4].lap_time, Some(LapTime::Unparseable("DNF".to_string())));
    }

    #[test]
    fn test_total_defaults_to_zero() {
        let res: ErgastResponse =
            from_str(r#"{"MRData": {"RaceTable": {"Races": []}}}"#).unwrap();
        assert_eq!(res.mr_data.total(), 0);
        assert!(res.mr_data.race_table.races.is_empty());
    }

    const EMPTY_RACES: &str = r#"{"MRData": {"total": "0", "RaceTable": {"Races": []}}}"#;

    fn provider(server: &MockServer) -> ErgastProvider {
        ErgastProvider::new(Client::new(), &server.uri(), RateLimiter::new(4, 0))
    }

    async fn mount_results(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/2024/5/results/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_laps_page(server: &MockServer, offset: &str, body: String) {
        Mock::given(method("GET"))
            .and(path("/2024/5/laps/"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    fn laps_page(offset: usize, laps: serde_json::Value) -> String {
        json!({
            "MRData": {
                "limit": "100",
                "offset": offset.to_string(),
                "total": "150",
                "RaceTable": {"Races": [{"Laps": laps}]}
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_load_laps_follows_pages() {
        let server = MockServer::start().await;
        mount_results(&server, RESULTS).await;
        mount_laps_page(
            &server,
            "0",
            laps_page(
                0,
                json!([
                    {"number": "1", "Timings": [
                        {"driverId": "max_verstappen", "time": "1:40.512"},
                        {"driverId": "de_vries", "time": "1:41.002"}
                    ]},
                    {"number": "2", "Timings": [
                        {"driverId": "max_verstappen", "time": "1:39.100"}
                    ]}
                ]),
            ),
        )
        .await;
        mount_laps_page(
            &server,
            "100",
            laps_page(
                100,
                json!([
                    {"number": "2", "Timings": [
                        {"driverId": "de_vries", "time": "1:40.800"}
                    ]},
                    {"number": "3", "Timings": [
                        {"driverId": "max_verstappen", "time": "1:38.900"}
                    ]}
                ]),
            ),
        )
        .await;

        let table = provider(&server).load_laps(2024, 5).await.unwrap();

        assert_eq!(table.len(), 5);
        let lap_two: Vec<Option<&str>> = table
            .iter()
            .filter(|lap| lap.lap_number == Some(2))
            .map(|lap| lap.driver.as_deref())
            .collect();
        assert_eq!(lap_two, vec![Some("VER"), Some("de_vries")]);
        assert_eq!(table[3].driver_number, Some(21));
        assert_eq!(
            table[4].lap_time,
            Some(LapTime::Duration(TimeDelta::milliseconds(98_900)))
        );
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024/5/results/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server).load_laps(2024, 5).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::UpstreamStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_unknown_round_is_session_not_found() {
        let server = MockServer::start().await;
        mount_results(&server, EMPTY_RACES).await;

        let err = provider(&server).load_laps(2024, 5).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::SessionNotFound {
                season: 2024,
                round: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_race_without_lap_data_is_empty() {
        let server = MockServer::start().await;
        mount_results(&server, RESULTS).await;
        mount_laps_page(&server, "0", EMPTY_RACES.to_string()).await;

        let table = provider(&server).load_laps(2024, 5).await.unwrap();
        assert!(table.is_empty());
    }
}
