use serde::Deserialize;

// Wire format of the Ergast-compatible F1 API. Every scalar arrives as a
// string except where noted.

#[derive(Deserialize, Debug)]
pub struct ErgastResponse {
    #[serde(rename = "MRData")]
    pub mr_data: MrData,
}

#[derive(Deserialize, Debug)]
pub struct MrData {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(rename = "RaceTable")]
    pub race_table: RaceTable,
}

impl MrData {
    pub fn total(&self) -> usize {
        self.total
            .as_deref()
            .and_then(|total| total.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Deserialize, Debug)]
pub struct RaceTable {
    #[serde(rename = "Races", default)]
    pub races: Vec<Race>,
}

#[derive(Deserialize, Debug)]
pub struct Race {
    #[serde(rename = "raceName", default)]
    pub race_name: Option<String>,
    #[serde(rename = "Results", default)]
    pub results: Vec<RaceResult>,
    #[serde(rename = "Laps", default)]
    pub laps: Vec<Lap>,
}

#[derive(Deserialize, Debug)]
pub struct RaceResult {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(rename = "Driver")]
    pub driver: Driver,
}

#[derive(Deserialize, Debug)]
pub struct Driver {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "permanentNumber", default)]
    pub permanent_number: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Lap {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(rename = "Timings", default)]
    pub timings: Vec<Timing>,
}

#[derive(Deserialize, Debug)]
pub struct Timing {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    #[serde(default)]
    pub time: Option<RawLapTime>,
}

/// Lap times are normally clock strings; some mirrors send bare numbers.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RawLapTime {
    Text(String),
    Number(f64),
}
