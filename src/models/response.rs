use serde::{Deserialize, Serialize};

/// Shape of the session response, picked with the `detail` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Summary,
    Full,
}

impl Detail {
    /// `full` selects every lap, anything else the fastest-lap summary.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("full") => Detail::Full,
            _ => Detail::Summary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Detail::Summary => "summary",
            Detail::Full => "full",
        }
    }
}

#[derive(Deserialize)]
pub struct SessionQuery {
    pub season: i32,
    pub round: i32,
    pub detail: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FastestLapEntry {
    pub driver: Option<String>,
    pub lap_number: Option<u32>,
    pub lap_time: String,
    pub lap_time_seconds: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapEntry {
    pub lap_number: Option<u32>,
    pub lap_time_seconds: Option<f64>,
    pub lap_time_str: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverLapsEntry {
    pub driver: Option<String>,
    pub driver_number: Option<u32>,
    pub laps: Vec<LapEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Drivers {
    Summary(Vec<FastestLapEntry>),
    Full(Vec<DriverLapsEntry>),
}

impl Drivers {
    pub fn len(&self) -> usize {
        match self {
            Drivers::Summary(entries) => entries.len(),
            Drivers::Full(entries) => entries.len(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionResponse {
    pub source: &'static str,
    pub season: i32,
    pub round: i32,
    pub drivers: Drivers,
}

impl SessionResponse {
    pub fn empty(source: &'static str, season: i32, round: i32, detail: Detail) -> Self {
        let drivers = match detail {
            Detail::Summary => Drivers::Summary(Vec::new()),
            Detail::Full => Drivers::Full(Vec::new()),
        };
        Self {
            source,
            season,
            round,
            drivers,
        }
    }
}
