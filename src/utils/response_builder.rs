use crate::{
    models::{
        lap::LapRecord,
        response::{DriverLapsEntry, Drivers, FastestLapEntry, LapEntry, SessionResponse},
    },
    utils::{
        aggregate::{Aggregated, DriverLaps},
        duration::normalize,
    },
};

fn fastest_lap_entry(lap: &LapRecord) -> FastestLapEntry {
    FastestLapEntry {
        driver: lap.driver_key(),
        lap_number: lap.lap_number,
        lap_time: lap.lap_time_str(),
        lap_time_seconds: normalize(lap.lap_time.as_ref()),
    }
}

fn lap_entry(lap: &LapRecord) -> LapEntry {
    LapEntry {
        lap_number: lap.lap_number,
        lap_time_seconds: normalize(lap.lap_time.as_ref()),
        lap_time_str: lap.lap_time_str(),
    }
}

fn driver_laps_entry(driver: DriverLaps<'_>) -> DriverLapsEntry {
    DriverLapsEntry {
        driver: driver.driver,
        driver_number: driver.driver_number,
        laps: driver.laps.into_iter().map(lap_entry).collect(),
    }
}

pub fn build_response(
    source: &'static str,
    season: i32,
    round: i32,
    aggregated: Aggregated<'_>,
) -> SessionResponse {
    let drivers = match aggregated {
        Aggregated::Fastest(laps) => {
            Drivers::Summary(laps.into_iter().map(fastest_lap_entry).collect())
        }
        Aggregated::Full(drivers) => {
            Drivers::Full(drivers.into_iter().map(driver_laps_entry).collect())
        }
    };

    SessionResponse {
        source,
        season,
        round,
        drivers,
    }
}
