use std::fmt;

use chrono::TimeDelta;

/// String form used for a lap with no timing at all.
pub const MISSING_LAP_TIME: &str = "None";

/// A lap time as handed over by the data provider.
///
/// Providers are not consistent about how they express durations: a timed lap
/// usually arrives as a clock string, some feeds send plain seconds, and
/// missing-data markers show up as arbitrary text.
#[derive(Debug, Clone, PartialEq)]
pub enum LapTime {
    Duration(TimeDelta),
    Seconds(f64),
    Unparseable(String),
}

impl LapTime {
    /// Parses the provider's textual lap time.
    ///
    /// Text containing a colon is read as an `h:mm:ss.fff` or `m:ss.fff` clock
    /// and becomes [`LapTime::Duration`]. Colon-less numbers such as `59.001`
    /// become [`LapTime::Seconds`]. Anything else is kept as
    /// [`LapTime::Unparseable`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains(':') {
            return match parse_clock(trimmed) {
                Some(delta) => LapTime::Duration(delta),
                None => LapTime::Unparseable(raw.to_string()),
            };
        }
        match trimmed.parse::<f64>() {
            Ok(seconds) => LapTime::Seconds(seconds),
            Err(_) => LapTime::Unparseable(raw.to_string()),
        }
    }
}

fn parse_clock(raw: &str) -> Option<TimeDelta> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let (seconds_part, whole_parts) = parts.split_last()?;

    let mut minutes: i64 = 0;
    for part in whole_parts {
        let value: i64 = part.parse().ok()?;
        if value < 0 {
            return None;
        }
        minutes = minutes.checked_mul(60)?.checked_add(value)?;
    }

    let (secs, fraction) = match seconds_part.split_once('.') {
        Some((secs, fraction)) => (secs, fraction),
        None => (*seconds_part, ""),
    };
    let secs: i64 = secs.parse().ok()?;
    if !(0..60).contains(&secs) || fraction.len() > 9 {
        return None;
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let nanos: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().ok()?
    };

    let delta = TimeDelta::try_minutes(minutes)?
        .checked_add(&TimeDelta::try_seconds(secs)?)?
        .checked_add(&TimeDelta::nanoseconds(nanos))?;
    Some(delta)
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LapTime::Duration(delta) => {
                let millis = delta.num_milliseconds();
                let sign = if millis < 0 { "-" } else { "" };
                let millis = millis.unsigned_abs();
                let hours = millis / 3_600_000;
                let minutes = (millis / 60_000) % 60;
                let seconds = (millis / 1000) % 60;
                let fraction = millis % 1000;
                if hours > 0 {
                    write!(f, "{sign}{hours}:{minutes:02}:{seconds:02}.{fraction:03}")
                } else {
                    write!(f, "{sign}{minutes}:{seconds:02}.{fraction:03}")
                }
            }
            LapTime::Seconds(seconds) => write!(f, "{seconds}"),
            LapTime::Unparseable(raw) => write!(f, "{raw}"),
        }
    }
}

/// One driver's timing for one lap of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapRecord {
    pub driver: Option<String>,
    pub driver_number: Option<u32>,
    pub lap_number: Option<u32>,
    pub lap_time: Option<LapTime>,
}

impl LapRecord {
    /// Identity used to group a driver's laps: the driver identifier, or the
    /// car number when the identifier is missing or blank. `None` when the
    /// record carries neither.
    pub fn driver_key(&self) -> Option<String> {
        match self.driver.as_deref() {
            Some(driver) if !driver.is_empty() => Some(driver.to_string()),
            _ => self.driver_number.map(|number| number.to_string()),
        }
    }

    /// Best-effort string form of the lap time.
    pub fn lap_time_str(&self) -> String {
        self.lap_time
            .as_ref()
            .map(|time| time.to_string())
            .unwrap_or_else(|| MISSING_LAP_TIME.to_string())
    }
}

/// Laps of a single session in provider order.
pub type LapTable = Vec<LapRecord>;
