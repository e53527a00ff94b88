use crate::models::lap::LapTime;

/// Converts a provider lap time into seconds.
///
/// Every shape the provider can hand over maps to either a number of seconds
/// or `None`; this never fails.
pub fn normalize(value: Option<&LapTime>) -> Option<f64> {
    match value? {
        LapTime::Duration(delta) => delta
            .num_microseconds()
            .map(|micros| micros as f64 / 1_000_000.0),
        LapTime::Seconds(seconds) if seconds.is_finite() => Some(*seconds),
        LapTime::Seconds(_) => None,
        LapTime::Unparseable(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_structured_duration() {
        let time = LapTime::Duration(TimeDelta::milliseconds(90_100));
        assert_eq!(normalize(Some(&time)), Some(90.1));
    }

    #[test]
    fn test_numeric_seconds() {
        assert_eq!(normalize(Some(&LapTime::Seconds(92.5))), Some(92.5));
    }

    #[test]
    fn test_non_finite_seconds() {
        assert_eq!(normalize(Some(&LapTime::Seconds(f64::NAN))), None);
        assert_eq!(normalize(Some(&LapTime::Seconds(f64::INFINITY))), None);
    }

    #[test]
    fn test_unparseable_and_missing() {
        let time = LapTime::Unparseable("NaT".to_string());
        assert_eq!(normalize(Some(&time)), None);
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn test_overflowing_duration() {
        assert_eq!(normalize(Some(&LapTime::Duration(TimeDelta::MAX))), None);
    }
}
