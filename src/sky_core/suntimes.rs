use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Sunrise and sunset instants on one calendar day. Fetched at most
/// once per session and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(sunrise: NaiveDateTime, sunset: NaiveDateTime) -> Result<Self> {
        if sunrise >= sunset {
            bail!("sunrise {sunrise} is not before sunset {sunset}");
        }
        Ok(Self { sunrise, sunset })
    }
}

/// Parse a 12-hour clock string as delivered by the sun-times API
/// ("6:32:10 AM") onto an explicit reference date. The date is a
/// parameter rather than an ambient "today" so callers and tests stay
/// deterministic. Fails closed: a string that does not parse is an
/// error, never midnight.
pub fn parse_clock_time(value: &str, date: NaiveDate) -> Result<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(value.trim(), "%I:%M:%S %p")
        .with_context(|| format!("unparseable clock time {value:?}"))?;
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::{parse_clock_time, TimeWindow};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn parses_morning_and_afternoon_times() {
        let t = parse_clock_time("6:32:10 AM", date()).unwrap();
        assert_eq!(t, date().and_hms_opt(6, 32, 10).unwrap());

        let t = parse_clock_time("7:45:03 PM", date()).unwrap();
        assert_eq!(t, date().and_hms_opt(19, 45, 3).unwrap());
    }

    #[test]
    fn handles_the_noon_and_midnight_edge_of_twelve_hour_clocks() {
        let midnight = parse_clock_time("12:00:00 AM", date()).unwrap();
        assert_eq!(midnight, date().and_hms_opt(0, 0, 0).unwrap());

        let noon = parse_clock_time("12:30:00 PM", date()).unwrap();
        assert_eq!(noon, date().and_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn garbage_input_is_an_error_not_midnight() {
        assert!(parse_clock_time("", date()).is_err());
        assert!(parse_clock_time("sunrise", date()).is_err());
        assert!(parse_clock_time("25:00:00 AM", date()).is_err());
        assert!(parse_clock_time("6:32 AM", date()).is_err());
    }

    #[test]
    fn window_requires_sunrise_before_sunset() {
        let rise = date().and_hms_opt(6, 30, 0).unwrap();
        let set = date().and_hms_opt(19, 45, 0).unwrap();

        assert!(TimeWindow::new(rise, set).is_ok());
        assert!(TimeWindow::new(set, rise).is_err());
        assert!(TimeWindow::new(rise, rise).is_err());
    }
}
