use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::HoursError;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, HoursError> {
        if from > to {
            return Err(HoursError::InvalidDateRange);
        }
        Ok(Self { from, to })
    }

    /// From seven days before `today` up to and including `today`.
    pub fn last_week(today: NaiveDate) -> Self {
        Self {
            from: today - Duration::days(7),
            to: today,
        }
    }
}

/// Parses `from,to`, both `YYYY-MM-DD`.
impl FromStr for DateRange {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s.split_once(',').ok_or(HoursError::InvalidDateRange)?;
        let parse = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| HoursError::InvalidDateRange)
        };
        Self::new(parse(from)?, parse(to)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn last_week_starts_seven_days_back() {
        let range = DateRange::last_week(date("2024-03-10"));
        assert_eq!(range.from, date("2024-03-03"));
        assert_eq!(range.to, date("2024-03-10"));
    }

    #[test]
    fn parses_comma_separated_dates() {
        let range: DateRange = "2024-01-01, 2024-01-31".parse().unwrap();
        assert_eq!(range, DateRange::new(date("2024-01-01"), date("2024-01-31")).unwrap());
    }

    #[test]
    fn rejects_reversed_or_malformed_ranges() {
        assert!(matches!(
            "2024-02-01,2024-01-01".parse::<DateRange>(),
            Err(HoursError::InvalidDateRange)
        ));
        assert!("2024-02-01".parse::<DateRange>().is_err());
        assert!("yesterday,today".parse::<DateRange>().is_err());
    }
}
