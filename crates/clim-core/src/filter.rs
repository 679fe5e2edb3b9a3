//! Observation predicates built from client-supplied ranges

use crate::types::{Observation, DATE_FORMAT};
use crate::{QueryError, QueryResult};
use chrono::NaiveDate;
use std::ops::Bound;

/// Conjunction of optional station and date constraints.
///
/// `Unbounded` on either side means no constraint on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationFilter {
    pub station: Option<String>,
    pub start: Bound<NaiveDate>,
    pub end: Bound<NaiveDate>,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ObservationFilter {
    /// Filter matching every observation
    pub fn all() -> Self {
        Self {
            station: None,
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Evaluate the predicate against a single observation
    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(station) = &self.station {
            if obs.station != *station {
                return false;
            }
        }

        let after_start = match self.start {
            Bound::Included(start) => obs.date >= start,
            Bound::Excluded(start) => obs.date > start,
            Bound::Unbounded => true,
        };

        let before_end = match self.end {
            Bound::Included(end) => obs.date <= end,
            Bound::Excluded(end) => obs.date < end,
            Bound::Unbounded => true,
        };

        after_start && before_end
    }
}

/// Parse a zero-padded `YYYY-MM-DD` string into a calendar date.
///
/// chrono accepts unpadded fields, short years and a leading sign, so the
/// parsed date must format back to exactly `input`.
pub fn parse_date(input: &str) -> QueryResult<NaiveDate> {
    let malformed = || QueryError::MalformedDate {
        input: input.to_string(),
    };

    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| malformed())?;
    if date.format(DATE_FORMAT).to_string() != input {
        return Err(malformed());
    }
    Ok(date)
}

/// Build a range filter. Both date bounds are exclusive.
pub fn build_filter(
    station: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> QueryResult<ObservationFilter> {
    let start = match start {
        Some(s) => Bound::Excluded(parse_date(s)?),
        None => Bound::Unbounded,
    };
    let end = match end {
        Some(s) => Bound::Excluded(parse_date(s)?),
        None => Bound::Unbounded,
    };

    Ok(ObservationFilter {
        station: station.map(str::to_owned),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(station: &str, date: &str) -> Observation {
        Observation {
            station: station.into(),
            date: parse_date(date).unwrap(),
            precipitation: None,
            temperature: Some(70.0),
        }
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs("USC00519397", "2017-08-22"),
            obs("USC00519397", "2017-08-23"),
            obs("USC00519397", "2017-08-24"),
        ]
    }

    fn dates(filter: &ObservationFilter) -> Vec<String> {
        sample()
            .iter()
            .filter(|o| filter.matches(o))
            .map(|o| o.date.to_string())
            .collect()
    }

    #[test]
    fn test_start_is_exclusive() {
        let filter = build_filter(None, Some("2017-08-23"), None).unwrap();
        assert_eq!(dates(&filter), vec!["2017-08-24"]);
    }

    #[test]
    fn test_end_is_exclusive() {
        let filter = build_filter(None, None, Some("2017-08-23")).unwrap();
        assert_eq!(dates(&filter), vec!["2017-08-22"]);
    }

    #[test]
    fn test_both_bounds_exclude_boundaries() {
        let filter = build_filter(None, Some("2017-08-22"), Some("2017-08-24")).unwrap();
        assert_eq!(dates(&filter), vec!["2017-08-23"]);

        let filter = build_filter(None, Some("2017-08-23"), Some("2017-08-24")).unwrap();
        assert!(dates(&filter).is_empty());
    }

    #[test]
    fn test_no_bounds_matches_all() {
        let filter = build_filter(None, None, None).unwrap();
        assert_eq!(filter, ObservationFilter::all());
        assert_eq!(dates(&filter).len(), 3);
    }

    #[test]
    fn test_station_equality() {
        let filter = build_filter(Some("USC00519281"), None, None).unwrap();
        assert!(!filter.matches(&obs("USC00519397", "2017-08-23")));
        assert!(filter.matches(&obs("USC00519281", "2017-08-23")));
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for bad in [
            "",
            "2017-13-01",
            "2017-02-30",
            "yesterday",
            "2017/08/23",
            "2017-8-3",
            "17-08-23",
            " 2017-08-23 ",
            "+2017-08-23",
            "2017-08-23T00:00",
        ] {
            let err = build_filter(None, Some(bad), None).unwrap_err();
            assert!(
                matches!(err, QueryError::MalformedDate { ref input } if input == bad),
                "{bad}: {err:?}"
            );
        }

        let err = build_filter(None, Some("2017-08-23"), Some("tomorrow")).unwrap_err();
        assert!(matches!(err, QueryError::MalformedDate { .. }));
    }

    #[test]
    fn test_padded_dates_accepted() {
        for good in ["2017-08-23", "2016-02-29", "0999-01-01"] {
            let date = parse_date(good).unwrap();
            assert_eq!(date.format(DATE_FORMAT).to_string(), good);
        }
    }
}
