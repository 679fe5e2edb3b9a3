//! Trailing twelve-month window anchored on the latest recorded date

use crate::filter::ObservationFilter;
use chrono::{Months, NaiveDate};
use std::ops::Bound;

/// Inclusive date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnnualWindow {
    /// Predicate selecting a station's observations inside the window,
    /// both boundary dates included.
    pub fn filter(&self, station: Option<&str>) -> ObservationFilter {
        ObservationFilter {
            station: station.map(str::to_owned),
            start: Bound::Included(self.start),
            end: Bound::Included(self.end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Compute the window ending at `max_date` and starting exactly one
/// calendar year earlier.
///
/// A leap day clamps down to Feb 28 of the previous year.
///
/// `start` saturates at `NaiveDate::MIN`, so for `max_date == NaiveDate::MIN`
/// the window degenerates to that single day and `start == end`. Every
/// other date yields `start < end`.
pub fn annual_window(max_date: NaiveDate) -> AnnualWindow {
    // checked_sub_months clamps to the last valid day of the target month
    let start = max_date
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);

    AnnualWindow {
        start,
        end: max_date,
    }
}
