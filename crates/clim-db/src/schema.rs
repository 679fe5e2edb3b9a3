//! Row types matching the fixed `measurement` / `station` schema
//!
//! Dates are stored as zero-padded `YYYY-MM-DD` text, so lexicographic
//! comparison in SQL matches chronological order.

use crate::{DbError, DbResult};
use chrono::NaiveDate;
use clim_core::{Observation, Station, DATE_FORMAT};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Measurement table record (one station-day)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub station: String,
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: Option<f64>,
}

/// Station table record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StationRow {
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

pub(crate) fn parse_stored_date(raw: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| DbError::CorruptRow {
        table: tables::MEASUREMENT,
        reason: format!("bad date '{}': {}", raw, e),
    })
}

impl TryFrom<MeasurementRow> for Observation {
    type Error = DbError;

    fn try_from(row: MeasurementRow) -> DbResult<Self> {
        Ok(Observation {
            date: parse_stored_date(&row.date)?,
            station: row.station,
            precipitation: row.prcp,
            temperature: row.tobs,
        })
    }
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            station: row.station,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation: row.elevation,
        }
    }
}

/// Table names of the observation dataset
pub mod tables {
    pub const MEASUREMENT: &str = "measurement";
    pub const STATION: &str = "station";
}
