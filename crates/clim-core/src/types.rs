//! Core data types for station observations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire format for every date crossing the API or the store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Station identifier (e.g. `USC00519281`)
pub type StationId = String;

/// One station's readings for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub station: StationId,

    pub date: NaiveDate,

    /// Precipitation amount, non-negative when present
    #[serde(rename = "prcp")]
    pub precipitation: Option<f64>,

    /// Temperature observation
    #[serde(rename = "tobs")]
    pub temperature: Option<f64>,
}

/// Weather station reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub station: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// A single entry of the most-active-station temperature series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperaturePoint {
    pub date: NaiveDate,
    pub tobs: f64,
}

/// Summary statistics over a non-empty set of temperature observations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    #[serde(rename = "TMIN")]
    pub minimum: f64,

    #[serde(rename = "TMAX")]
    pub maximum: f64,

    #[serde(rename = "TAVG")]
    pub mean: f64,
}

/// Precipitation keyed by date, then by station.
///
/// Several stations report on the same day, so a flat date map would
/// silently drop readings.
pub type PrecipitationSeries = BTreeMap<NaiveDate, BTreeMap<StationId, Option<f64>>>;
