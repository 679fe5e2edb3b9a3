//! Observation store interface and an in-memory implementation

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::filter::ObservationFilter;
use crate::rollups::StatsAccumulator;
use crate::types::{Observation, Station, StationId};

/// Read-only query capability over observations and stations.
///
/// Implementations scope any connection or session to a single call.
#[async_trait::async_trait]
pub trait ObservationStore: Send + Sync {
    /// Observations matching `filter`, ascending by date then station
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>>;

    /// Feed every non-null temperature matching `filter` into `acc`
    async fn accumulate_temperatures(
        &self,
        filter: &ObservationFilter,
        acc: &mut StatsAccumulator,
    ) -> Result<()>;

    /// Full station roster, ordered by station id
    async fn stations(&self) -> Result<Vec<Station>>;

    /// Latest recorded observation date, `None` when the store is empty
    async fn max_date(&self) -> Result<Option<NaiveDate>>;

    /// Station with the most observations; ties go to the lowest id
    async fn most_active_station(&self) -> Result<Option<StationId>>;
}

/// Vector-backed store, used for tests and fixtures
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    observations: Vec<Observation>,
    stations: Vec<Station>,
}

impl MemoryStore {
    pub fn new(mut observations: Vec<Observation>, mut stations: Vec<Station>) -> Self {
        observations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.station.cmp(&b.station)));
        stations.sort_by(|a, b| a.station.cmp(&b.station));
        Self {
            observations,
            stations,
        }
    }

    fn matching<'a>(
        &'a self,
        filter: &'a ObservationFilter,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| filter.matches(o))
    }
}

#[async_trait::async_trait]
impl ObservationStore for MemoryStore {
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        Ok(self.matching(filter).cloned().collect())
    }

    async fn accumulate_temperatures(
        &self,
        filter: &ObservationFilter,
        acc: &mut StatsAccumulator,
    ) -> Result<()> {
        acc.extend(self.matching(filter).filter_map(|o| o.temperature));
        Ok(())
    }

    async fn stations(&self) -> Result<Vec<Station>> {
        Ok(self.stations.clone())
    }

    async fn max_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.observations.iter().map(|o| o.date).max())
    }

    async fn most_active_station(&self) -> Result<Option<StationId>> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for obs in &self.observations {
            *counts.entry(obs.station.as_str()).or_default() += 1;
        }

        // Ids iterate in order; strict > keeps the lowest id on ties
        let mut best: Option<(&str, usize)> = None;
        for (station, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((station, count));
            }
        }
        Ok(best.map(|(station, _)| station.to_string()))
    }
}
