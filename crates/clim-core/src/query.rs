//! The query operations served by the API

use tracing::{debug, instrument};

use crate::filter::{build_filter, ObservationFilter};
use crate::rollups::StatsAccumulator;
use crate::store::ObservationStore;
use crate::types::{PrecipitationSeries, Station, StationId, Statistics, TemperaturePoint};
use crate::window::{annual_window, AnnualWindow};
use crate::{QueryError, QueryResult};

/// Every observation's precipitation, grouped by date then station
#[instrument(skip(store))]
pub async fn precipitation<S>(store: &S) -> QueryResult<PrecipitationSeries>
where
    S: ObservationStore + ?Sized,
{
    let observations = store.observations(&ObservationFilter::all()).await?;

    let mut series = PrecipitationSeries::new();
    for obs in observations {
        series
            .entry(obs.date)
            .or_default()
            .insert(obs.station, obs.precipitation);
    }

    debug!("Built precipitation series over {} dates", series.len());
    Ok(series)
}

#[instrument(skip(store))]
pub async fn stations<S>(store: &S) -> QueryResult<Vec<Station>>
where
    S: ObservationStore + ?Sized,
{
    Ok(store.stations().await?)
}

/// Trailing window ending at the store's latest date
#[instrument(skip(store))]
pub async fn current_window<S>(store: &S) -> QueryResult<AnnualWindow>
where
    S: ObservationStore + ?Sized,
{
    let max_date = store.max_date().await?.ok_or(QueryError::NoObservations)?;
    Ok(annual_window(max_date))
}

/// Use the configured station if any, otherwise ask the store
#[instrument(skip(store))]
pub async fn resolve_most_active<S>(store: &S, configured: Option<&str>) -> QueryResult<StationId>
where
    S: ObservationStore + ?Sized,
{
    if let Some(station) = configured {
        return Ok(station.to_string());
    }

    store
        .most_active_station()
        .await?
        .ok_or(QueryError::NoObservations)
}

/// Temperature series for `station_id` inside the current annual window,
/// ascending by date. Days without a temperature reading are skipped.
#[instrument(skip(store))]
pub async fn most_active_station_series<S>(
    store: &S,
    station_id: &str,
) -> QueryResult<Vec<TemperaturePoint>>
where
    S: ObservationStore + ?Sized,
{
    let window = current_window(store).await?;
    let observations = store.observations(&window.filter(Some(station_id))).await?;

    let series: Vec<TemperaturePoint> = observations
        .into_iter()
        .filter_map(|obs| {
            obs.temperature.map(|tobs| TemperaturePoint {
                date: obs.date,
                tobs,
            })
        })
        .collect();

    debug!(
        "Station {} has {} readings between {} and {}",
        station_id,
        series.len(),
        window.start,
        window.end
    );
    Ok(series)
}

/// Statistics over temperatures strictly after `start` and strictly
/// before `end`
#[instrument(skip(store))]
pub async fn range_statistics<S>(
    store: &S,
    start: Option<&str>,
    end: Option<&str>,
) -> QueryResult<Statistics>
where
    S: ObservationStore + ?Sized,
{
    let filter = build_filter(None, start, end)?;

    let mut acc = StatsAccumulator::new();
    store.accumulate_temperatures(&filter, &mut acc).await?;

    debug!("Reducing {} temperature readings", acc.count());
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_date;
    use crate::store::MemoryStore;
    use crate::types::Observation;

    fn obs(station: &str, date: &str, prcp: Option<f64>, tobs: Option<f64>) -> Observation {
        Observation {
            station: station.into(),
            date: parse_date(date).unwrap(),
            precipitation: prcp,
            temperature: tobs,
        }
    }

    fn fixture() -> MemoryStore {
        MemoryStore::new(
            vec![
                obs("USC00519281", "2016-08-22", Some(0.1), Some(77.0)),
                obs("USC00519281", "2016-08-23", Some(1.79), Some(77.0)),
                obs("USC00519281", "2017-02-01", None, Some(64.0)),
                obs("USC00519281", "2017-08-18", Some(0.06), Some(79.0)),
                obs("USC00519281", "2017-08-19", None, None),
                obs("USC00519397", "2017-08-22", Some(0.0), Some(58.0)),
                obs("USC00519397", "2017-08-23", Some(0.0), Some(72.0)),
                obs("USC00519397", "2017-08-24", Some(0.0), Some(66.0)),
                obs("USC00516128", "2017-08-23", Some(0.45), Some(76.0)),
            ],
            vec![Station {
                station: "USC00519281".into(),
                name: "WAIHEE 837.5, HI US".into(),
                latitude: 21.45167,
                longitude: -157.84889,
                elevation: 32.9,
            }],
        )
    }

    #[tokio::test]
    async fn test_precipitation_keeps_every_station() {
        let series = precipitation(&fixture()).await.unwrap();
        let day = series.get(&parse_date("2017-08-23").unwrap()).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day["USC00519397"], Some(0.0));
        assert_eq!(day["USC00516128"], Some(0.45));

        let missing = series.get(&parse_date("2017-02-01").unwrap()).unwrap();
        assert_eq!(missing["USC00519281"], None);
    }

    #[tokio::test]
    async fn test_stations_roster() {
        let roster = stations(&fixture()).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "WAIHEE 837.5, HI US");
    }

    #[tokio::test]
    async fn test_series_inside_inclusive_window() {
        let store = fixture();
        let window = current_window(&store).await.unwrap();
        assert_eq!(window.end, parse_date("2017-08-24").unwrap());
        assert_eq!(window.start, parse_date("2016-08-24").unwrap());

        let series = most_active_station_series(&store, "USC00519281")
            .await
            .unwrap();
        let dates: Vec<String> = series.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2017-02-01", "2017-08-18"]);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.iter().all(|p| window.contains(p.date)));
    }

    #[tokio::test]
    async fn test_series_includes_window_start() {
        let store = MemoryStore::new(
            vec![
                obs("A", "2016-08-22", None, Some(1.0)),
                obs("A", "2016-08-23", None, Some(2.0)),
                obs("A", "2017-08-23", None, Some(3.0)),
            ],
            vec![],
        );
        let series = most_active_station_series(&store, "A").await.unwrap();
        let temps: Vec<f64> = series.iter().map(|p| p.tobs).collect();
        assert_eq!(temps, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_window_on_empty_store() {
        let store = MemoryStore::default();
        let err = most_active_station_series(&store, "A").await.unwrap_err();
        assert!(matches!(err, QueryError::NoObservations));

        let err = resolve_most_active(&store, None).await.unwrap_err();
        assert!(matches!(err, QueryError::NoObservations));
    }

    #[tokio::test]
    async fn test_resolve_most_active() {
        let store = fixture();
        assert_eq!(
            resolve_most_active(&store, None).await.unwrap(),
            "USC00519281"
        );
        assert_eq!(
            resolve_most_active(&store, Some("USC00519397"))
                .await
                .unwrap(),
            "USC00519397"
        );
    }

    #[tokio::test]
    async fn test_range_statistics_exclusive_bounds() {
        let store = fixture();
        let stats = range_statistics(&store, Some("2017-08-21"), Some("2017-08-25"))
            .await
            .unwrap();
        assert_eq!(stats.minimum, 58.0);
        assert_eq!(stats.maximum, 76.0);
        assert_eq!(stats.mean, 68.0);

        let stats = range_statistics(&store, Some("2017-08-23"), None)
            .await
            .unwrap();
        assert_eq!(stats.minimum, 66.0);
        assert_eq!(stats.maximum, 66.0);
    }

    #[tokio::test]
    async fn test_range_statistics_errors() {
        let store = fixture();
        let err = range_statistics(&store, Some("2017-08-24"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyResult));

        let err = range_statistics(&store, Some("2017-08-xx"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MalformedDate { .. }));
    }

    #[tokio::test]
    async fn test_repeat_queries_identical() {
        let store = fixture();
        let first = serde_json::to_string(&precipitation(&store).await.unwrap()).unwrap();
        let second = serde_json::to_string(&precipitation(&store).await.unwrap()).unwrap();
        assert_eq!(first, second);

        let a = range_statistics(&store, Some("2016-01-01"), None)
            .await
            .unwrap();
        let b = range_statistics(&store, Some("2016-01-01"), None)
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
