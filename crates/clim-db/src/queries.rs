//! Observation store queries over the measurement and station tables

use crate::schema::{parse_stored_date, MeasurementRow, StationRow};
use crate::DbClient;
use anyhow::Result;
use chrono::NaiveDate;
use clim_core::{
    Observation, ObservationFilter, ObservationStore, StationId, Station, StatsAccumulator,
    DATE_FORMAT,
};
use futures::TryStreamExt;
use sqlx::{QueryBuilder, Sqlite};
use std::ops::Bound;
use tracing::{debug, instrument};

/// Append `WHERE` clauses for `filter`, binding every value
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ObservationFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(station) = &filter.station {
        qb.push(" AND station = ").push_bind(station.clone());
    }

    match filter.start {
        Bound::Included(start) => {
            qb.push(" AND date >= ").push_bind(format_date(start));
        }
        Bound::Excluded(start) => {
            qb.push(" AND date > ").push_bind(format_date(start));
        }
        Bound::Unbounded => {}
    }

    match filter.end {
        Bound::Included(end) => {
            qb.push(" AND date <= ").push_bind(format_date(end));
        }
        Bound::Excluded(end) => {
            qb.push(" AND date < ").push_bind(format_date(end));
        }
        Bound::Unbounded => {}
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[async_trait::async_trait]
impl ObservationStore for DbClient {
    #[instrument(skip(self))]
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT station, date, CAST(prcp AS REAL) AS prcp, CAST(tobs AS REAL) AS tobs \
             FROM measurement",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY date ASC, station ASC");

        let mut conn = self.session().await?;
        let rows: Vec<MeasurementRow> = qb.build_query_as().fetch_all(&mut *conn).await?;

        debug!("Retrieved {} measurement rows", rows.len());
        let observations = rows
            .into_iter()
            .map(Observation::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(observations)
    }

    #[instrument(skip(self, acc))]
    async fn accumulate_temperatures(
        &self,
        filter: &ObservationFilter,
        acc: &mut StatsAccumulator,
    ) -> Result<()> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT CAST(tobs AS REAL) FROM measurement");
        push_filter(&mut qb, filter);
        qb.push(" AND tobs IS NOT NULL");

        let mut conn = self.session().await?;
        let mut rows = qb.build_query_scalar::<f64>().fetch(&mut *conn);
        while let Some(tobs) = rows.try_next().await? {
            acc.add(tobs);
        }

        debug!("Streamed {} temperature readings", acc.count());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stations(&self) -> Result<Vec<Station>> {
        let mut conn = self.session().await?;
        let rows = sqlx::query_as::<_, StationRow>(
            r#"
            SELECT station, name, latitude, longitude, elevation
            FROM station
            ORDER BY station ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        debug!("Retrieved {} stations", rows.len());
        Ok(rows.into_iter().map(Station::from).collect())
    }

    #[instrument(skip(self))]
    async fn max_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = self.session().await?;
        let raw: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *conn)
            .await?;

        Ok(raw.as_deref().map(parse_stored_date).transpose()?)
    }

    #[instrument(skip(self))]
    async fn most_active_station(&self) -> Result<Option<StationId>> {
        let mut conn = self.session().await?;
        let station: Option<String> = sqlx::query_scalar(
            r#"
            SELECT station FROM measurement
            GROUP BY station
            ORDER BY COUNT(*) DESC, station ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *conn)
        .await?;

        Ok(station)
    }
}
