//! Single-pass reduction of temperature observations into summary statistics

use crate::types::Statistics;
use crate::{QueryError, QueryResult};

/// Running min/max/sum/count over a stream of values
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    minimum: f64,
    maximum: f64,
    sum: f64,
    count: usize,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.minimum = self.minimum.min(value);
        self.maximum = self.maximum.max(value);
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Finish the reduction. Fails on an empty stream rather than
    /// dividing by zero.
    pub fn finish(&self) -> QueryResult<Statistics> {
        if self.count == 0 {
            return Err(QueryError::EmptyResult);
        }

        Ok(Statistics {
            minimum: self.minimum,
            maximum: self.maximum,
            mean: self.sum / self.count as f64,
        })
    }
}

impl Extend<f64> for StatsAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Reduce a sequence of temperatures to `{min, max, mean}`
pub fn reduce<I>(values: I) -> QueryResult<Statistics>
where
    I: IntoIterator<Item = f64>,
{
    let mut acc = StatsAccumulator::new();
    acc.extend(values);
    acc.finish()
}
