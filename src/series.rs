//! Price history normalization onto a uniform daily time grid

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum number of usable points required for any forecast
pub const MIN_SERIES_LEN: usize = 2;

/// A single observed price sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Millisecond epoch timestamp (UTC)
    pub timestamp: i64,
    /// Observed price, positive and finite after cleaning
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Daily price history for one coin, chronological ascending, one point per
/// calendar day. Produced by [`SeriesLoader::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistorySeries {
    points: Vec<PricePoint>,
}

impl HistorySeries {
    /// Build a series from points already on the daily grid.
    ///
    /// Intended for callers that have normalized data of their own; ordering
    /// is the caller's responsibility and only checked in debug builds.
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "history points must be strictly ascending by timestamp"
        );
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in chronological order
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<PricePoint> {
        self.points.last().copied()
    }

    /// Calendar day of the most recent observation
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.points.last().and_then(|p| ms_to_day(p.timestamp))
    }

    /// The trailing `n` points as a new series
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}

/// Normalizes raw provider samples into a [`HistorySeries`]
#[derive(Debug)]
pub struct SeriesLoader;

impl SeriesLoader {
    /// Clean and resample raw samples onto a strict one-per-day grid.
    ///
    /// Samples with non-finite or non-positive prices are dropped. Remaining
    /// samples are sorted ascending and snapped to their UTC calendar day;
    /// within a day the latest sample wins. Missing interior days are filled
    /// by linear interpolation between the nearest known neighbours; a gap
    /// with a neighbour on only one side takes that nearest value.
    ///
    /// Fails with [`ForecastError::InsufficientData`] when fewer than
    /// [`MIN_SERIES_LEN`] grid days remain after cleaning.
    pub fn normalize(raw: &[PricePoint]) -> Result<HistorySeries> {
        let mut cleaned: Vec<PricePoint> = raw
            .iter()
            .copied()
            .filter(|p| p.price.is_finite() && p.price > 0.0)
            .collect();
        // Stable sort keeps input order on equal timestamps, so the last
        // sample of a collision wins when inserting below.
        cleaned.sort_by_key(|p| p.timestamp);

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for p in &cleaned {
            if let Some(day) = ms_to_day(p.timestamp) {
                by_day.insert(day, p.price);
            }
        }

        if by_day.len() < MIN_SERIES_LEN {
            return Err(ForecastError::InsufficientData {
                have: by_day.len(),
                need: MIN_SERIES_LEN,
            });
        }

        let first = *by_day.keys().next().unwrap();
        let last = *by_day.keys().next_back().unwrap();
        let span = (last - first).num_days() as usize + 1;

        let mut values: Vec<Option<f64>> = vec![None; span];
        for (day, price) in &by_day {
            values[(*day - first).num_days() as usize] = Some(*price);
        }

        let filled = fill_gaps(&values);
        let points = filled
            .into_iter()
            .enumerate()
            .map(|(i, price)| PricePoint::new(day_to_ms(first + Duration::days(i as i64)), price))
            .collect();

        Ok(HistorySeries { points })
    }
}

/// Fill `None` slots by linear interpolation between the nearest known values
/// on each side; slots with a known value on only one side take that value.
/// Positions with no known value anywhere come back as NaN.
pub(crate) fn fill_gaps(values: &[Option<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        if let Some(x) = v {
            out.push(*x);
            continue;
        }
        let prev = values[..i]
            .iter()
            .rev()
            .enumerate()
            .find_map(|(d, &v)| v.map(|x| (d + 1, x)));
        let next = values[i + 1..]
            .iter()
            .enumerate()
            .find_map(|(d, &v)| v.map(|x| (d + 1, x)));
        out.push(match (prev, next) {
            (Some((dp, vp)), Some((dn, vn))) => {
                vp + (vn - vp) * dp as f64 / (dp + dn) as f64
            }
            (Some((_, vp)), None) => vp,
            (None, Some((_, vn))) => vn,
            (None, None) => f64::NAN,
        });
    }
    out
}

/// Millisecond epoch of midnight UTC on `day`
pub(crate) fn day_to_ms(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// UTC calendar day containing the millisecond-epoch timestamp
pub(crate) fn ms_to_day(ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::fill_gaps;

    #[test]
    fn fill_gaps_interpolates_between_neighbours() {
        let filled = fill_gaps(&[Some(100.0), None, None, Some(106.0)]);
        assert_eq!(filled, vec![100.0, 102.0, 104.0, 106.0]);
    }

    #[test]
    fn fill_gaps_uses_nearest_value_at_the_ends() {
        let filled = fill_gaps(&[None, None, Some(50.0), None]);
        assert_eq!(filled, vec![50.0, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn fill_gaps_leaves_known_values_untouched() {
        let filled = fill_gaps(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(filled, vec![1.0, 2.0, 3.0]);
    }
}
