//! Daily series alignment against a standard time, extremum highlighting and
//! period averages

use crate::data::OperationRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One day of an entity's series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlignedSeriesPoint {
    pub day: NaiveDate,
    /// Sample-weighted mean of the day's records
    pub actual_sec: f64,
    pub standard_sec: Option<f64>,
    pub count_of_samples: u64,
    pub min_actual_sec: Option<f64>,
    pub max_actual_sec: Option<f64>,
    pub sum_sec: f64,
    /// `actual_sec > standard_sec`, strictly
    pub exceeds_standard: bool,
}

/// An entity's aligned daily points plus the standard they were judged against
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlignedSeries {
    pub standard_sec: Option<f64>,
    pub points: Vec<AlignedSeriesPoint>,
}

impl AlignedSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.actual_sec).collect()
    }
}

#[derive(Default)]
struct DayAccumulator {
    weighted_sum: f64,
    plain_sum: f64,
    records: u64,
    samples: u64,
    min: Option<f64>,
    max: Option<f64>,
}

impl DayAccumulator {
    fn push(&mut self, record: &OperationRecord) {
        self.weighted_sum += record.total_sec();
        self.plain_sum += record.duration_actual_sec;
        self.records += 1;
        self.samples += record.samples;

        let low = record.duration_min_sec.unwrap_or(record.duration_actual_sec);
        let high = record.duration_max_sec.unwrap_or(record.duration_actual_sec);
        self.min = Some(self.min.map_or(low, |m| m.min(low)));
        self.max = Some(self.max.map_or(high, |m| m.max(high)));
    }

    fn mean(&self) -> f64 {
        if self.samples > 0 {
            self.weighted_sum / self.samples as f64
        } else {
            // rollups reported with n = 0 still carry their mean
            self.plain_sum / self.records as f64
        }
    }
}

/// Align the records of one entity into chronological daily points
///
/// Only records with `entity_fn(record) == *entity` take part; records without
/// a day are skipped. The entity's standard is taken from the first matching
/// record that carries one, and every point is judged against it. Records that
/// disagree with that first standard are not reconciled.
pub fn align<'a, K, EF>(
    records: impl IntoIterator<Item = &'a OperationRecord>,
    entity: &K,
    entity_fn: EF,
) -> AlignedSeries
where
    K: PartialEq,
    EF: Fn(&OperationRecord) -> K,
{
    let mut standard_sec: Option<f64> = None;
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for record in records {
        if entity_fn(record) != *entity {
            continue;
        }
        if standard_sec.is_none() {
            standard_sec = record.standard_sec;
        }
        let Some(day) = record.date else {
            tracing::debug!("Skipped series record without a day");
            continue;
        };
        days.entry(day).or_default().push(record);
    }

    let points = days
        .into_iter()
        .map(|(day, acc)| {
            let actual_sec = acc.mean();
            AlignedSeriesPoint {
                day,
                actual_sec,
                standard_sec,
                count_of_samples: acc.samples,
                min_actual_sec: acc.min,
                max_actual_sec: acc.max,
                sum_sec: acc.weighted_sum,
                exceeds_standard: standard_sec.is_some_and(|s| actual_sec > s),
            }
        })
        .collect();

    AlignedSeries {
        standard_sec,
        points,
    }
}

/// Visual treatment of a series point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Max,
    Min,
    Default,
}

/// Mark every point equal to the series maximum and every point equal to its
/// minimum; when both coincide the maximum wins. Non-finite values are never
/// marked.
pub fn highlight_extrema(values: &[f64]) -> Vec<Marker> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let max = finite.clone().fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    let min = finite.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))));

    values
        .iter()
        .map(|&v| {
            if Some(v) == max {
                Marker::Max
            } else if Some(v) == min {
                Marker::Min
            } else {
                Marker::Default
            }
        })
        .collect()
}

/// Arithmetic mean of the series values; `None` for an empty series
pub fn period_average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    fn a321() -> String {
        "A321".to_string()
    }

    fn record(aircraft: &str, d: u32, actual: f64, standard: f64, n: u64) -> OperationRecord {
        OperationRecord {
            airline: "HH".to_string(),
            aircraft_type: aircraft.to_string(),
            date: Some(day(d)),
            duration_actual_sec: actual,
            standard_sec: Some(standard),
            samples: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_align_orders_days_and_flags_strictly() {
        let records = vec![
            record("A321", 3, 1000.0, 1000.0, 1),
            record("A321", 1, 1200.0, 1000.0, 2),
            record("B737", 2, 50.0, 10.0, 1),
            record("A321", 2, 800.0, 1000.0, 1),
        ];
        let series = align(&records, &a321(), |r| r.aircraft_type.clone());

        let days: Vec<_> = series.points.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(1), day(2), day(3)]);

        let flags: Vec<_> = series.points.iter().map(|p| p.exceeds_standard).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert_eq!(series.standard_sec, Some(1000.0));
    }

    #[test]
    fn test_align_weights_same_day_records_by_samples() {
        let records = vec![record("A321", 1, 600.0, 900.0, 3), record("A321", 1, 1000.0, 900.0, 1)];
        let series = align(&records, &a321(), |r| r.aircraft_type.clone());

        assert_eq!(series.points.len(), 1);
        let point = &series.points[0];
        assert_eq!(point.actual_sec, 700.0);
        assert_eq!(point.count_of_samples, 4);
        assert_eq!(point.sum_sec, 2800.0);
        assert_eq!(point.min_actual_sec, Some(600.0));
        assert_eq!(point.max_actual_sec, Some(1000.0));
    }

    #[test]
    fn test_align_first_standard_wins() {
        let records = vec![record("A321", 2, 950.0, 900.0, 1), record("A321", 1, 950.0, 1000.0, 1)];
        let series = align(&records, &a321(), |r| r.aircraft_type.clone());

        assert_eq!(series.standard_sec, Some(900.0));
        assert!(series.points.iter().all(|p| p.standard_sec == Some(900.0)));
        assert!(series.points.iter().all(|p| p.exceeds_standard));
    }

    #[test]
    fn test_align_without_standard_never_flags() {
        let mut r = record("A321", 1, 5000.0, 0.0, 1);
        r.standard_sec = None;
        let series = align(&[r], &a321(), |r| r.aircraft_type.clone());

        assert_eq!(series.standard_sec, None);
        assert!(!series.points[0].exceeds_standard);
    }

    #[test]
    fn test_align_skips_records_without_day() {
        let mut r = record("A321", 1, 5000.0, 0.0, 1);
        r.date = None;
        let series = align(&[r], &a321(), |r| r.aircraft_type.clone());
        assert!(series.is_empty());
    }

    #[test]
    fn test_highlight_marks_all_ties() {
        let markers = highlight_extrema(&[10.0, 20.0, 20.0]);
        assert_eq!(markers, vec![Marker::Min, Marker::Max, Marker::Max]);

        let markers = highlight_extrema(&[3.0, 1.0, 2.0, 1.0]);
        assert_eq!(markers, vec![Marker::Max, Marker::Min, Marker::Default, Marker::Min]);
    }

    #[test]
    fn test_highlight_flat_series_marks_max() {
        assert_eq!(highlight_extrema(&[4.0, 4.0]), vec![Marker::Max, Marker::Max]);
        assert!(highlight_extrema(&[]).is_empty());
    }

    #[test]
    fn test_period_average() {
        let avg = period_average(&[10.0, 20.0, 20.0]).unwrap();
        assert!((avg - 16.666_666_666_666_668).abs() < 1e-12);
        assert_eq!(period_average(&[]), None);
        assert_eq!(period_average(&[0.0]), Some(0.0));
    }
}
