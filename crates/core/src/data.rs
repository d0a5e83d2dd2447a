//! Input documents and the canonical record type

use crate::error::{Error, Result};
use crate::lenient;
use crate::registry::Process;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Separator of composite series keys
pub const KEY_SEPARATOR: char = '|';

/// Reporting period of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub to: String,
}

/// Cleaning count of one airline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirlineCount {
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub count: f64,
}

/// `section1_counts.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CountsDocument {
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub airlines: Vec<AirlineCount>,
}

/// Time saved against standard by one operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedPoint {
    #[serde(default, deserialize_with = "lenient::string")]
    pub airline: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub saved_sec: f64,
}

/// `section1_saved_points.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SavedPointsDocument {
    #[serde(default)]
    pub points: Vec<SavedPoint>,
}

/// Precomputed saved-time summary of one airline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedStat {
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub avg_saved_sec: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub n: u64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub min_saved_sec: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub max_saved_sec: Option<f64>,
}

/// `section1_saved_stats.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SavedStatsDocument {
    #[serde(default)]
    pub stats: Vec<SavedStat>,
}

/// One aircraft type flown by an airline in the period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AircraftEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub aircraft: String,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub n: u64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub standard_sec: Option<f64>,
}

/// `section2_aircraft_list.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AircraftListDocument {
    #[serde(default)]
    pub airlines: Vec<String>,
    #[serde(default)]
    pub aircraft_by_airline: HashMap<String, Vec<AircraftEntry>>,
}

/// Daily rollup of one airline/aircraft pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AircraftDay {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub yyyymmdd: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub avg_actual_sec: f64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub min_actual_sec: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub max_actual_sec: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub standard_sec: Option<f64>,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub n: u64,
}

/// `section2_aircraft_timeseries.json`, keyed by `"AIRLINE|AIRCRAFT"`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AircraftSeriesDocument {
    #[serde(default)]
    pub series: HashMap<String, Vec<AircraftDay>>,
}

/// Daily per-member rollup of one airline/process pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessDay {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub yyyymmdd: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub avg_min: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub members: u64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub sum_sec: Option<f64>,
}

/// `section2_process_timeseries.json`, keyed by `"AIRLINE|PROCESS"`
///
/// `period_avg_min` is kept as delivered; the chart overlay is recomputed
/// from the series itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessSeriesDocument {
    #[serde(default)]
    pub series: HashMap<String, Vec<ProcessDay>>,
    #[serde(default)]
    pub period_avg_min: HashMap<String, Option<f64>>,
}

/// Distinct aircraft one worker handled in one process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerProcessRow {
    #[serde(default, deserialize_with = "lenient::string")]
    pub airline: String,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub member_srl: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub member_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub process: Option<String>,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub aircraft_cnt: u64,
}

/// `section3_worker_process_counts.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkerCountsDocument {
    #[serde(default)]
    pub rows: Vec<WorkerProcessRow>,
}

/// Time one worker spent on one role of one flight
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpeedRow {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub airline: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub flight_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub role_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub process: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub member_srl: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub member_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub time_sec: f64,
}

/// `section3_speed_rows.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpeedRowsDocument {
    #[serde(default)]
    pub rows: Vec<SpeedRow>,
}

/// The eight documents one render cycle consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardDocuments {
    pub counts: CountsDocument,
    pub saved_points: SavedPointsDocument,
    pub saved_stats: SavedStatsDocument,
    pub aircraft_list: AircraftListDocument,
    pub aircraft_series: AircraftSeriesDocument,
    pub process_series: ProcessSeriesDocument,
    pub worker_counts: WorkerCountsDocument,
    pub speed_rows: SpeedRowsDocument,
}

/// Composite `"<PRIMARY>|<SECONDARY>"` key of a cross-entity series
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    primary: String,
    secondary: String,
}

impl SeriesKey {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Result<Self> {
        let primary = primary.into();
        let secondary = secondary.into();
        if primary.contains(KEY_SEPARATOR) || secondary.contains(KEY_SEPARATOR) {
            return Err(Error::InvalidKeyError(format!("{}{}{}", primary, KEY_SEPARATOR, secondary)));
        }
        Ok(Self { primary, secondary })
    }

    /// Parse a key as it appears in a document
    pub fn parse(key: &str) -> Result<Self> {
        let (primary, secondary) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| Error::InvalidKeyError(key.to_string()))?;
        Self::new(primary, secondary)
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn secondary(&self) -> &str {
        &self.secondary
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.primary, KEY_SEPARATOR, self.secondary)
    }
}

/// Worker identity: the identifier is the grouping key, the name is display-only
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Worker {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Worker {
    pub fn new(id: Option<i64>, name: Option<String>) -> Self {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self { id, name }
    }

    /// Grouping key: identifier when present, otherwise the name
    pub fn key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.name.clone().unwrap_or_default(),
        }
    }

    /// Display label: name when present, otherwise the identifier
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.key(),
        }
    }
}

/// One observed ground operation, or a daily rollup of several
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OperationRecord {
    pub airline: String,
    pub aircraft_type: String,
    /// `None` when the label is missing or outside the closed process set
    pub process: Option<Process>,
    pub role_label: Option<String>,
    pub flight_title: Option<String>,
    pub worker: Worker,
    pub date: Option<NaiveDate>,
    pub duration_actual_sec: f64,
    /// `None` for record kinds that have no standard time
    pub standard_sec: Option<f64>,
    pub saved_sec: f64,
    /// Observations this record stands for
    pub samples: u64,
    pub duration_min_sec: Option<f64>,
    pub duration_max_sec: Option<f64>,
}

impl OperationRecord {
    /// Total seconds across the samples this record stands for
    pub fn total_sec(&self) -> f64 {
        self.duration_actual_sec * self.samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_key_roundtrip() {
        let key = SeriesKey::new("HH", "A321").unwrap();
        assert_eq!(key.to_string(), "HH|A321");
        assert_eq!(SeriesKey::parse("HH|A321").unwrap(), key);
    }

    #[test]
    fn test_series_key_rejects_separator() {
        assert!(SeriesKey::new("HH", "A3|21").is_err());
        assert!(SeriesKey::parse("HH").is_err());
        assert!(SeriesKey::parse("HH|A|B").is_err());
    }

    #[test]
    fn test_series_key_error_names_expected_shape() {
        let err = SeriesKey::parse("HH소닉").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyError(ref key) if key == "HH소닉"));
        assert_eq!(
            err.to_string(),
            "Invalid series key 'HH소닉': expected 'PRIMARY|SECONDARY' with no '|' inside either part"
        );
    }

    #[test]
    fn test_worker_key_and_display() {
        let both = Worker::new(Some(7), Some("김철수".to_string()));
        assert_eq!(both.key(), "7");
        assert_eq!(both.display_name(), "김철수");

        let id_only = Worker::new(Some(7), Some("  ".to_string()));
        assert_eq!(id_only.display_name(), "7");

        let name_only = Worker::new(None, Some("Lee".to_string()));
        assert_eq!(name_only.key(), "Lee");
    }

    #[test]
    fn test_documents_tolerate_missing_fields() {
        let doc: ProcessSeriesDocument = serde_json::from_str(
            r#"{"series": {"HH|소닉": [{"yyyymmdd": 20251201, "avg_min": "3.5"}]}}"#,
        )
        .unwrap();
        let rows = &doc.series["HH|소닉"];
        assert_eq!(rows[0].yyyymmdd.as_deref(), Some("20251201"));
        assert_eq!(rows[0].avg_min, 3.5);
        assert_eq!(rows[0].members, 0);
        assert!(doc.period_avg_min.is_empty());
    }

    #[test]
    fn test_period_avg_accepts_null() {
        let doc: ProcessSeriesDocument =
            serde_json::from_str(r#"{"series": {}, "period_avg_min": {"RF|라바": null}}"#).unwrap();
        assert_eq!(doc.period_avg_min["RF|라바"], None);
    }
}
