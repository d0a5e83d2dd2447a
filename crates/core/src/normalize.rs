//! Conversion of raw document rows into [`OperationRecord`]s
//!
//! Normalization never rejects a row. Missing numbers are already zero by the
//! time a row is decoded (see [`crate::lenient`]); here the remaining gaps are
//! resolved: unparseable days become `None`, unknown process labels become
//! `None`, a missing airline is derived from the flight title.

use crate::data::{
    AircraftDay, OperationRecord, ProcessDay, SavedPoint, SeriesKey, SpeedRow, Worker,
    WorkerProcessRow,
};
use crate::registry::Process;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

/// A raw row that can be normalized on its own
pub trait RawRecord {
    fn to_record(&self) -> OperationRecord;
}

/// A series row together with the key of the series it belongs to
#[derive(Debug, Clone, Copy)]
pub struct KeyedRow<'a, R> {
    pub key: &'a SeriesKey,
    pub row: &'a R,
}

/// Normalize one raw row
pub fn normalize<R: RawRecord + ?Sized>(raw: &R) -> OperationRecord {
    raw.to_record()
}

/// Normalize every row of a slice
pub fn normalize_all<R: RawRecord>(rows: &[R]) -> Vec<OperationRecord> {
    rows.iter().map(RawRecord::to_record).collect()
}

/// Parse `20251201`, `2025-12-01` or a timestamp starting with either
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() >= 10 && raw.as_bytes().get(4) == Some(&b'-') {
        let date_part = raw.get(..10)?;
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }
    let compact = raw.get(..8)?;
    if !compact.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(compact, "%Y%m%d").ok()
}

/// Explicit airline when non-empty, else the first two characters of the flight title
pub fn derive_airline(airline: Option<&str>, flight_title: Option<&str>) -> String {
    match airline.map(str::trim).filter(|a| !a.is_empty()) {
        Some(code) => code.to_string(),
        None => flight_title.unwrap_or_default().chars().take(2).collect(),
    }
}

/// Process a role label belongs to (`소닉3` → 소닉, `라바백업` → 라바, others → 로보캅)
pub fn process_for_role(role_label: &str) -> Option<Process> {
    let role = role_label.trim();
    if role.is_empty() {
        None
    } else if role.starts_with(Process::Sonic.label()) {
        Some(Process::Sonic)
    } else if role.starts_with(Process::Lava.label()) {
        Some(Process::Lava)
    } else {
        Some(Process::Robocop)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Standard cleaning time per `"AIRLINE|AIRCRAFT"`, with a fallback
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StandardTimes {
    #[serde(default, deserialize_with = "crate::lenient::f64")]
    pub default_standard_sec: f64,
    #[serde(default)]
    pub by_airline_aircraft: HashMap<String, f64>,
}

impl StandardTimes {
    pub fn lookup(&self, key: &SeriesKey) -> f64 {
        self.by_airline_aircraft
            .get(&key.to_string())
            .copied()
            .unwrap_or(self.default_standard_sec)
    }

    /// Fill a missing row standard from this table
    pub fn fill(&self, key: &SeriesKey, mut record: OperationRecord) -> OperationRecord {
        if record.standard_sec.is_none() {
            let standard = self.lookup(key);
            record.standard_sec = Some(standard);
            record.saved_sec = standard - record.duration_actual_sec;
        }
        record
    }
}

impl RawRecord for SavedPoint {
    fn to_record(&self) -> OperationRecord {
        OperationRecord {
            airline: self.airline.trim().to_string(),
            saved_sec: self.saved_sec,
            samples: 1,
            ..Default::default()
        }
    }
}

impl RawRecord for WorkerProcessRow {
    fn to_record(&self) -> OperationRecord {
        OperationRecord {
            airline: self.airline.trim().to_string(),
            process: self.process.as_deref().and_then(Process::from_label),
            role_label: non_empty(&self.process),
            worker: Worker::new(self.member_srl, self.member_name.clone()),
            samples: self.aircraft_cnt,
            ..Default::default()
        }
    }
}

impl RawRecord for SpeedRow {
    fn to_record(&self) -> OperationRecord {
        let role_label = non_empty(&self.role_label);
        let process = match self.process.as_deref().and_then(Process::from_label) {
            Some(process) => Some(process),
            None => role_label.as_deref().and_then(process_for_role),
        };
        OperationRecord {
            airline: derive_airline(self.airline.as_deref(), self.flight_title.as_deref()),
            process,
            role_label,
            flight_title: non_empty(&self.flight_title),
            worker: Worker::new(self.member_srl, self.member_name.clone()),
            date: self.date.as_deref().and_then(parse_day),
            duration_actual_sec: self.time_sec,
            samples: 1,
            ..Default::default()
        }
    }
}

impl RawRecord for KeyedRow<'_, AircraftDay> {
    fn to_record(&self) -> OperationRecord {
        let row = self.row;
        let saved_sec = row
            .standard_sec
            .map(|standard| standard - row.avg_actual_sec)
            .unwrap_or(0.0);
        OperationRecord {
            airline: self.key.primary().to_string(),
            aircraft_type: self.key.secondary().to_string(),
            date: row.yyyymmdd.as_deref().and_then(parse_day),
            duration_actual_sec: row.avg_actual_sec,
            standard_sec: row.standard_sec,
            saved_sec,
            samples: row.n,
            duration_min_sec: row.min_actual_sec,
            duration_max_sec: row.max_actual_sec,
            ..Default::default()
        }
    }
}

impl RawRecord for KeyedRow<'_, ProcessDay> {
    fn to_record(&self) -> OperationRecord {
        let row = self.row;
        let per_member_sec = match row.sum_sec {
            Some(sum) if row.members > 0 => sum / row.members as f64,
            _ => row.avg_min * 60.0,
        };
        OperationRecord {
            airline: self.key.primary().to_string(),
            process: Process::from_label(self.key.secondary()),
            role_label: Some(self.key.secondary().to_string()),
            date: row.yyyymmdd.as_deref().and_then(parse_day),
            duration_actual_sec: per_member_sec,
            samples: row.members,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 1);
        assert_eq!(parse_day("20251201"), expected);
        assert_eq!(parse_day("2025-12-01"), expected);
        assert_eq!(parse_day("2025-12-01 08:30:00"), expected);
        assert_eq!(parse_day("20251301"), None);
        assert_eq!(parse_day("2025"), None);
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("소닉소닉소닉"), None);
    }

    #[test]
    fn test_derive_airline_fallback() {
        assert_eq!(derive_airline(Some("RF"), Some("HH123")), "RF");
        assert_eq!(derive_airline(None, Some("HH123")), "HH");
        assert_eq!(derive_airline(Some(""), Some("8M701")), "8M");
        assert_eq!(derive_airline(None, None), "");
        assert_eq!(derive_airline(None, Some("H")), "H");
    }

    #[test]
    fn test_speed_row_without_airline_uses_flight_title() {
        let row = SpeedRow {
            flight_title: Some("HH123".to_string()),
            role_label: Some("x".to_string()),
            ..Default::default()
        };
        let record = normalize(&row);
        assert_eq!(record.airline, "HH");
        assert_eq!(record.duration_actual_sec, 0.0);
        assert_eq!(record.samples, 1);
    }

    #[test]
    fn test_process_for_role() {
        assert_eq!(process_for_role("소닉3"), Some(Process::Sonic));
        assert_eq!(process_for_role("소닉백업존2"), Some(Process::Sonic));
        assert_eq!(process_for_role("라바백업"), Some(Process::Lava));
        assert_eq!(process_for_role("로보캅"), Some(Process::Robocop));
        assert_eq!(process_for_role("  "), None);
    }

    #[test]
    fn test_speed_row_process_prefers_explicit_label() {
        let row = SpeedRow {
            role_label: Some("소닉2".to_string()),
            process: Some("라바".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize(&row).process, Some(Process::Lava));

        let row = SpeedRow {
            role_label: Some("소닉2".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize(&row).process, Some(Process::Sonic));
    }

    #[test]
    fn test_worker_row_keeps_unrecognized_process_as_none() {
        let row = WorkerProcessRow {
            airline: "RF".to_string(),
            member_srl: Some(11),
            member_name: None,
            process: Some("기타".to_string()),
            aircraft_cnt: 4,
        };
        let record = normalize(&row);
        assert_eq!(record.process, None);
        assert_eq!(record.airline, "RF");
        assert_eq!(record.samples, 4);
        assert_eq!(record.worker.display_name(), "11");
    }

    #[test]
    fn test_aircraft_day_derives_saved_time() {
        let key = SeriesKey::new("HH", "A321").unwrap();
        let row = AircraftDay {
            yyyymmdd: Some("20251203".to_string()),
            avg_actual_sec: 900.0,
            min_actual_sec: Some(700.0),
            max_actual_sec: Some(1100.0),
            standard_sec: Some(1000.0),
            n: 4,
        };
        let record = normalize(&KeyedRow { key: &key, row: &row });
        assert_eq!(record.aircraft_type, "A321");
        assert_eq!(record.saved_sec, 100.0);
        assert_eq!(record.samples, 4);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 12, 3));
    }

    #[test]
    fn test_standard_times_fill_missing_standard() {
        let table: StandardTimes = serde_json::from_str(
            r#"{"default_standard_sec": 1200, "by_airline_aircraft": {"HH|A321": 900}}"#,
        )
        .unwrap();
        let key = SeriesKey::new("HH", "A321").unwrap();
        let other = SeriesKey::new("RF", "B737").unwrap();
        assert_eq!(table.lookup(&key), 900.0);
        assert_eq!(table.lookup(&other), 1200.0);

        let row = AircraftDay {
            yyyymmdd: Some("20251203".to_string()),
            avg_actual_sec: 1000.0,
            min_actual_sec: None,
            max_actual_sec: None,
            standard_sec: None,
            n: 1,
        };
        let record = table.fill(&key, normalize(&KeyedRow { key: &key, row: &row }));
        assert_eq!(record.standard_sec, Some(900.0));
        assert_eq!(record.saved_sec, -100.0);
    }

    #[test]
    fn test_process_day_prefers_exact_sum() {
        let key = SeriesKey::new("RF", "라바").unwrap();
        let row = ProcessDay {
            yyyymmdd: Some("20251201".to_string()),
            avg_min: 3.33,
            members: 3,
            sum_sec: Some(600.0),
        };
        let record = normalize(&KeyedRow { key: &key, row: &row });
        assert_eq!(record.duration_actual_sec, 200.0);
        assert_eq!(record.process, Some(Process::Lava));
        assert_eq!(record.standard_sec, None);

        let row = ProcessDay { sum_sec: None, ..row };
        let record = normalize(&KeyedRow { key: &key, row: &row });
        assert!((record.duration_actual_sec - 199.8).abs() < 1e-9);
    }
}
