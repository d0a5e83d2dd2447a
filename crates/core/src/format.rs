//! Display formatting for durations, days and chart element ids

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Seconds as `"12분 05초"`; `"-"` when missing or not a number
pub fn sec_to_mmss(sec: Option<f64>) -> String {
    let Some(sec) = sec.filter(|s| s.is_finite()) else {
        return "-".to_string();
    };
    let total = sec.round() as i64;
    let minutes = total.div_euclid(60);
    let seconds = total.rem_euclid(60);
    format!("{}분 {:02}초", minutes, seconds)
}

/// Seconds as minutes with one decimal, e.g. `"3.5분"`
pub fn fmt_min(sec: f64) -> String {
    format!("{:.1}분", sec / 60.0)
}

/// Seconds to minutes
pub fn minutes(sec: f64) -> f64 {
    sec / 60.0
}

/// `2025-12-01`
pub fn iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// `20251201`
pub fn compact_day(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").expect("static pattern is valid"))
}

/// DOM-safe element id: every character outside `[a-zA-Z0-9_]` becomes `_`
pub fn chart_id(parts: &[&str]) -> String {
    id_regex().replace_all(&parts.join("_"), "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sec_to_mmss() {
        assert_eq!(sec_to_mmss(Some(725.0)), "12분 05초");
        assert_eq!(sec_to_mmss(Some(59.6)), "1분 00초");
        assert_eq!(sec_to_mmss(Some(0.0)), "0분 00초");
        assert_eq!(sec_to_mmss(None), "-");
        assert_eq!(sec_to_mmss(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_negative_seconds_floor_like_minutes() {
        assert_eq!(sec_to_mmss(Some(-30.0)), "-1분 30초");
    }

    #[test]
    fn test_fmt_min() {
        assert_eq!(fmt_min(90.0), "1.5분");
        assert_eq!(fmt_min(-120.0), "-2.0분");
    }

    #[test]
    fn test_days() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(iso_day(day), "2025-01-09");
        assert_eq!(compact_day(day), "20250109");
    }

    #[test]
    fn test_chart_id_replaces_each_character() {
        assert_eq!(chart_id(&["s2", "HH", "A321-200", "0"]), "s2_HH_A321_200_0");
        assert_eq!(chart_id(&["s2_proc", "RF", "소닉", "1"]), "s2_proc_RF____1");
    }
}
