//! View-models consumed by the dashboard renderer
//!
//! Each section has its own builder that takes the already-loaded documents
//! plus the active filter (airline tab, worker filter). Switching a tab means
//! calling one builder again; nothing here holds state between calls.

use crate::aggregate::{aggregate, pivot, GroupAggregate, GroupOrder, PivotTable};
use crate::data::{
    AircraftListDocument, CountsDocument, DashboardDocuments, OperationRecord,
    SavedPointsDocument, SavedStatsDocument, SeriesKey, SpeedRowsDocument, WorkerCountsDocument,
};
use crate::format::{chart_id, compact_day, fmt_min, iso_day, minutes, sec_to_mmss};
use crate::normalize::{normalize, normalize_all, KeyedRow, StandardTimes};
use crate::ranking::rank;
use crate::registry::{color_of, CategorySet, Domain, Process, AIRLINE_ORDER, DEFAULT_COLOR};
use crate::series::{align, highlight_extrema, period_average, Marker};
use serde::Serialize;
use std::collections::HashMap;

/// Text of every empty panel
pub const NO_DATA: &str = "데이터 없음";

/// Worker filter that selects every airline
pub const ALL_AIRLINES: &str = "ALL";

pub const OVER_STANDARD_COLOR: &str = "#E05A4F";
pub const WITHIN_STANDARD_COLOR: &str = "#B2C6D3";
pub const STANDARD_LINE_COLOR: &str = "#0459A5";
pub const MAX_MARKER_COLOR: &str = "#ecab86";
pub const MIN_MARKER_COLOR: &str = "#69C6DD";
pub const SPEED_BAR_COLOR: &str = "#69C6DD";

/// Content of a card or tab: either ready to draw or a "no data" message
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Empty { message: String },
}

impl<T> Panel<T> {
    pub fn empty(message: impl Into<String>) -> Self {
        Panel::Empty {
            message: message.into(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Empty { .. } => None,
        }
    }
}

/// A titled chart slot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Card<T> {
    /// DOM id of the chart element
    pub id: String,
    pub title: String,
    pub panel: Panel<T>,
}

// ---------------------------------------------------------------------------
// Section 1: counts and saved time
// ---------------------------------------------------------------------------

/// One donut slice
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// Cleaning counts per airline
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountsView {
    pub title: String,
    /// Registry order, absent airlines as zero
    pub slices: Vec<Slice>,
    pub total: f64,
}

/// Saved-time distribution of one airline
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SavedBox {
    pub airline: String,
    pub color: &'static str,
    /// Saved time of every point, in minutes
    pub minutes: Vec<f64>,
    /// Reduction over the points, in seconds
    pub aggregate: GroupAggregate<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SavedTimeView {
    /// Card title, with the stats line appended
    pub title: String,
    pub boxes: Vec<SavedBox>,
    /// `HH: 평균 1.5분 (n=3) · RF: ...`
    pub stats_line: String,
}

pub fn build_counts(doc: &CountsDocument) -> CountsView {
    let groups = aggregate(
        &doc.airlines,
        |c| c.code.trim().to_string(),
        |c| Some(c.count),
        &GroupOrder::registry(Domain::Airline),
    );

    let slices: Vec<Slice> = groups
        .into_iter()
        .map(|g| Slice {
            color: color_of(&g.key),
            value: g.sum,
            label: g.key,
        })
        .collect();

    CountsView {
        title: format!("항공사별 청소건수 (기간: {} ~ {})", doc.range.from, doc.range.to),
        total: slices.iter().map(|s| s.value).sum(),
        slices,
    }
}

pub fn build_saved_time(points: &SavedPointsDocument, stats: &SavedStatsDocument) -> SavedTimeView {
    let records = normalize_all(&points.points);
    let groups = aggregate(
        &records,
        |r| r.airline.clone(),
        |r| Some(r.saved_sec),
        &GroupOrder::registry(Domain::Airline),
    );

    let boxes = groups
        .into_iter()
        .map(|g| SavedBox {
            color: color_of(&g.key),
            minutes: records
                .iter()
                .filter(|r| r.airline == g.key)
                .map(|r| minutes(r.saved_sec))
                .collect(),
            airline: g.key.clone(),
            aggregate: g,
        })
        .collect();

    let stats_line = stats_line(stats);
    SavedTimeView {
        title: format!("표준 대비 절감시간 분포 (분) — {}", stats_line),
        boxes,
        stats_line,
    }
}

/// Registry-ordered stats summary; airlines without a stats entry are omitted
pub fn stats_line(stats: &SavedStatsDocument) -> String {
    AIRLINE_ORDER
        .iter()
        .filter_map(|code| stats.stats.iter().find(|s| s.code.trim() == *code))
        .map(|s| format!("{}: 평균 {} (n={})", s.code.trim(), fmt_min(s.avg_saved_sec), s.n))
        .collect::<Vec<_>>()
        .join(" · ")
}

// ---------------------------------------------------------------------------
// Section 2: aircraft and process series
// ---------------------------------------------------------------------------

/// One day of an aircraft-type series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AircraftBar {
    pub day: String,
    pub minutes: f64,
    pub color: &'static str,
    pub exceeds_standard: bool,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AircraftChart {
    pub bars: Vec<AircraftBar>,
    /// Horizontal standard line, in minutes
    pub standard_minutes: Option<f64>,
    pub standard_label: String,
    pub standard_color: &'static str,
}

/// One day of a process series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessBar {
    pub day: String,
    pub minutes: f64,
    pub marker: Marker,
    pub color: &'static str,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessChart {
    pub bars: Vec<ProcessBar>,
    /// Period-average overlay, in minutes
    pub average_minutes: Option<f64>,
    pub average_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AircraftCards {
    pub aircraft: Vec<Card<AircraftChart>>,
    pub processes: Vec<Card<ProcessChart>>,
}

/// Section 2 content of one airline tab
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AircraftTab {
    pub airline: String,
    pub panel: Panel<AircraftCards>,
}

/// Records of every well-formed key in `series`; keys without a single `|`
/// are skipped
fn keyed_records<R>(
    series: &HashMap<String, Vec<R>>,
    to_record: impl Fn(&SeriesKey, &R) -> OperationRecord,
) -> Vec<OperationRecord> {
    let mut raw_keys: Vec<&String> = series.keys().collect();
    raw_keys.sort();

    let mut records = Vec::new();
    for raw_key in raw_keys {
        match SeriesKey::parse(raw_key) {
            Ok(key) => records.extend(series[raw_key].iter().map(|row| to_record(&key, row))),
            Err(e) => tracing::debug!("Skipped series: {}", e),
        }
    }
    records
}

/// Fill standards missing from aircraft rows, from the aircraft list first and
/// the standard-time table second
fn fill_standards(
    records: &mut [OperationRecord],
    list: &AircraftListDocument,
    standards: Option<&StandardTimes>,
) {
    for record in records.iter_mut().filter(|r| r.standard_sec.is_none()) {
        let listed = list
            .aircraft_by_airline
            .get(&record.airline)
            .and_then(|entries| entries.iter().find(|e| e.aircraft == record.aircraft_type))
            .and_then(|e| e.standard_sec);

        if let Some(standard) = listed {
            record.standard_sec = Some(standard);
            record.saved_sec = standard - record.duration_actual_sec;
        } else if let Some(table) = standards {
            if let Ok(key) = SeriesKey::new(record.airline.as_str(), record.aircraft_type.as_str()) {
                *record = table.fill(&key, std::mem::take(record));
            }
        }
    }
}

fn aircraft_chart(records: &[OperationRecord], airline: &str, aircraft: &str) -> Panel<AircraftChart> {
    let entity = (airline.to_string(), aircraft.to_string());
    let series = align(records, &entity, |r| (r.airline.clone(), r.aircraft_type.clone()));
    if series.is_empty() {
        return Panel::empty(NO_DATA);
    }

    let bars = series
        .points
        .iter()
        .map(|p| AircraftBar {
            day: iso_day(p.day),
            minutes: minutes(p.actual_sec),
            color: if p.exceeds_standard {
                OVER_STANDARD_COLOR
            } else {
                WITHIN_STANDARD_COLOR
            },
            exceeds_standard: p.exceeds_standard,
            hover: vec![
                format!("날짜: {}", compact_day(p.day)),
                format!("평균: {}", sec_to_mmss(Some(p.actual_sec))),
                format!("최단: {}", sec_to_mmss(p.min_actual_sec)),
                format!("최장: {}", sec_to_mmss(p.max_actual_sec)),
                format!("n={}", p.count_of_samples),
            ],
        })
        .collect();

    Panel::Ready(AircraftChart {
        bars,
        standard_minutes: series.standard_sec.map(minutes),
        standard_label: format!("표준: {}", sec_to_mmss(series.standard_sec)),
        standard_color: STANDARD_LINE_COLOR,
    })
}

fn marker_color(marker: Marker) -> &'static str {
    match marker {
        Marker::Max => MAX_MARKER_COLOR,
        Marker::Min => MIN_MARKER_COLOR,
        Marker::Default => DEFAULT_COLOR,
    }
}

fn process_chart(records: &[OperationRecord], airline: &str, process: Process) -> Panel<ProcessChart> {
    let entity = (airline.to_string(), Some(process));
    let series = align(records, &entity, |r| (r.airline.clone(), r.process));
    if series.is_empty() {
        return Panel::empty(NO_DATA);
    }

    let values: Vec<f64> = series.values().into_iter().map(minutes).collect();
    let markers = highlight_extrema(&values);
    let average = period_average(&values);

    let bars = series
        .points
        .iter()
        .zip(values.iter().zip(markers))
        .map(|(p, (&value, marker))| ProcessBar {
            day: iso_day(p.day),
            minutes: value,
            marker,
            color: marker_color(marker),
            hover: vec![
                format!("날짜: {}", compact_day(p.day)),
                format!("평균(1인): {}", sec_to_mmss(Some(p.actual_sec))),
                format!("인원: {}명", p.count_of_samples),
                format!("총합: {}", sec_to_mmss(Some(p.sum_sec))),
            ],
        })
        .collect();

    Panel::Ready(ProcessChart {
        bars,
        average_minutes: average,
        average_label: average.map(|avg| format!("평균 {}", sec_to_mmss(Some(avg * 60.0)))),
    })
}

/// Build the section 2 tab of `airline`
pub fn build_aircraft_tab(
    docs: &DashboardDocuments,
    airline: &str,
    standards: Option<&StandardTimes>,
) -> AircraftTab {
    let entries = docs
        .aircraft_list
        .aircraft_by_airline
        .get(airline)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if entries.is_empty() {
        return AircraftTab {
            airline: airline.to_string(),
            panel: Panel::empty(NO_DATA),
        };
    }

    let mut aircraft_records = keyed_records(&docs.aircraft_series.series, |key, row| {
        normalize(&KeyedRow { key, row })
    });
    fill_standards(&mut aircraft_records, &docs.aircraft_list, standards);
    let process_records = keyed_records(&docs.process_series.series, |key, row| {
        normalize(&KeyedRow { key, row })
    });

    let aircraft = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| Card {
            id: chart_id(&["s2_chart", airline, entry.aircraft.as_str(), idx.to_string().as_str()]),
            title: format!("{} · 작업타입: {} (n={})", airline, entry.aircraft, entry.n),
            panel: aircraft_chart(&aircraft_records, airline, &entry.aircraft),
        })
        .collect();

    let processes = Process::ALL
        .iter()
        .enumerate()
        .map(|(idx, process)| Card {
            id: chart_id(&["s2_proc", airline, process.label(), idx.to_string().as_str()]),
            title: format!("{} · 공정: {}", airline, process),
            panel: process_chart(&process_records, airline, *process),
        })
        .collect();

    AircraftTab {
        airline: airline.to_string(),
        panel: Panel::Ready(AircraftCards {
            aircraft,
            processes,
        }),
    }
}

// ---------------------------------------------------------------------------
// Section 3: worker pivot and speed ranking
// ---------------------------------------------------------------------------

/// Per-worker process counts under one filter
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerTable {
    pub filter: String,
    /// Tab label (`전체` for every airline)
    pub label: String,
    pub panel: Panel<PivotTable>,
}

/// Worker filters in tab order
pub fn worker_filters() -> Vec<&'static str> {
    std::iter::once(ALL_AIRLINES).chain(AIRLINE_ORDER).collect()
}

pub fn build_worker_table(doc: &WorkerCountsDocument, filter: &str) -> WorkerTable {
    let label = if filter == ALL_AIRLINES {
        "전체".to_string()
    } else {
        filter.to_string()
    };

    let records: Vec<OperationRecord> = normalize_all(&doc.rows)
        .into_iter()
        .filter(|r| filter == ALL_AIRLINES || r.airline == filter)
        .collect();

    let panel = if records.is_empty() {
        Panel::empty(NO_DATA)
    } else {
        Panel::Ready(pivot(
            &records,
            |r| (r.worker.key(), r.worker.display_name()),
            |r| r.process.map(|p| p.label().to_string()),
            |r| r.samples,
            &CategorySet::of(Domain::Process),
        ))
    };

    WorkerTable {
        filter: filter.to_string(),
        label,
        panel,
    }
}

/// One actor's bar in a speed chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeedBar {
    pub rank: usize,
    pub name: String,
    pub minutes: f64,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeedChart {
    pub role: String,
    pub color: &'static str,
    /// Fastest first
    pub bars: Vec<SpeedBar>,
}

/// Section 3 speed rankings of one airline tab
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeedTab {
    pub airline: String,
    pub panel: Panel<Vec<Card<SpeedChart>>>,
}

pub fn build_speed_tab(doc: &SpeedRowsDocument, airline: &str) -> SpeedTab {
    let records = normalize_all(&doc.rows);
    let panel = speed_panel(&records, airline);
    SpeedTab {
        airline: airline.to_string(),
        panel,
    }
}

fn speed_panel(records: &[OperationRecord], airline: &str) -> Panel<Vec<Card<SpeedChart>>> {
    if !records.iter().any(|r| r.airline == airline) {
        return Panel::empty(format!("{} — {}", airline, NO_DATA));
    }

    let groups = rank(
        records,
        |r| r.role_label.as_deref(),
        |r| r.airline == airline,
        |r| Some(r.duration_actual_sec),
    );
    if groups.is_empty() {
        return Panel::empty(format!("{} — role_label {}", airline, NO_DATA));
    }

    let cards = groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| {
            let bars = group
                .entries
                .iter()
                .map(|e| {
                    let avg = e.avg_metric_sec.unwrap_or(0.0);
                    let sample_day = e.sample.date.map(iso_day).unwrap_or_default();
                    let sample_flight = e.sample.flight_title.clone().unwrap_or_default();
                    SpeedBar {
                        rank: e.rank,
                        name: e.actor_name.clone(),
                        minutes: minutes(avg),
                        hover: vec![
                            e.actor_name.clone(),
                            format!("샘플: {} {}", sample_day, sample_flight),
                            format!("샘플 time_sec: {}초", e.sample.duration_actual_sec),
                            format!("평균: {:.2}분", minutes(avg)),
                            format!("건수: {}건", e.sample_count),
                            format!("time합: {}", sec_to_mmss(Some(e.sum_metric_sec))),
                        ],
                    }
                })
                .collect();

            Card {
                id: chart_id(&["s3_speed", airline, group.label.as_str(), idx.to_string().as_str()]),
                title: format!("{} · {}", airline, group.label),
                panel: Panel::Ready(SpeedChart {
                    role: group.label,
                    color: SPEED_BAR_COLOR,
                    bars,
                }),
            }
        })
        .collect();

    Panel::Ready(cards)
}

// ---------------------------------------------------------------------------
// Whole dashboard
// ---------------------------------------------------------------------------

/// Every view-model of one render cycle
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub counts: CountsView,
    pub saved_time: SavedTimeView,
    pub aircraft_tabs: Vec<AircraftTab>,
    pub worker_tables: Vec<WorkerTable>,
    pub speed_tabs: Vec<SpeedTab>,
}

impl Dashboard {
    /// Assemble every section, every tab
    pub fn assemble(docs: &DashboardDocuments) -> Self {
        Self::assemble_with_standards(docs, None)
    }

    /// Like [`Dashboard::assemble`], filling aircraft standards the documents
    /// leave out from `standards`
    pub fn assemble_with_standards(
        docs: &DashboardDocuments,
        standards: Option<&StandardTimes>,
    ) -> Self {
        let aircraft_tabs = AIRLINE_ORDER
            .iter()
            .map(|airline| build_aircraft_tab(docs, airline, standards))
            .collect();

        let speed_records = normalize_all(&docs.speed_rows.rows);

        Self {
            counts: build_counts(&docs.counts),
            saved_time: build_saved_time(&docs.saved_points, &docs.saved_stats),
            aircraft_tabs,
            worker_tables: worker_filters()
                .into_iter()
                .map(|filter| build_worker_table(&docs.worker_counts, filter))
                .collect(),
            speed_tabs: AIRLINE_ORDER
                .iter()
                .map(|airline| SpeedTab {
                    airline: airline.to_string(),
                    panel: speed_panel(&speed_records, airline),
                })
                .collect(),
        }
    }

    /// Markdown summary of the dashboard
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", self.counts.title));
        out.push_str("| 항공사 | 청소건수 |\n|---|---:|\n");
        for slice in &self.counts.slices {
            out.push_str(&format!("| {} | {} |\n", slice.label, slice.value));
        }
        out.push_str(&format!("| 합계 | {} |\n\n", self.counts.total));

        if !self.saved_time.stats_line.is_empty() {
            out.push_str(&format!("**절감시간** {}\n\n", self.saved_time.stats_line));
        }

        out.push_str("## 작업타입별 표준 초과\n\n");
        for tab in &self.aircraft_tabs {
            let Some(cards) = tab.panel.ready() else {
                out.push_str(&format!("- {}: {}\n", tab.airline, NO_DATA));
                continue;
            };
            for card in &cards.aircraft {
                match card.panel.ready() {
                    Some(chart) => {
                        let over = chart.bars.iter().filter(|b| b.exceeds_standard).count();
                        out.push_str(&format!(
                            "- {}: {}/{}일 초과\n",
                            card.title,
                            over,
                            chart.bars.len()
                        ));
                    }
                    None => out.push_str(&format!("- {}: {}\n", card.title, NO_DATA)),
                }
            }
        }
        out.push('\n');

        out.push_str("## 작업자별 공정 수행\n\n");
        for table in &self.worker_tables {
            let top = table
                .panel
                .ready()
                .and_then(|t| t.rows.first())
                .map(|row| format!("{} ({}건)", row.label, row.total))
                .unwrap_or_else(|| NO_DATA.to_string());
            out.push_str(&format!("- {}: {}\n", table.label, top));
        }
        out.push('\n');

        out.push_str("## 작업 속도 1위\n\n");
        for tab in &self.speed_tabs {
            match &tab.panel {
                Panel::Ready(cards) => {
                    for card in cards {
                        let fastest = card
                            .panel
                            .ready()
                            .and_then(|chart| chart.bars.first())
                            .map(|bar| format!("{} ({:.2}분)", bar.name, bar.minutes))
                            .unwrap_or_else(|| NO_DATA.to_string());
                        out.push_str(&format!("- {}: {}\n", card.title, fastest));
                    }
                }
                Panel::Empty { message } => out.push_str(&format!("- {}\n", message)),
            }
        }

        out
    }
}
