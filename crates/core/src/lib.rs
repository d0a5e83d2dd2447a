//! turnaround-core - Aggregation and view-model transforms for the
//! turnaround dashboard
//!
//! This crate is pure and synchronous: it takes already-parsed documents and
//! produces the ordered, annotated structures the dashboard draws.
//!
//! # Features
//!
//! - Fixed airline and process vocabularies with display colors
//! - Lenient decoding and normalization of raw document rows
//! - Keyed aggregation with registry zero-fill and pivot tables
//! - Daily series alignment against a standard time
//! - Per-actor speed rankings
//! - View-models for every dashboard section

pub mod aggregate;
pub mod data;
pub mod error;
pub mod format;
pub mod lenient;
pub mod normalize;
pub mod ranking;
pub mod registry;
pub mod series;
pub mod view;

pub use aggregate::{aggregate, pivot, Field, GroupAggregate, GroupOrder, PivotRow, PivotTable};
pub use data::{DashboardDocuments, OperationRecord, SeriesKey, Worker};
pub use error::{Error, Result};
pub use normalize::{normalize, normalize_all, RawRecord, StandardTimes};
pub use ranking::{rank, rank_actors, RankedEntry, RankedGroup};
pub use registry::{color_of, ordered_codes, CategorySet, Domain, Process};
pub use series::{align, highlight_extrema, period_average, AlignedSeries, AlignedSeriesPoint, Marker};
pub use view::{Dashboard, Panel};
