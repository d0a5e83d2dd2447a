//! Fetching the dashboard documents from a directory or an HTTP base URL

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};
use turnaround_core::data::{
    AircraftListDocument, AircraftSeriesDocument, CountsDocument, DashboardDocuments,
    ProcessSeriesDocument, SavedPointsDocument, SavedStatsDocument, SpeedRowsDocument,
    WorkerCountsDocument,
};
use turnaround_core::StandardTimes;
use url::Url;

/// Where the documents live
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Dir(PathBuf),
    /// Base URL, always ending in `/`
    Url(Url),
}

impl DocumentSource {
    /// `http://` and `https://` strings are URLs, anything else a directory
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let mut url = Url::parse(raw)?;
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            Ok(DocumentSource::Url(url))
        } else {
            Ok(DocumentSource::Dir(PathBuf::from(raw)))
        }
    }
}

impl FromStr for DocumentSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Dir(path) => write!(f, "{}", path.display()),
            DocumentSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// The eight documents of a render cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Counts,
    SavedPoints,
    SavedStats,
    AircraftList,
    AircraftSeries,
    ProcessSeries,
    WorkerCounts,
    SpeedRows,
}

impl DocumentKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Counts => "section1_counts.json",
            Self::SavedPoints => "section1_saved_points.json",
            Self::SavedStats => "section1_saved_stats.json",
            Self::AircraftList => "section2_aircraft_list.json",
            Self::AircraftSeries => "section2_aircraft_timeseries.json",
            Self::ProcessSeries => "section2_process_timeseries.json",
            Self::WorkerCounts => "section3_worker_process_counts.json",
            Self::SpeedRows => "section3_speed_rows.json",
        }
    }
}

/// Loads documents from one [`DocumentSource`]
pub struct DocumentLoader {
    source: DocumentSource,
    client: reqwest::Client,
}

impl DocumentLoader {
    pub fn new(source: DocumentSource) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("turnaround-dash"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self { source, client })
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// URL of a document under a URL source
    pub fn document_url(base: &Url, name: &str) -> Result<Url> {
        Ok(base.join(name)?)
    }

    async fn read_text(&self, name: &str) -> Result<String> {
        match &self.source {
            DocumentSource::Dir(dir) => Ok(tokio::fs::read_to_string(dir.join(name)).await?),
            DocumentSource::Url(base) => {
                let url = Self::document_url(base, name)?;
                let text = self
                    .client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(text)
            }
        }
    }

    /// Read and parse one document by file name
    pub async fn fetch<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        debug!("Fetching {} from {}", name, self.source);

        let text = self.read_text(name).await.map_err(|e| e.in_document(name))?;
        serde_json::from_str(&text).map_err(|source| Error::InvalidDocumentError {
            name: name.to_string(),
            source,
        })
    }

    pub async fn fetch_kind<T: DeserializeOwned>(&self, kind: DocumentKind) -> Result<T> {
        self.fetch(kind.file_name()).await
    }

    /// Fetch all eight documents concurrently; the first failure aborts the
    /// whole load
    pub async fn load_all(&self) -> Result<DashboardDocuments> {
        info!("Loading dashboard documents from {}", self.source);

        let (
            counts,
            saved_points,
            saved_stats,
            aircraft_list,
            aircraft_series,
            process_series,
            worker_counts,
            speed_rows,
        ) = tokio::try_join!(
            self.fetch_kind::<CountsDocument>(DocumentKind::Counts),
            self.fetch_kind::<SavedPointsDocument>(DocumentKind::SavedPoints),
            self.fetch_kind::<SavedStatsDocument>(DocumentKind::SavedStats),
            self.fetch_kind::<AircraftListDocument>(DocumentKind::AircraftList),
            self.fetch_kind::<AircraftSeriesDocument>(DocumentKind::AircraftSeries),
            self.fetch_kind::<ProcessSeriesDocument>(DocumentKind::ProcessSeries),
            self.fetch_kind::<WorkerCountsDocument>(DocumentKind::WorkerCounts),
            self.fetch_kind::<SpeedRowsDocument>(DocumentKind::SpeedRows),
        )?;

        info!(
            "Loaded {} speed rows, {} worker rows, {} aircraft series",
            speed_rows.rows.len(),
            worker_counts.rows.len(),
            aircraft_series.series.len()
        );

        Ok(DashboardDocuments {
            counts,
            saved_points,
            saved_stats,
            aircraft_list,
            aircraft_series,
            process_series,
            worker_counts,
            speed_rows,
        })
    }
}

/// Read a standard-time table from a local JSON file
pub async fn load_standards(path: &std::path::Path) -> Result<StandardTimes> {
    let name = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::from(e).in_document(&name))?;
    serde_json::from_str(&text).map_err(|source| Error::InvalidDocumentError { name, source })
}
