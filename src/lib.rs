//! turnaround-dash - Static dashboard for airline ground-turnaround operations
//!
//! This library loads the eight dashboard documents, assembles their
//! view-models with [`turnaround_core`] and renders them to a static HTML page.
//!
//! # Features
//!
//! - Load documents from a local directory or an HTTP base URL
//! - Assemble counts, saved-time, series, pivot and ranking view-models
//! - Generate HTML dashboards with Chart.js
//!
//! # Example
//!
//! ```no_run
//! use turnaround_dash::{html, loader};
//! use turnaround_core::Dashboard;
//!
//! # async fn run() -> turnaround_dash::Result<()> {
//! let source = loader::DocumentSource::parse("web/data")?;
//! let docs = loader::DocumentLoader::new(source)?.load_all().await?;
//!
//! let dashboard = Dashboard::assemble(&docs);
//! println!("{}", dashboard.summary());
//!
//! html::write_dashboard(&dashboard, &html::DashboardConfig::default(), ".".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod html;
pub mod loader;

pub use error::{Error, Result};
