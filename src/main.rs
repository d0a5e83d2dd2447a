//! turnaround-dash CLI - Ground-turnaround dashboard generator
//!
//! Loads the dashboard documents, assembles the view-models and writes a
//! static HTML dashboard, a JSON export or a text summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

use turnaround_core::{Dashboard, Panel, StandardTimes};
use turnaround_dash::{
    html::{self, DashboardConfig},
    loader::{self, DocumentLoader, DocumentSource},
};

/// turnaround-dash: Airline ground-turnaround dashboard
#[derive(Parser, Debug)]
#[command(name = "turnaround-dash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the HTML dashboard
    Render(RenderArgs),

    /// Write the assembled view-models as JSON
    Export(ExportArgs),

    /// Print a summary of the dashboard
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Directory or base URL holding the JSON documents
    #[arg(short, long, env = "TURNAROUND_DATA", value_name = "DIR|URL")]
    data: String,

    /// Standard-time table used for aircraft rows without a standard
    #[arg(long, value_name = "FILE")]
    standards: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory for dashboard
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Dashboard title
    #[arg(long, default_value = "Turnaround Dashboard")]
    title: String,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Markdown,
    Text,
    Json,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    format: SummaryFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => render_command(args).await,
        Commands::Export(args) => export_command(args).await,
        Commands::Summary(args) => summary_command(args).await,
    }
}

/// Load every document and assemble the dashboard
async fn load_dashboard(args: &SourceArgs) -> Result<Dashboard> {
    let source = DocumentSource::parse(&args.data)
        .with_context(|| format!("Invalid data source: {}", args.data))?;
    let loader = DocumentLoader::new(source)?;

    let docs = loader
        .load_all()
        .await
        .with_context(|| format!("Failed to load documents from {}", loader.source()))?;

    let standards: Option<StandardTimes> = match &args.standards {
        Some(path) => Some(
            loader::load_standards(path)
                .await
                .with_context(|| format!("Failed to load standard times: {:?}", path))?,
        ),
        None => None,
    };

    let dashboard = Dashboard::assemble_with_standards(&docs, standards.as_ref());

    debug!(
        "Assembled {} aircraft tabs, {} worker tables, {} speed tabs",
        dashboard.aircraft_tabs.len(),
        dashboard.worker_tables.len(),
        dashboard.speed_tabs.len()
    );

    Ok(dashboard)
}

/// Generate dashboard
async fn render_command(args: RenderArgs) -> Result<()> {
    info!("Generating dashboard");

    let dashboard = load_dashboard(&args.source).await?;

    let config = DashboardConfig {
        title: args.title,
        output_dir: args.output_dir.to_string_lossy().to_string(),
    };

    let base_path = std::env::current_dir()?;
    html::write_dashboard(&dashboard, &config, &base_path)
        .with_context(|| "Failed to generate dashboard")?;

    info!("Dashboard generated at {:?}", args.output_dir.join("index.html"));

    Ok(())
}

/// Export view-models as JSON
async fn export_command(args: ExportArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.source).await?;
    let json = serde_json::to_string_pretty(&dashboard)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write export file: {:?}", path))?;
            info!("Exported dashboard to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Print a summary
async fn summary_command(args: SummaryArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.source).await?;

    match args.format {
        SummaryFormat::Json => {
            let output = serde_json::json!({
                "title": dashboard.counts.title,
                "counts": dashboard.counts.slices,
                "total": dashboard.counts.total,
                "saved_stats": dashboard.saved_time.stats_line,
                "speed_leaders": speed_leaders(&dashboard),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        SummaryFormat::Markdown => {
            println!("{}", dashboard.summary());
        }
        SummaryFormat::Text => {
            println!("{}", dashboard.counts.title);
            for slice in &dashboard.counts.slices {
                println!("  {}: {}", slice.label, slice.value);
            }
            if !dashboard.saved_time.stats_line.is_empty() {
                println!("  {}", dashboard.saved_time.stats_line);
            }
            for (title, name, minutes) in speed_leaders(&dashboard) {
                println!("  {} → {} ({:.2}분)", title, name, minutes);
            }
        }
    }

    Ok(())
}

/// Fastest actor of every ranking card
fn speed_leaders(dashboard: &Dashboard) -> Vec<(String, String, f64)> {
    dashboard
        .speed_tabs
        .iter()
        .filter_map(|tab| match &tab.panel {
            Panel::Ready(cards) => Some(cards),
            Panel::Empty { .. } => None,
        })
        .flatten()
        .filter_map(|card| {
            let chart = card.panel.ready()?;
            let bar = chart.bars.first()?;
            Some((card.title.clone(), bar.name.clone(), bar.minutes))
        })
        .collect()
}
