//! footprint CLI - inspect and publish "Hello, World!" footprint reports

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use footprint::{
    config::{DashboardConfig, SourceConfig, StoreConfig},
    html,
    project,
    report::MetricKind,
    source::AnySource,
    store::ReportStore,
};

/// footprint: binary size and memory usage dashboard
#[derive(Parser, Debug)]
#[command(name = "footprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path of the report index relative to the source
    #[arg(long, global = true, env = "FOOTPRINT_INDEX_PATH", default_value = "reports.json")]
    index_path: String,

    /// Directory of per-timestamp snapshots relative to the source
    #[arg(long, global = true, env = "FOOTPRINT_SNAPSHOT_DIR", default_value = "reports")]
    snapshot_dir: String,

    /// Request timeout in seconds (no timeout if unset)
    #[arg(long, global = true, env = "FOOTPRINT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available report snapshots
    List(SourceArgs),

    /// Print the chart projections of one snapshot
    Show(ShowArgs),

    /// Generate the static HTML dashboard
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Base URL or directory holding the reports
    #[arg(short, long, env = "FOOTPRINT_SOURCE")]
    source: String,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Timestamp key to show
    #[arg(short, long, default_value = "latest")]
    timestamp: String,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory for dashboard
    #[arg(short, long, default_value = "docs")]
    output_dir: PathBuf,

    /// Dashboard title
    #[arg(long, default_value = "Hello, World! Footprint")]
    title: String,
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

    let store_config = StoreConfig {
        index_path: cli.index_path.clone(),
        snapshot_dir: cli.snapshot_dir.clone(),
    };
    let timeout = cli.timeout_secs.map(Duration::from_secs);

    match cli.command {
        Commands::List(args) => list_command(args, store_config, timeout).await,
        Commands::Show(args) => show_command(args, store_config, timeout).await,
        Commands::Render(args) => render_command(args, store_config, timeout).await,
    }
}

async fn open_store(
    args: &SourceArgs,
    store_config: StoreConfig,
    timeout: Option<Duration>,
) -> Result<ReportStore<AnySource>> {
    let source_config = SourceConfig {
        location: args.source.clone(),
        timeout,
    };
    let source = AnySource::from_location(&source_config.location, source_config.timeout)
        .with_context(|| format!("Invalid report source: {}", source_config.location))?;

    let store = ReportStore::new(source, store_config);
    store
        .initialize()
        .await
        .with_context(|| "Failed to load report index")?;
    Ok(store)
}

/// List selectable snapshots
async fn list_command(args: SourceArgs, store_config: StoreConfig, timeout: Option<Duration>) -> Result<()> {
    let store = open_store(&args, store_config, timeout).await?;

    for option in store.options() {
        println!("{:<28} {}", option.value, option.label);
    }

    Ok(())
}

/// Show both metrics of one snapshot
async fn show_command(args: ShowArgs, store_config: StoreConfig, timeout: Option<Duration>) -> Result<()> {
    let store = open_store(&args.source, store_config, timeout).await?;

    let snapshot = store
        .resolve(&args.timestamp)
        .await
        .with_context(|| format!("Failed to load snapshot {}", args.timestamp))?;

    let specs: Vec<_> = MetricKind::ALL
        .iter()
        .filter_map(|metric| match snapshot.metric(*metric) {
            Some(samples) => Some(project(samples, *metric)),
            None => {
                error!("No data for metric: {}", metric);
                None
            }
        })
        .collect();

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        "text" => {
            for spec in &specs {
                println!("## {}\n", spec.y_axis_label);
                for line in spec.summary_lines() {
                    println!("  {}", line);
                }
                println!();
            }
        }
        other => anyhow::bail!("Unknown output format '{}' (expected text or json)", other),
    }

    Ok(())
}

/// Generate dashboard
async fn render_command(args: RenderArgs, store_config: StoreConfig, timeout: Option<Duration>) -> Result<()> {
    info!("Generating dashboard");

    let store = open_store(&args.source, store_config, timeout).await?;
    let data = html::collect_dashboard(&store)
        .await
        .with_context(|| "Failed to collect report snapshots")?;

    let config = DashboardConfig {
        title: args.title,
        output_dir: args.output_dir.to_string_lossy().to_string(),
    };

    let base_path = std::env::current_dir()?;
    html::write_dashboard(&data, &config, &base_path)
        .with_context(|| "Failed to generate dashboard")?;

    info!(
        "Dashboard with {} snapshots generated at {:?}",
        data.options.len(),
        args.output_dir.join("index.html")
    );

    Ok(())
}
