//! civic-scraper CLI
//!
//! Scrapes meeting documents from a CivicPlus site, or parses a saved
//! search-results page, and exports metadata.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use civic_scraper::{
    error::{AppError, Result},
    models::{AssetType, Config},
    pipeline::{self, ExportTargets, ScrapeSummary},
    sites::{CivicPlusSite, ScrapeOptions, SearchParams, SiteDriver, build_assets},
};

/// civic-scraper - municipal meeting document harvester
#[derive(Parser, Debug)]
#[command(
    name = "civic-scraper",
    version,
    about = "Harvest agendas, minutes and packets from municipal portals"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "civic_scraper.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where results go and how the site is labelled.
#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Write the CSV metadata file (default when no export is chosen)
    #[arg(long)]
    csv: bool,

    /// Write one JSON event document per meeting
    #[arg(long)]
    events: bool,

    /// Output directory (default: output.dir from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the place derived from the site URL
    #[arg(long)]
    place: Option<String>,

    /// Override the state or province derived from the site URL
    #[arg(long)]
    state: Option<String>,
}

impl OutputArgs {
    fn targets(&self) -> ExportTargets {
        ExportTargets {
            csv: self.csv || !self.events,
            events: self.events,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a site for a date range
    Scrape {
        /// Site URL, e.g. https://nc-nashcounty.civicplus.com
        #[arg(long)]
        url: String,

        /// First meeting date, YYYY-MM-DD (default: today)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last meeting date, YYYY-MM-DD (default: start date)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Keep only these asset types (repeatable)
        #[arg(long = "asset-type")]
        asset_types: Vec<AssetType>,

        /// Drop assets larger than this many megabytes
        #[arg(long)]
        max_size: Option<f64>,

        /// Skip the HEAD request that learns type and size
        #[arg(long)]
        no_probe: bool,

        /// Download assets into <output>/assets
        #[arg(long)]
        download: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Parse a saved search-results page without touching the network
    Parse {
        /// Saved HTML page
        file: PathBuf,

        /// Site URL the page came from
        #[arg(long)]
        url: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn report(summary: &ScrapeSummary) {
    log::info!("Assets: {}", summary.asset_count);
    if let Some(path) = &summary.csv_path {
        log::info!("CSV metadata: {}", path.display());
    }
    if let (Some(count), Some(dir)) = (summary.meeting_count, &summary.events_dir) {
        log::info!("{} meeting documents in {}", count, dir.display());
    }
}

/// Load and check a config file; unlike the other commands, a missing or
/// unparsable file is an error here.
fn validate_config(path: &Path) -> Result<()> {
    log::info!("Validating {}...", path.display());
    let checked = Config::load(path).and_then(|config| config.validate());
    if let Err(e) = checked {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("Config OK");
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scrape {
            url,
            start_date,
            end_date,
            asset_types,
            max_size,
            no_probe,
            download,
            output,
        } => {
            let config = Config::load_or_default(&cli.config);
            let site = CivicPlusSite::new(&url, &config)?
                .with_place(output.place.as_deref(), output.state.as_deref());

            let params = match (start_date, end_date) {
                (None, None) => SearchParams::today(),
                (Some(start), end) => SearchParams::new(start, end.unwrap_or(start))?,
                (None, Some(_)) => {
                    return Err(AppError::validation("--end-date requires --start-date"));
                }
            };

            let output_dir = output.output.clone().unwrap_or_else(|| config.output.dir.clone());
            let options = ScrapeOptions {
                params,
                asset_types: (!asset_types.is_empty()).then_some(asset_types),
                max_file_size_mb: max_size,
                probe: !no_probe || max_size.is_some(),
                download_dir: download.then(|| pipeline::scrape::assets_dir(&output_dir)),
            };

            let (_, summary) =
                pipeline::run_scrape(&site, &options, &output_dir, output.targets()).await?;
            report(&summary);
        }

        Command::Parse { file, url, output } => {
            let markup = std::fs::read_to_string(&file)?;
            let config = Config::load_or_default(&cli.config);
            let site = CivicPlusSite::new(&url, &config)?
                .with_place(output.place.as_deref(), output.state.as_deref());

            let parsed = site.parse_page(&markup);
            log::info!(
                "Parsed {} documents from {} ({} entries skipped)",
                parsed.records.len(),
                file.display(),
                parsed.failures.len()
            );

            let collection = build_assets(&parsed.records, site.context());
            let output_dir = output.output.clone().unwrap_or_else(|| config.output.dir.clone());
            let summary = pipeline::export_collection(&collection, &output_dir, output.targets())?;
            report(&summary);
        }

        Command::Validate => validate_config(&cli.config)?,
    }

    log::info!("Done!");

    Ok(())
}
