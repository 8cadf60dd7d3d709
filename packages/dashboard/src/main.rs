#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Chicago crime dashboard.
//!
//! Every subcommand writes JSON chart payloads to `--output` (or stdout).
//! Without a subcommand, an interactive prompt picks the eras and writes
//! the full report.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use crime_dash_dashboard::data::{DataLoader, DataOptions};
use crime_dash_dashboard::report::{
    heatmap_section, hourly_section, trends_section, weekday_section, write_json,
};
use crime_dash_dashboard::{definition, interactive, paths, pipeline};
use crime_dash_source::dataset_def::{LoadOverrides, PaginationConfig};
use crime_dash_source::registry::all_datasets;

#[derive(Parser)]
#[command(name = "crime_dash", about = "Chicago crime dashboard data tool")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    load: LoadArgs,
}

#[derive(Args)]
struct LoadArgs {
    /// Read `<dataset_id>.csv` snapshots from this directory instead of the network
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,
    /// Maximum number of page requests for offset-paginated datasets
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,
    /// Rows per page (or per year for year-partitioned datasets)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,
    /// Pause between page requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    /// Directory for cached loads (default: `<data dir>/cache`)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    /// Refetch cached loads older than this many seconds
    #[arg(long, global = true)]
    cache_ttl_secs: Option<u64>,
    /// Skip the on-disk cache entirely
    #[arg(long, global = true)]
    no_cache: bool,
    /// Output file (default: stdout; for `snapshot`, `<data dir>/snapshots/<dataset>.csv`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

impl LoadArgs {
    fn data_options(&self) -> DataOptions {
        DataOptions {
            snapshot_dir: self.snapshot_dir.clone(),
            overrides: LoadOverrides {
                page_size: self.page_size,
                max_pages: self.max_pages,
                delay_ms: self.delay_ms,
            },
            cache_dir: if self.no_cache {
                None
            } else {
                Some(self.cache_dir.clone().unwrap_or_else(paths::cache_dir))
            },
            cache_ttl: self.cache_ttl_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full dashboard report
    Report {
        /// Era number for the first heatmap (see `eras`)
        #[arg(long)]
        first_era: Option<usize>,
        /// Era number for the second heatmap (see `eras`)
        #[arg(long)]
        second_era: Option<usize>,
    },
    /// Incidents by hour of day
    Hourly,
    /// Incidents by weekday
    Weekday,
    /// Yearly incidents for the districts of interest
    Trends,
    /// Incident locations for one era
    Heatmap {
        /// Era number (see `eras`)
        #[arg(long)]
        era: usize,
    },
    /// Save a dataset locally for later `--snapshot-dir` runs
    Snapshot {
        /// Dataset identifier (e.g., "`chicago_recent`")
        #[arg(long)]
        dataset: String,
    },
    /// List the embedded datasets
    Datasets,
    /// List the eras available for heatmaps
    Eras,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dash_cli_utils::init_logger();

    let cli = Cli::parse();
    let options = cli.load.data_options();
    let output = cli.load.output;
    let def = definition::chicago();

    let Some(command) = cli.command else {
        return interactive::run(&multi, options).await;
    };

    let mut loader = DataLoader::new(options);

    match command {
        Commands::Report {
            first_era,
            second_era,
        } => {
            let eras = def.era_pair(first_era, second_era)?;
            let report = pipeline::full_report(&mut loader, &multi, &def, &eras).await?;
            write_json(&report, output.as_deref())?;
        }
        Commands::Hourly => {
            let recent = pipeline::load(&mut loader, &multi, &def.recent_dataset).await?;
            write_json(&hourly_section(&recent.table), output.as_deref())?;
        }
        Commands::Weekday => {
            let recent = pipeline::load(&mut loader, &multi, &def.recent_dataset).await?;
            write_json(&weekday_section(&def, &recent.table), output.as_deref())?;
        }
        Commands::Trends => {
            let recent = pipeline::load(&mut loader, &multi, &def.recent_dataset).await?;
            write_json(&trends_section(&def, &recent.table), output.as_deref())?;
        }
        Commands::Heatmap { era } => {
            let era = def.era(era)?;
            let historical =
                pipeline::load(&mut loader, &multi, &def.historical_dataset).await?;
            let chart = heatmap_section(&def, &historical.table, era)?;
            write_json(&chart, output.as_deref())?;
        }
        Commands::Snapshot { dataset } => {
            let path = output.unwrap_or_else(|| paths::snapshot_path(&dataset));
            let rows = pipeline::snapshot(&loader, &multi, &dataset, &path).await?;
            println!("Saved {rows} rows to {}", path.display());
        }
        Commands::Datasets => {
            for dataset in all_datasets() {
                let strategy = match &dataset.pagination {
                    PaginationConfig::Offset(offset) => format!(
                        "offset pages of {} from {} to {}",
                        offset.page_size, offset.start, offset.end
                    ),
                    PaginationConfig::YearPartitioned(years) => format!(
                        "one request per year {}-{}",
                        years.first_year, years.last_year
                    ),
                };
                println!("{:<20} {} ({strategy})", dataset.id, dataset.name);
            }
        }
        Commands::Eras => {
            for (i, era) in def.eras.iter().enumerate() {
                println!("{}. {era}", i + 1);
            }
        }
    }

    Ok(())
}
