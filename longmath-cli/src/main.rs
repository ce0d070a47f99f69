//! longmath CLI: build validated monthly datasets.
//!
//! Commands:
//! - `boc`: Bank of Canada Valet series
//! - `shiller` / `shiller-cpi`: long-history workbook total return and CPI
//! - `rates`: two-column date/value rate CSV
//! - `statcan`: statistics agency table filtered on SYMBOL
//! - `build-all`: every dataset of a manifest, or the standard batch
//! - `inspect`: re-validate an existing artifact and print its summary

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use longmath_core::data::{HttpTextProvider, StaticTextProvider, TextProvider};
use longmath_core::{
    build_all, build_dataset, read_dataset, write_dataset, AggregationMode, BuildManifest,
    DatasetKind, HttpConfig, PipelineConfig, StdoutProgress, WriteReport,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "longmath",
    version,
    about = "longmath: normalize historical economic data into monthly JSON series"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOpts {
    /// Minimum points for generic monthly series (default 100).
    #[arg(long, global = true)]
    min_points: Option<usize>,

    /// Minimum points for the long-history workbook series (default 1000).
    #[arg(long, global = true)]
    min_points_long: Option<usize>,

    /// HTTP timeout in seconds (default 30).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Debug-level logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a Bank of Canada Valet series and aggregate it to months.
    Boc {
        /// Valet series code (e.g., FXUSDCAD).
        series: String,

        /// Output JSON path.
        out: PathBuf,

        /// First observation date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last observation date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Monthly aggregation: mean or last.
        #[arg(long, default_value = "mean")]
        agg: AggregationMode,

        /// Treat values as annual % yields and compound them into an index.
        #[arg(long, default_value_t = false)]
        total_return: bool,
    },
    /// Equity total-return index from the long-history workbook.
    Shiller {
        /// Workbook path (.xls/.xlsx/.ods).
        workbook: PathBuf,

        /// Output JSON path.
        out: PathBuf,
    },
    /// CPI level series from the long-history workbook.
    ShillerCpi {
        /// Workbook path (.xls/.xlsx/.ods).
        workbook: PathBuf,

        /// Output JSON path.
        out: PathBuf,
    },
    /// Two-column date/value rate CSV.
    Rates {
        /// CSV path.
        csv: PathBuf,

        /// Output JSON path.
        out: PathBuf,

        /// Monthly aggregation: mean or last.
        #[arg(long, default_value = "mean")]
        agg: AggregationMode,

        /// Treat values as annual % yields and compound them into an index.
        #[arg(long, default_value_t = false)]
        total_return: bool,
    },
    /// Statistics agency table, keeping rows whose SYMBOL matches.
    Statcan {
        /// CSV path.
        csv: PathBuf,

        /// Output JSON path.
        out: PathBuf,

        /// SYMBOL value to keep (empty keeps unflagged rows).
        #[arg(long, default_value = "")]
        symbol: String,

        /// Monthly aggregation: mean or last.
        #[arg(long, default_value = "last")]
        agg: AggregationMode,
    },
    /// Build every dataset of a manifest, or the standard six-dataset batch.
    BuildAll {
        /// Output directory (created if missing).
        #[arg(long)]
        out_dir: PathBuf,

        /// Manifest TOML. Without it the standard batch is built from the inputs below.
        #[arg(long, conflicts_with_all = ["workbook", "rate_csv", "statcan_csv"])]
        manifest: Option<PathBuf>,

        /// Long-history workbook for the standard batch.
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// Rate CSV for the standard batch.
        #[arg(long)]
        rate_csv: Option<PathBuf>,

        /// Statistics agency CSV for the standard batch.
        #[arg(long)]
        statcan_csv: Option<PathBuf>,
    },
    /// Re-validate an existing artifact and print its summary.
    Inspect {
        /// Dataset JSON path.
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = pipeline_config(&cli.global, PipelineConfig::default());
    tracing::debug!(?config, "effective pipeline configuration");

    match cli.command {
        Commands::Boc {
            series,
            out,
            start,
            end,
            agg,
            total_return,
        } => {
            let kind = DatasetKind::Boc {
                series,
                start: parse_date(start.as_deref(), "--start")?,
                end: parse_date(end.as_deref(), "--end")?,
                agg: Some(agg),
                total_return,
            };
            run_single(&kind, &config, &out)
        }
        Commands::Shiller { workbook, out } => {
            run_single(&DatasetKind::ShillerTotalReturn { path: workbook }, &config, &out)
        }
        Commands::ShillerCpi { workbook, out } => {
            run_single(&DatasetKind::ShillerCpi { path: workbook }, &config, &out)
        }
        Commands::Rates {
            csv,
            out,
            agg,
            total_return,
        } => {
            let kind = DatasetKind::RateCsv {
                path: csv,
                agg: Some(agg),
                total_return,
            };
            run_single(&kind, &config, &out)
        }
        Commands::Statcan {
            csv,
            out,
            symbol,
            agg,
        } => {
            let kind = DatasetKind::Statcan {
                path: csv,
                symbol,
                agg: Some(agg),
            };
            run_single(&kind, &config, &out)
        }
        Commands::BuildAll {
            out_dir,
            manifest,
            workbook,
            rate_csv,
            statcan_csv,
        } => {
            let mut manifest = match (manifest, workbook, rate_csv, statcan_csv) {
                (Some(path), ..) => BuildManifest::from_file(&path)
                    .with_context(|| format!("loading manifest {}", path.display()))?,
                (None, Some(w), Some(r), Some(s)) => BuildManifest::standard(w, r, s),
                _ => bail!("build-all needs --manifest, or all of --workbook, --rate-csv and --statcan-csv"),
            };
            manifest.pipeline = pipeline_config(&cli.global, manifest.pipeline);
            run_build_all(&manifest, &out_dir)
        }
        Commands::Inspect { path } => run_inspect(&path, &config),
    }
}

/// Apply command-line overrides on top of a base configuration.
fn pipeline_config(opts: &GlobalOpts, mut config: PipelineConfig) -> PipelineConfig {
    if let Some(n) = opts.min_points {
        config.min_points = n;
    }
    if let Some(n) = opts.min_points_long {
        config.min_points_long_history = n;
    }
    if let Some(secs) = opts.timeout_secs {
        config.http.timeout_secs = secs;
    }
    config
}

fn parse_date(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("{flag} must be YYYY-MM-DD, got '{s}'"))
    })
    .transpose()
}

/// HTTP client only when something will be fetched; local-file builds get an
/// empty offline provider.
fn text_provider(http: &HttpConfig, needs_network: bool) -> Result<Box<dyn TextProvider>> {
    if needs_network {
        Ok(Box::new(HttpTextProvider::new(http)?))
    } else {
        Ok(Box::new(StaticTextProvider::new()))
    }
}

fn run_single(kind: &DatasetKind, config: &PipelineConfig, out: &Path) -> Result<()> {
    let provider = text_provider(&config.http, kind.needs_network())?;
    let envelope = build_dataset(kind, config, provider.as_ref())?;
    let report = write_dataset(&envelope, out)?;
    print_report(&report);
    Ok(())
}

fn run_build_all(manifest: &BuildManifest, out_dir: &Path) -> Result<()> {
    let provider = text_provider(&manifest.pipeline.http, manifest.needs_network())?;
    let summary = build_all(manifest, out_dir, provider.as_ref(), &StdoutProgress)?;
    for report in &summary.reports {
        print_report(report);
    }
    Ok(())
}

fn run_inspect(path: &Path, config: &PipelineConfig) -> Result<()> {
    let envelope = read_dataset(path, config.min_points)
        .with_context(|| format!("inspecting {}", path.display()))?;
    let series = envelope.series();

    println!("=== {} ===", path.display());
    println!("Source:    {}", envelope.source());
    println!("Frequency: monthly");
    println!("Range:     {} → {}", envelope.start(), envelope.end());
    println!("Points:    {}", series.len());
    println!("First:     {:.6}", series.first().value);
    println!("Last:      {:.6}", series.last().value);
    Ok(())
}

fn print_report(report: &WriteReport) {
    println!(
        "Wrote {} ({} points) [{} → {}]",
        report.path.display(),
        report.points,
        report.start,
        report.end
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sources_build_no_http_client() {
        let http = HttpConfig::default();
        assert_eq!(text_provider(&http, false).unwrap().name(), "static");
        assert_eq!(text_provider(&http, true).unwrap().name(), "http");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
