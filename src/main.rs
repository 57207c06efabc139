//! `record-bench` command line: upload a dataset, run the benchmark, inspect
//! the results.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ethabi::Address;
use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{Cell, Row, Table};
use tracing::{info, warn};

use record_bench::chain::{ChainClient, HttpChainClient, MemoryChain};
use record_bench::config::BenchConfig;
use record_bench::contract::{Contracts, Deployment};
use record_bench::dataset::{self, Dataset, DatasetRow};
use record_bench::experiment::{ExperimentDriver, MeasurementRecord, ProgressSink};
use record_bench::offchain::{self, OffChainStore, PlaceholderStore};
use record_bench::results::{report, Analyzer, ResultsStore};
use record_bench::theory;

/// Rows shown when previewing a dataset
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(
    name = "record-bench",
    version,
    about = "Compare gas and latency of full-data vs hash-only record contracts"
)]
struct Cli {
    /// JSON configuration file; unset fields take defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the configuration file
    #[arg(long, env = "RPC_URL", global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy a CSV dataset into the datasets directory and preview it
    Upload {
        /// CSV file with a header row
        file: PathBuf,
    },
    /// Measure every dataset row on both contracts and save the results
    Run {
        /// CSV dataset to replay
        #[arg(long)]
        dataset: PathBuf,
        /// Use an in-memory chain and the bundled contract interfaces
        #[arg(long)]
        dry_run: bool,
        /// Receipt timeout in milliseconds
        #[arg(long)]
        receipt_timeout_ms: Option<u64>,
    },
    /// Summarize the saved results
    Results {
        /// Also write the summary table as CSV
        #[arg(long)]
        export_summary: Option<PathBuf>,
    },
    /// Qualitative comparison of the two designs
    Theory,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("record_bench=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }

    match cli.command {
        Command::Upload { file } => upload(&config, &file),
        Command::Run {
            dataset,
            dry_run,
            receipt_timeout_ms,
        } => {
            if let Some(ms) = receipt_timeout_ms {
                config.receipt_timeout_ms = ms;
            }
            config.validate().context("Invalid configuration")?;
            run(&config, &dataset, dry_run)
        }
        Command::Results { export_summary } => results(&config, export_summary.as_deref()),
        Command::Theory => {
            print!("{}", theory::render());
            Ok(())
        }
    }
}

fn upload(config: &BenchConfig, file: &Path) -> Result<()> {
    let Some(stored) = dataset::save_upload(file, &config.datasets_dir) else {
        bail!("Could not save {}", file.display());
    };
    let dataset = Dataset::load(&stored)
        .with_context(|| format!("Failed to read dataset {}", stored.display()))?;

    println!("Dataset saved to {}", stored.display());
    println!("{} rows, columns: {}", dataset.len(), dataset.headers().join(", "));
    print!("{}", preview(&dataset));
    Ok(())
}

fn preview(dataset: &Dataset) -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        dataset.headers().iter().map(|h| Cell::new(h)).collect(),
    ));
    for row in dataset.rows().iter().take(PREVIEW_ROWS) {
        table.add_row(Row::new(row.values().iter().map(|v| Cell::new(v)).collect()));
    }
    table.to_string()
}

/// Prints one progress line per row and a status line per measurement.
struct CliProgress;

impl ProgressSink for CliProgress {
    fn on_row(&mut self, dataset: &Dataset, row: &DatasetRow, fraction: f64) {
        let fields: Vec<String> = dataset
            .labelled(row)
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "[{:>5.1}%] row {}/{}: {}",
            fraction * 100.0,
            row.index() + 1,
            dataset.len(),
            fields.join(", ")
        );
    }

    fn on_measurement(&mut self, record: &MeasurementRecord) {
        println!(
            "         {:<20} add {} gas / {:.2} ms, delete {} gas / {:.2} ms",
            record.contract_name(),
            record.add_gas_used(),
            record.add_time_ms(),
            record.delete_gas_used(),
            record.delete_time_ms(),
        );
    }
}

fn run(config: &BenchConfig, dataset_path: &Path, dry_run: bool) -> Result<()> {
    let dataset = Dataset::load(dataset_path)
        .with_context(|| format!("Failed to read dataset {}", dataset_path.display()))?;
    if dataset.is_empty() {
        warn!(dataset = dataset.name(), "dataset has no rows");
    }

    let (chain, contracts, store): (Box<dyn ChainClient>, Contracts, Box<dyn OffChainStore>) =
        if dry_run {
            info!("dry run against an in-memory chain");
            (
                Box::new(MemoryChain::new()),
                Contracts::reference(Address::from_low_u64_be(0xb), Address::from_low_u64_be(0xc))?,
                Box::new(PlaceholderStore),
            )
        } else {
            let chain = HttpChainClient::new(&config.rpc_url, config.request_timeout())
                .context("Failed to create RPC client")?;
            info!(url = chain.url(), "using JSON-RPC node");
            let contracts = Deployment::load(&config.deployment_path)
                .and_then(|d| d.contracts(&config.artifacts_dir))
                .context("Failed to load deployed contracts")?;
            let store = offchain::from_config(config).context("Failed to set up off-chain store")?;
            (Box::new(chain), contracts, store)
        };

    let mut driver = ExperimentDriver::new(chain.as_ref(), &contracts, store.as_ref())
        .receipt_timeout(config.receipt_timeout())
        .poll_interval(config.poll_interval());

    println!("Running experiment on {} ({} rows)", dataset.name(), dataset.len());
    let outcome = driver
        .run(&dataset, &mut CliProgress)
        .context("Experiment aborted, no results saved")?;

    let Some(path) = ResultsStore::new(&config.results_dir).save(&outcome.records) else {
        bail!("Experiment finished but results could not be saved");
    };
    let run = &outcome.run;
    info!(
        run_id = run.run_id(),
        dataset = run.dataset(),
        ended_at = ?run.ended_at(),
        "run finished"
    );
    println!(
        "Experiment {} on {} complete: {} records in {:.1}s, saved to {}",
        run.run_id(),
        run.dataset(),
        outcome.records.len(),
        run.duration().map_or(0.0, |d| d.num_milliseconds() as f64 / 1000.0),
        path.display()
    );
    Ok(())
}

fn results(config: &BenchConfig, export_summary: Option<&Path>) -> Result<()> {
    let analyzer = Analyzer::new(ResultsStore::new(&config.results_dir));
    let Some(table) = analyzer.load() else {
        println!("No experiment data found. Please run an experiment first.");
        return Ok(());
    };

    let coverage = Analyzer::coverage(&table).context("Failed to check results coverage")?;
    for line in report::coverage_warnings(&coverage) {
        warn!("{line}");
    }

    let Some(summary) = Analyzer::summarize(&table) else {
        println!("Not enough data to compare the two contracts.");
        return Ok(());
    };

    println!(
        "Summary ({} basic / {} lightweight records)",
        summary.basic_count(),
        summary.lightweight_count()
    );
    print!("{}", report::summary_table(&summary));
    println!();
    print!("{}", report::bar_charts(&summary));
    print!("{}", report::box_plots(&table).context("Failed to compute distributions")?);
    println!("Raw data");
    print!(
        "{}",
        report::raw_table(&table.to_records().context("Failed to read results")?)
    );

    if let Some(path) = export_summary {
        summary
            .write_csv(path)
            .with_context(|| format!("Failed to export summary to {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}
