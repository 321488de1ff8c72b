//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::build_sources;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::convergence::{ConvergenceSeries, convergence_chart, run_convergence};
use crate::domain::error::StatplotsError;
use crate::domain::extreme_events::{ExtremeEventsResult, extreme_events_chart, run_extreme_events};
use crate::domain::return_density::{ReturnDensity, return_density_chart, run_return_density};
use crate::domain::settings::{ConvergenceSettings, DataSettings, FatTailSettings, KdeSettings};
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_source::PriceSource;

pub const CONVERGENCE_CHART: &str = "sample_mean_convergence.svg";
pub const FAT_TAILS_CHART: &str = "fat_tail_extreme_events.svg";
pub const KDE_CHART: &str = "return_kde.svg";

#[derive(Parser, Debug)]
#[command(
    name = "statplots",
    version,
    about = "Sample-mean convergence, fat-tail fitting and return-density charts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chart running sample means of normal, exponential and Pareto draws
    Convergence {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = CONVERGENCE_CHART)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Fit a Pareto tail exponent and simulate extreme events
    FatTails {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = FAT_TAILS_CHART)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Estimate the density of a stock's daily log-returns
    Kde {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = KDE_CHART)]
        output: PathBuf,
        /// Ticker to try, in order (repeatable)
        #[arg(long = "ticker")]
        tickers: Vec<String>,
        /// Price source to try, in order (repeatable): stooq, yahoo, csv
        #[arg(long = "source")]
        sources: Vec<String>,
    },
    /// Produce every chart into one directory
    All {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Convergence {
            config,
            output,
            seed,
        } => load_config(config.as_ref())
            .and_then(|c| convergence_command(&c, &SvgChartAdapter::new(), &output, seed).map(drop)),
        Command::FatTails {
            config,
            output,
            seed,
        } => load_config(config.as_ref())
            .and_then(|c| fat_tails_command(&c, &SvgChartAdapter::new(), &output, seed).map(drop)),
        Command::Kde {
            config,
            output,
            tickers,
            sources,
        } => load_config(config.as_ref())
            .and_then(|c| run_kde(&c, &output, &tickers, &sources)),
        Command::All {
            config,
            output_dir,
            seed,
        } => load_config(config.as_ref()).and_then(|c| run_all(&c, &output_dir, seed)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Reads the INI file at `path`; without one every setting takes its default.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, StatplotsError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| StatplotsError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn convergence_command(
    config: &dyn ConfigPort,
    charts: &dyn ChartPort,
    output: &Path,
    seed: Option<u64>,
) -> Result<Vec<ConvergenceSeries>, StatplotsError> {
    let mut settings = ConvergenceSettings::from_config(config)?;
    if let Some(seed) = seed {
        settings.seed = seed;
    }

    let series = run_convergence(&settings)?;
    charts.write(&convergence_chart(&series, settings.reference_mean), output)?;

    println!("Sample-mean convergence ({} samples, seed {})", settings.samples, settings.seed);
    for s in &series {
        let expected = s
            .distribution
            .theoretical_mean()
            .map(|m| format!("{m:.4}"))
            .unwrap_or_else(|| "undefined".into());
        println!(
            "  {:<22} final mean {:>9.4}  (expected {})",
            s.label(),
            s.final_mean().unwrap_or(f64::NAN),
            expected
        );
    }
    println!("Chart written to {}", output.display());
    Ok(series)
}

pub fn fat_tails_command(
    config: &dyn ConfigPort,
    charts: &dyn ChartPort,
    output: &Path,
    seed: Option<u64>,
) -> Result<ExtremeEventsResult, StatplotsError> {
    let mut settings = FatTailSettings::from_config(config)?;
    if let Some(seed) = seed {
        settings.seed = seed;
    }

    let result = run_extreme_events(&settings)?;
    charts.write(&extreme_events_chart(&result, &settings), output)?;

    println!("Fat-tail fit (seed {})", settings.seed);
    println!("  True α:                   {}", result.true_alpha);
    println!(
        "  Threshold ({}th pct):     {:.4}",
        settings.threshold_percentile, result.threshold
    );
    println!("  Tail size:                {}", result.tail.len());
    println!(
        "  Fitted α (MLE):           {:.4}{}",
        result.fit.shape,
        if result.fit.converged { "" } else { "  (not converged)" }
    );
    if let Some(hill) = result.hill_alpha {
        println!("  Hill estimate:            {hill:.4}");
    }
    println!("  Simulated extreme events: {}", result.simulated.len());
    println!("Chart written to {}", output.display());
    Ok(result)
}

/// Return-density analysis against already-built sources.
pub fn kde_command(
    config: &dyn ConfigPort,
    sources: &[&dyn PriceSource],
    charts: &dyn ChartPort,
    output: &Path,
    tickers: &[String],
) -> Result<ReturnDensity, StatplotsError> {
    let mut settings = KdeSettings::from_config(config)?;
    if !tickers.is_empty() {
        settings.tickers = tickers.iter().map(|t| t.to_uppercase()).collect();
    }

    let density = run_return_density(sources, &settings)?;
    charts.write(&return_density_chart(&density), output)?;

    println!(
        "{} daily log-returns ({} to {}, source {})",
        density.ticker, settings.start_date, settings.end_date, density.source_name
    );
    println!("  Observations: {}", density.summary.count);
    for line in density.summary.text_lines() {
        println!("  {line}");
    }
    println!("  KDE bandwidth: {:.6}", density.curve.bandwidth);
    println!("Chart written to {}", output.display());
    Ok(density)
}

fn run_kde(
    config: &dyn ConfigPort,
    output: &Path,
    tickers: &[String],
    source_names: &[String],
) -> Result<(), StatplotsError> {
    let mut data = DataSettings::from_config(config)?;
    if !source_names.is_empty() {
        data.sources = source_names.iter().map(|s| s.to_lowercase()).collect();
    }
    let owned = build_sources(&data)?;
    let sources: Vec<&dyn PriceSource> = owned.iter().map(|s| s.as_ref()).collect();
    kde_command(config, &sources, &SvgChartAdapter::new(), output, tickers).map(drop)
}

/// Runs every analysis; a failure does not stop the rest, the first error is returned.
fn run_all(config: &dyn ConfigPort, output_dir: &Path, seed: Option<u64>) -> Result<(), StatplotsError> {
    let charts = SvgChartAdapter::new();
    let results = [
        convergence_command(config, &charts, &output_dir.join(CONVERGENCE_CHART), seed).map(drop),
        fat_tails_command(config, &charts, &output_dir.join(FAT_TAILS_CHART), seed).map(drop),
        run_kde(config, &output_dir.join(KDE_CHART), &[], &[]),
    ];

    let mut first = None;
    for result in results {
        if let Err(e) = result {
            tracing::error!(error = %e, "analysis failed");
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}
