//! Analysis settings read from configuration and validated up front.
//!
//! Every key is optional; the defaults reproduce the reference charts.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::StatplotsError;
use crate::domain::optimize::{Bounds, MinimizeOptions};
use crate::domain::pareto::TailFitSettings;
use crate::domain::sampling::SampleDistribution;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TICKERS: [&str; 4] = ["AAPL", "MSFT", "GOOGL", "AMZN"];
pub const DEFAULT_SOURCES: [&str; 2] = ["stooq", "yahoo"];
pub const DEFAULT_STOOQ_URL: &str = "https://stooq.com";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceSettings {
    pub seed: u64,
    pub samples: usize,
    pub distributions: Vec<SampleDistribution>,
    pub reference_mean: f64,
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            samples: 5000,
            distributions: vec![
                SampleDistribution::Normal { mean: 0.0, std_dev: 1.0 },
                SampleDistribution::Exponential { rate: 1.0 },
                SampleDistribution::Pareto { shape: 2.0, scale: 1.0 },
            ],
            reference_mean: 1.0,
        }
    }
}

impl ConvergenceSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StatplotsError> {
        const S: &str = "convergence";
        let defaults = Self::default();
        let settings = Self {
            seed: read_seed(config, S)?,
            samples: read_count(config, S, "samples", defaults.samples, 1)?,
            distributions: vec![
                SampleDistribution::Normal {
                    mean: config.get_double(S, "normal_mean", 0.0),
                    std_dev: config.get_double(S, "normal_std", 1.0),
                },
                SampleDistribution::Exponential {
                    rate: config.get_double(S, "exponential_rate", 1.0),
                },
                SampleDistribution::Pareto {
                    shape: config.get_double(S, "pareto_alpha", 2.0),
                    scale: 1.0,
                },
            ],
            reference_mean: config.get_double(S, "reference_mean", defaults.reference_mean),
        };
        for dist in &settings.distributions {
            dist.validate().map_err(|e| as_config_error(S, e))?;
        }
        require_finite(S, "reference_mean", settings.reference_mean)?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FatTailSettings {
    pub seed: u64,
    pub true_alpha: f64,
    pub n_data: usize,
    pub threshold_percentile: f64,
    pub n_simulated: usize,
    pub bins: usize,
    /// Upper x limit of the density chart.
    pub x_cap: f64,
    /// Print the chart guide below the plot.
    pub show_explanation: bool,
    pub fit: TailFitSettings,
}

impl Default for FatTailSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            true_alpha: 2.5,
            n_data: 10_000,
            threshold_percentile: 95.0,
            n_simulated: 1000,
            bins: 50,
            x_cap: 20.0,
            show_explanation: true,
            fit: TailFitSettings::default(),
        }
    }
}

impl FatTailSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StatplotsError> {
        const S: &str = "fat_tails";
        let d = Self::default();

        let true_alpha = config.get_double(S, "true_alpha", d.true_alpha);
        require_positive(S, "true_alpha", true_alpha)?;

        let threshold_percentile =
            config.get_double(S, "threshold_percentile", d.threshold_percentile);
        if !(threshold_percentile > 0.0 && threshold_percentile < 100.0) {
            return Err(invalid(S, "threshold_percentile", "must be between 0 and 100 (exclusive)"));
        }

        let x_cap = config.get_double(S, "x_cap", d.x_cap);
        require_positive(S, "x_cap", x_cap)?;

        let alpha_min = config.get_double(S, "alpha_min", d.fit.bounds.lo);
        let alpha_max = config.get_double(S, "alpha_max", d.fit.bounds.hi);
        if !(alpha_min > 0.0) {
            return Err(invalid(S, "alpha_min", "must be positive"));
        }
        let bounds = Bounds::new(alpha_min, alpha_max).map_err(|e| as_config_error(S, e))?;

        let initial_guess = config.get_double(S, "initial_alpha", d.fit.initial_guess);
        require_finite(S, "initial_alpha", initial_guess)?;

        let x_tol = config.get_double(S, "x_tol", d.fit.options.x_tol);
        require_positive(S, "x_tol", x_tol)?;
        let max_iter = read_count(config, S, "max_iter", d.fit.options.max_iter, 1)?;

        Ok(Self {
            seed: read_seed(config, S)?,
            true_alpha,
            n_data: read_count(config, S, "n_data", d.n_data, 2)?,
            threshold_percentile,
            n_simulated: read_count(config, S, "n_simulated", d.n_simulated, 1)?,
            bins: read_count(config, S, "bins", d.bins, 1)?,
            x_cap,
            show_explanation: config.get_bool(S, "show_explanation", d.show_explanation),
            fit: TailFitSettings {
                bounds,
                initial_guess,
                options: MinimizeOptions { x_tol, max_iter },
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KdeSettings {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bw_adjust: f64,
    pub grid_size: usize,
    pub cut: f64,
}

impl Default for KdeSettings {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            start_date: ymd(2020, 1, 1),
            end_date: ymd(2024, 1, 1),
            bw_adjust: 1.0,
            grid_size: 200,
            cut: 3.0,
        }
    }
}

impl KdeSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StatplotsError> {
        const S: &str = "kde";
        let d = Self::default();

        let tickers = config
            .get_list(S, "tickers")
            .map(|list| list.into_iter().map(|t| t.to_uppercase()).collect())
            .unwrap_or(d.tickers);

        let start_date = read_date(config, S, "start_date", d.start_date)?;
        let end_date = read_date(config, S, "end_date", d.end_date)?;
        if start_date >= end_date {
            return Err(invalid(S, "start_date", "start_date must be before end_date"));
        }

        let bw_adjust = config.get_double(S, "bw_adjust", d.bw_adjust);
        require_positive(S, "bw_adjust", bw_adjust)?;
        let cut = config.get_double(S, "cut", d.cut);
        if !(cut.is_finite() && cut >= 0.0) {
            return Err(invalid(S, "cut", "must be non-negative"));
        }

        Ok(Self {
            tickers,
            start_date,
            end_date,
            bw_adjust,
            grid_size: read_count(config, S, "grid_size", d.grid_size, 2)?,
            cut,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Source names in fallback order.
    pub sources: Vec<String>,
    pub stooq_url: String,
    pub yahoo_url: String,
    pub csv_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            stooq_url: DEFAULT_STOOQ_URL.to_string(),
            yahoo_url: DEFAULT_YAHOO_URL.to_string(),
            csv_dir: None,
            timeout_secs: 30,
        }
    }
}

impl DataSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StatplotsError> {
        const S: &str = "data";
        let d = Self::default();
        let sources = config
            .get_list(S, "sources")
            .map(|list| list.into_iter().map(|s| s.to_lowercase()).collect())
            .unwrap_or(d.sources);
        Ok(Self {
            sources,
            stooq_url: config.get_string(S, "stooq_url").unwrap_or(d.stooq_url),
            yahoo_url: config.get_string(S, "yahoo_url").unwrap_or(d.yahoo_url),
            csv_dir: config.get_string(S, "csv_dir").map(PathBuf::from),
            timeout_secs: read_count(config, S, "timeout_secs", d.timeout_secs as usize, 1)? as u64,
        })
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn read_seed(config: &dyn ConfigPort, section: &str) -> Result<u64, StatplotsError> {
    let seed = config.get_int(section, "seed", DEFAULT_SEED as i64);
    u64::try_from(seed).map_err(|_| invalid(section, "seed", "must be non-negative"))
}

fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
    minimum: usize,
) -> Result<usize, StatplotsError> {
    let value = config.get_int(section, key, default as i64);
    match usize::try_from(value) {
        Ok(v) if v >= minimum => Ok(v),
        _ => Err(invalid(section, key, &format!("must be at least {minimum}"))),
    }
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: NaiveDate,
) -> Result<NaiveDate, StatplotsError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| invalid(section, key, "invalid date format (expected YYYY-MM-DD)")),
    }
}

fn require_positive(section: &str, key: &str, value: f64) -> Result<(), StatplotsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(section, key, "must be positive"))
    }
}

fn require_finite(section: &str, key: &str, value: f64) -> Result<(), StatplotsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(section, key, "must be finite"))
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> StatplotsError {
    StatplotsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn as_config_error(section: &str, err: StatplotsError) -> StatplotsError {
    match err {
        StatplotsError::InvalidParameter { name, reason } => StatplotsError::ConfigInvalid {
            section: section.to_string(),
            key: name,
            reason,
        },
        other => other,
    }
}
