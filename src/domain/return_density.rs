//! Kernel density estimate of a stock's daily log-returns.

use crate::domain::chart::{Chart, Corner, Series, TextBox};
use crate::domain::descriptive::ReturnSummary;
use crate::domain::error::StatplotsError;
use crate::domain::fallback::{FetchedSeries, fetch_first_ticker};
use crate::domain::kde::{GaussianKde, KdeCurve};
use crate::domain::returns::log_returns;
use crate::domain::settings::KdeSettings;
use crate::ports::price_source::PriceSource;

/// Minimum number of log-returns needed for the four-moment summary.
pub const MIN_RETURNS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnDensity {
    pub ticker: String,
    pub source_name: String,
    pub returns: Vec<f64>,
    pub summary: ReturnSummary,
    pub curve: KdeCurve,
}

/// Fetches the first available ticker and estimates its return density.
pub fn run_return_density(
    sources: &[&dyn PriceSource],
    settings: &KdeSettings,
) -> Result<ReturnDensity, StatplotsError> {
    let fetched = fetch_first_ticker(sources, &settings.tickers, settings.start_date, settings.end_date)?;
    analyze_series(fetched, settings)
}

pub fn analyze_series(
    mut fetched: FetchedSeries,
    settings: &KdeSettings,
) -> Result<ReturnDensity, StatplotsError> {
    fetched.bars.sort_by_key(|b| b.date);
    fetched.bars.dedup_by_key(|b| b.date);

    let returns = log_returns(&fetched.bars)?;
    if returns.len() < MIN_RETURNS {
        return Err(StatplotsError::InsufficientData {
            what: format!("{} log-returns", fetched.ticker),
            have: returns.len(),
            need: MIN_RETURNS,
        });
    }

    let summary = ReturnSummary::compute(&returns).ok_or_else(|| StatplotsError::InsufficientData {
        what: format!("{} log-returns", fetched.ticker),
        have: returns.len(),
        need: MIN_RETURNS,
    })?;
    let kde = GaussianKde::new(&returns, settings.bw_adjust).ok_or_else(|| {
        StatplotsError::invalid("returns", format!("{} returns have zero variance", fetched.ticker))
    })?;
    let curve = kde.curve(settings.grid_size, settings.cut);

    tracing::info!(
        ticker = fetched.ticker.as_str(),
        source = fetched.source_name.as_str(),
        returns = returns.len(),
        bandwidth = curve.bandwidth,
        "estimated return density"
    );

    Ok(ReturnDensity {
        ticker: fetched.ticker,
        source_name: fetched.source_name,
        returns,
        summary,
        curve,
    })
}

pub fn return_density_chart(density: &ReturnDensity) -> Chart {
    let points = density
        .curve
        .xs
        .iter()
        .copied()
        .zip(density.curve.densities.iter().copied())
        .collect();

    let mut chart = Chart::new(
        format!("{} Daily Log-Return Kernel Density Estimate", density.ticker),
        "Log Return",
        "Density",
    )
    .with_series(Series::Area {
        label: Some(format!("{} ({})", density.ticker, density.source_name)),
        points,
        color: "skyblue".into(),
        opacity: 0.5,
    });
    chart.text_box = Some(TextBox {
        lines: density.summary.text_lines(),
        corner: Corner::TopRight,
    });
    chart
}
