//! Daily log-returns from a close-price series.

use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;

/// ln(close[i] / close[i-1]) for every bar after the first.
///
/// Bars must already be in date order. A non-positive or non-finite close
/// has no logarithm and is rejected.
pub fn log_returns(bars: &[PriceBar]) -> Result<Vec<f64>, StatplotsError> {
    if let Some(bad) = bars.iter().find(|b| !(b.close.is_finite() && b.close > 0.0)) {
        return Err(StatplotsError::invalid(
            "close",
            format!("{} on {} has close {}", bad.ticker, bad.date, bad.close),
        ));
    }

    Ok(bars
        .windows(2)
        .map(|pair| pair[1].log_return_from(&pair[0]))
        .collect())
}
