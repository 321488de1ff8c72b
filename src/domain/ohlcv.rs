//! Daily OHLCV bar as delivered by a price source.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar with every price field set to `close`.
    pub fn from_close(ticker: &str, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    /// ln(close / prev.close)
    pub fn log_return_from(&self, prev: &PriceBar) -> f64 {
        (self.close / prev.close).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::from_close("AAPL", NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), close)
    }

    #[test]
    fn from_close_fills_prices() {
        let b = bar(2, 101.5);
        assert_eq!(b.open, 101.5);
        assert_eq!(b.high, 101.5);
        assert_eq!(b.low, 101.5);
        assert_eq!(b.volume, 0.0);
    }

    #[test]
    fn log_return_of_doubling() {
        let r = bar(3, 200.0).log_return_from(&bar(2, 100.0));
        assert!((r - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn log_return_of_unchanged_price_is_zero() {
        assert_eq!(bar(3, 50.0).log_return_from(&bar(2, 50.0)), 0.0);
    }
}
