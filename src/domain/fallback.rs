//! Ordered fallback across price sources and tickers.

use chrono::NaiveDate;

use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::price_source::PriceSource;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSeries {
    pub ticker: String,
    pub source_name: String,
    pub bars: Vec<PriceBar>,
}

/// Tries each source in order and returns the first non-empty series.
///
/// An empty series counts as a failure. When every source fails, the error
/// carries the last failure.
pub fn fetch_with_fallback(
    sources: &[&dyn PriceSource],
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<FetchedSeries, StatplotsError> {
    let mut last = StatplotsError::NoSources;

    for source in sources {
        tracing::info!(source = source.name(), ticker, "fetching daily prices");
        match source.fetch_daily(ticker, start_date, end_date) {
            Ok(bars) if !bars.is_empty() => {
                tracing::info!(source = source.name(), ticker, bars = bars.len(), "fetched");
                return Ok(FetchedSeries {
                    ticker: ticker.to_string(),
                    source_name: source.name().to_string(),
                    bars,
                });
            }
            Ok(_) => {
                tracing::warn!(source = source.name(), ticker, "source returned no data");
                last = StatplotsError::NoData {
                    ticker: ticker.to_string(),
                    source_name: source.name().to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(source = source.name(), ticker, error = %e, "source failed");
                last = e;
            }
        }
    }

    Err(StatplotsError::AllSourcesFailed {
        ticker: ticker.to_string(),
        last: Box::new(last),
    })
}

/// Tries each ticker in order, each with the full source fallback.
pub fn fetch_first_ticker(
    sources: &[&dyn PriceSource],
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<FetchedSeries, StatplotsError> {
    let mut last = StatplotsError::InsufficientData {
        what: "ticker list".into(),
        have: 0,
        need: 1,
    };

    for ticker in tickers {
        match fetch_with_fallback(sources, ticker, start_date, end_date) {
            Ok(series) => return Ok(series),
            Err(e) => {
                tracing::warn!(ticker = ticker.as_str(), error = %e, "ticker unavailable");
                last = e;
            }
        }
    }

    Err(StatplotsError::AllTickersFailed {
        last: Box::new(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Scripted {
        name: &'static str,
        bars: usize,
        fail: bool,
        calls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(name: &'static str, bars: usize, fail: bool) -> Self {
            Self {
                name,
                bars,
                fail,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PriceSource for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch_daily(
            &self,
            ticker: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<PriceBar>, StatplotsError> {
            self.calls.borrow_mut().push(ticker.to_string());
            if self.fail {
                return Err(StatplotsError::Source {
                    source_name: self.name.into(),
                    ticker: ticker.into(),
                    reason: "boom".into(),
                });
            }
            Ok((0..self.bars)
                .map(|i| {
                    PriceBar::from_close(
                        ticker,
                        start_date + chrono::Duration::days(i as i64),
                        100.0 + i as f64,
                    )
                })
                .collect())
        }
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn first_successful_source_wins() {
        let a = Scripted::new("a", 3, false);
        let b = Scripted::new("b", 5, false);
        let (s, e) = dates();
        let got = fetch_with_fallback(&[&a, &b], "AAPL", s, e).unwrap();
        assert_eq!(got.source_name, "a");
        assert_eq!(got.bars.len(), 3);
        assert!(b.calls.borrow().is_empty());
    }

    #[test]
    fn failures_and_empty_series_fall_through() {
        let a = Scripted::new("a", 0, true);
        let b = Scripted::new("b", 0, false);
        let c = Scripted::new("c", 2, false);
        let (s, e) = dates();
        let got = fetch_with_fallback(&[&a, &b, &c], "AAPL", s, e).unwrap();
        assert_eq!(got.source_name, "c");
    }

    #[test]
    fn last_failure_is_surfaced() {
        let a = Scripted::new("a", 0, false);
        let b = Scripted::new("b", 0, true);
        let (s, e) = dates();
        let err = fetch_with_fallback(&[&a, &b], "AAPL", s, e).unwrap_err();
        match err {
            StatplotsError::AllSourcesFailed { ticker, last } => {
                assert_eq!(ticker, "AAPL");
                assert!(matches!(*last, StatplotsError::Source { ref source_name, .. } if source_name == "b"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_sources() {
        let (s, e) = dates();
        let err = fetch_with_fallback(&[], "AAPL", s, e).unwrap_err();
        assert!(matches!(err.root_cause(), StatplotsError::NoSources));
    }

    #[test]
    fn tickers_tried_in_order_until_success() {
        struct OnlyMsft;
        impl PriceSource for OnlyMsft {
            fn name(&self) -> &str {
                "only-msft"
            }
            fn fetch_daily(
                &self,
                ticker: &str,
                start_date: NaiveDate,
                _end_date: NaiveDate,
            ) -> Result<Vec<PriceBar>, StatplotsError> {
                if ticker == "MSFT" {
                    Ok(vec![PriceBar::from_close(ticker, start_date, 1.0)])
                } else {
                    Ok(Vec::new())
                }
            }
        }

        let (s, e) = dates();
        let tickers: Vec<String> = ["AAPL", "MSFT", "GOOGL"].iter().map(|t| t.to_string()).collect();
        let got = fetch_first_ticker(&[&OnlyMsft], &tickers, s, e).unwrap();
        assert_eq!(got.ticker, "MSFT");
    }

    #[test]
    fn all_tickers_failing_reports_last_ticker() {
        let a = Scripted::new("a", 0, true);
        let (s, e) = dates();
        let tickers = vec!["AAPL".to_string(), "AMZN".to_string()];
        let err = fetch_first_ticker(&[&a], &tickers, s, e).unwrap_err();
        assert_eq!(*a.calls.borrow(), vec!["AAPL", "AMZN"]);
        match err {
            StatplotsError::AllTickersFailed { last } => {
                assert!(matches!(*last, StatplotsError::AllSourcesFailed { ref ticker, .. } if ticker == "AMZN"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
