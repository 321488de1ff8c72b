//! Yahoo Finance chart API (v8) daily history.

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::adapters::http::{get_text, trim_base};
use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::price_source::PriceSource;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

/// Parallel arrays aligned with `timestamp`; gaps come through as `null`.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooSource {
    base_url: String,
    client: Client,
}

impl YahooSource {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: trim_base(base_url),
            client,
        }
    }

    /// `period2` is exclusive, so it points at the day after `end_date`.
    pub fn chart_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            ticker.to_uppercase(),
            unix_midnight(start_date),
            unix_midnight(end_date) + SECONDS_PER_DAY
        )
    }

    fn fail(&self, ticker: &str, reason: impl Into<String>) -> StatplotsError {
        StatplotsError::Source {
            source_name: self.name().to_string(),
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(
        &self,
        body: &str,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError> {
        let response: ChartResponse = serde_json::from_str(body)
            .map_err(|e| self.fail(ticker, format!("malformed chart response: {e}")))?;

        if let Some(err) = response.chart.error {
            return Err(self.fail(
                ticker,
                format!(
                    "{}: {}",
                    err.code.unwrap_or_else(|| "error".into()),
                    err.description.unwrap_or_default()
                ),
            ));
        }

        let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            if date < start_date || date > end_date {
                continue;
            }
            let or_close = |series: &[Option<f64>]| series.get(i).copied().flatten().unwrap_or(close);
            bars.push(PriceBar {
                ticker: ticker.to_string(),
                date,
                open: or_close(&quote.open),
                high: or_close(&quote.high),
                low: or_close(&quote.low),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError> {
        let url = self.chart_url(ticker, start_date, end_date);
        let body = get_text(&self.client, &url, self.name(), ticker)?;
        self.parse(&body, ticker, start_date, end_date)
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::build_client;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn source(url: &str) -> YahooSource {
        YahooSource::new(url, build_client(5).unwrap())
    }

    // 2024-01-02 and 2024-01-03 14:30 UTC, plus a holiday row with null prices.
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [187.15, 184.22, null],
                        "high": [188.44, 185.88, null],
                        "low": [183.89, 183.43, null],
                        "close": [185.64, 184.25, null],
                        "volume": [82488700, 58414500, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn builds_chart_url() {
        let s = source("https://query1.finance.yahoo.com");
        assert_eq!(
            s.chart_url("msft", date(2020, 1, 1), date(2024, 1, 1)),
            "https://query1.finance.yahoo.com/v8/finance/chart/MSFT?period1=1577836800&period2=1704153600&interval=1d"
        );
    }

    #[test]
    fn null_closes_are_skipped() {
        let bars = source("http://unused")
            .parse(BODY, "AAPL", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[1].close, 184.25);
        assert_eq!(bars[0].volume, 82_488_700.0);
    }

    #[test]
    fn chart_error_is_source_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = source("http://unused")
            .parse(body, "ZZZZ", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(err.to_string().contains("Not Found"));
        assert!(matches!(err, StatplotsError::Source { ref source_name, .. } if source_name == "yahoo"));
    }

    #[test]
    fn empty_result_is_empty_series() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        let bars = source("http://unused")
            .parse(body, "AAPL", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn fetches_over_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v8/finance/chart/AAPL")
            .match_query(mockito::Matcher::UrlEncoded("interval".into(), "1d".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create();

        let bars = source(&server.url())
            .fetch_daily("AAPL", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        mock.assert();
        assert_eq!(bars.len(), 2);
    }
}
