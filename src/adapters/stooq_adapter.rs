//! Stooq daily history, served as CSV over HTTP.

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::adapters::csv_adapter::read_bars;
use crate::adapters::http::{get_text, trim_base};
use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::price_source::PriceSource;

pub struct StooqSource {
    base_url: String,
    client: Client,
}

impl StooqSource {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: trim_base(base_url),
            client,
        }
    }

    /// US listings carry a `.us` suffix on Stooq.
    pub fn download_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/q/d/l/?s={}.us&d1={}&d2={}&i=d",
            self.base_url,
            ticker.to_lowercase(),
            start_date.format("%Y%m%d"),
            end_date.format("%Y%m%d")
        )
    }
}

impl PriceSource for StooqSource {
    fn name(&self) -> &str {
        "stooq"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError> {
        let url = self.download_url(ticker, start_date, end_date);
        let body = get_text(&self.client, &url, self.name(), ticker)?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no data") {
            return Ok(Vec::new());
        }
        read_bars(trimmed.as_bytes(), self.name(), ticker, start_date, end_date)
    }
}
