//! Market data port trait.

use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Daily bars for `ticker` within `[start_date, end_date]`, oldest first.
    /// An empty vector means the source had nothing for the range.
    fn fetch_daily(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError>;
}
