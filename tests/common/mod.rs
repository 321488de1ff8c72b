#![allow(dead_code)]

use chrono::NaiveDate;
use statplots::domain::chart::Chart;
use statplots::domain::error::StatplotsError;
pub use statplots::domain::ohlcv::PriceBar;
use statplots::ports::chart_port::ChartPort;
use statplots::ports::price_source::PriceSource;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockPriceSource {
    pub name: String,
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockPriceSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError> {
        self.calls.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StatplotsError::Source {
                source_name: self.name.clone(),
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Keeps charts in memory instead of writing files.
#[derive(Default)]
pub struct RecordingChartPort {
    pub written: RefCell<Vec<(Chart, PathBuf)>>,
}

impl ChartPort for RecordingChartPort {
    fn write(&self, chart: &Chart, output_path: &Path) -> Result<(), StatplotsError> {
        self.written
            .borrow_mut()
            .push((chart.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(ticker: &str, date_str: &str, close: f64) -> PriceBar {
    PriceBar::from_close(ticker, date(date_str), close)
}

/// Deterministic zig-zag walk of `n` daily closes starting at `start`.
pub fn walk_bars(ticker: &str, start: &str, n: usize) -> Vec<PriceBar> {
    let first = date(start);
    let mut close = 100.0;
    (0..n)
        .map(|i| {
            let step = [0.012, -0.008, 0.004, -0.015, 0.02, -0.003, 0.007][i % 7];
            close *= 1.0 + step;
            PriceBar::from_close(ticker, first + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
