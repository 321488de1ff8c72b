//! Local CSV price source and the shared daily-bar CSV parser.
//!
//! Files hold `Date,Open,High,Low,Close,Volume` rows with ISO dates, the same
//! layout Stooq serves. Columns are read by position; volume may be blank.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::StatplotsError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::price_source::PriceSource;

pub struct CsvDirSource {
    base_path: PathBuf,
}

impl CsvDirSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

impl PriceSource for CsvDirSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, StatplotsError> {
        let path = self.csv_path(ticker);
        let file = fs::File::open(&path).map_err(|e| StatplotsError::Source {
            source_name: self.name().to_string(),
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        read_bars(file, self.name(), ticker, start_date, end_date)
    }
}

/// Parses daily bars, keeping those within `[start_date, end_date]`, oldest first.
pub fn read_bars<R: Read>(
    reader: R,
    source_name: &str,
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PriceBar>, StatplotsError> {
    let fail = |reason: String| StatplotsError::Source {
        source_name: source_name.to_string(),
        ticker: ticker.to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut bars = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let row = line + 2;
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| fail(format!("row {row}: missing {name} column")))
        };
        let price = |idx: usize, name: &str| -> Result<f64, StatplotsError> {
            field(idx, name)?
                .parse::<f64>()
                .map_err(|e| fail(format!("row {row}: invalid {name} value: {e}")))
        };

        let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d")
            .map_err(|e| fail(format!("row {row}: invalid date format: {e}")))?;
        if date < start_date || date > end_date {
            continue;
        }

        let volume = match record.get(5).filter(|s| !s.is_empty()) {
            Some(v) => v
                .parse::<f64>()
                .map_err(|e| fail(format!("row {row}: invalid volume value: {e}")))?,
            None => 0.0,
        };

        bars.push(PriceBar {
            ticker: ticker.to_string(),
            date,
            open: price(1, "open")?,
            high: price(2, "high")?,
            low: price(3, "low")?,
            close: price(4, "close")?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-03,101.0,103.0,100.0,102.0,1200
2024-01-02,100.0,102.0,99.0,101.0,1000
2024-01-04,102.0,104.0,101.0,103.5,
2024-01-05,103.5,105.0,103.0,104.0,1500
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(contents: &str) -> (TempDir, CsvDirSource) {
        let dir = TempDir::new().unwrap();
        let mut f = fs::File::create(dir.path().join("AAPL.csv")).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let source = CsvDirSource::new(dir.path().to_path_buf());
        (dir, source)
    }

    #[test]
    fn reads_sorted_bars() {
        let (_dir, source) = setup(SAMPLE);
        let bars = source
            .fetch_daily("AAPL", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[0].close, 101.0);
        assert_eq!(bars[0].volume, 1000.0);
        assert_eq!(bars[2].volume, 0.0);
        assert_eq!(bars[3].ticker, "AAPL");
    }

    #[test]
    fn ticker_lookup_is_case_insensitive() {
        let (_dir, source) = setup(SAMPLE);
        let bars = source
            .fetch_daily("aapl", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        assert_eq!(bars.len(), 4);
    }

    #[test]
    fn filters_by_date_range() {
        let (_dir, source) = setup(SAMPLE);
        let bars = source
            .fetch_daily("AAPL", date(2024, 1, 3), date(2024, 1, 4))
            .unwrap();
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 4)]);
    }

    #[test]
    fn missing_file_is_source_error() {
        let (_dir, source) = setup(SAMPLE);
        let err = source
            .fetch_daily("MSFT", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap_err();
        assert!(matches!(err, StatplotsError::Source { ref source_name, .. } if source_name == "csv"));
    }

    #[test]
    fn bad_close_names_row() {
        let (_dir, source) = setup("Date,Open,High,Low,Close,Volume\n2024-01-02,1,1,1,abc,1\n");
        let err = source
            .fetch_daily("AAPL", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap_err();
        assert!(err.to_string().contains("row 2: invalid close value"));
    }

    #[test]
    fn header_only_is_empty() {
        let bars = read_bars(
            "Date,Open,High,Low,Close,Volume\n".as_bytes(),
            "csv",
            "AAPL",
            date(2024, 1, 1),
            date(2024, 12, 31),
        )
        .unwrap();
        assert!(bars.is_empty());
    }
}
