//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod http;
pub mod stooq_adapter;
pub mod svg_chart_adapter;
pub mod yahoo_adapter;

use crate::adapters::csv_adapter::CsvDirSource;
use crate::adapters::stooq_adapter::StooqSource;
use crate::adapters::yahoo_adapter::YahooSource;
use crate::domain::error::StatplotsError;
use crate::domain::settings::DataSettings;
use crate::ports::price_source::PriceSource;

/// Instantiates the configured sources, preserving their fallback order.
pub fn build_sources(settings: &DataSettings) -> Result<Vec<Box<dyn PriceSource>>, StatplotsError> {
    if settings.sources.is_empty() {
        return Err(StatplotsError::NoSources);
    }

    let mut sources: Vec<Box<dyn PriceSource>> = Vec::with_capacity(settings.sources.len());
    for name in &settings.sources {
        let source: Box<dyn PriceSource> = match name.as_str() {
            "stooq" => Box::new(StooqSource::new(
                &settings.stooq_url,
                http::build_client(settings.timeout_secs)?,
            )),
            "yahoo" => Box::new(YahooSource::new(
                &settings.yahoo_url,
                http::build_client(settings.timeout_secs)?,
            )),
            "csv" => {
                let dir = settings.csv_dir.clone().ok_or_else(|| StatplotsError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
                Box::new(CsvDirSource::new(dir))
            }
            other => {
                return Err(StatplotsError::ConfigInvalid {
                    section: "data".into(),
                    key: "sources".into(),
                    reason: format!("unknown source '{other}' (expected stooq, yahoo or csv)"),
                });
            }
        };
        sources.push(source);
    }
    Ok(sources)
}
