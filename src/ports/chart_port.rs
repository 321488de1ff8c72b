//! Chart output port trait.

use std::path::Path;

use crate::domain::chart::Chart;
use crate::domain::error::StatplotsError;

/// Port for writing rendered charts.
pub trait ChartPort {
    fn write(&self, chart: &Chart, output_path: &Path) -> Result<(), StatplotsError>;
}
