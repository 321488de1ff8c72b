//! Convergence of the running sample mean under different distributions.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::chart::{Annotation, Chart, Guide, LineStyle, Series};
use crate::domain::error::StatplotsError;
use crate::domain::sampling::SampleDistribution;
use crate::domain::settings::ConvergenceSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceSeries {
    pub distribution: SampleDistribution,
    pub cumulative_means: Vec<f64>,
}

impl ConvergenceSeries {
    pub fn label(&self) -> String {
        self.distribution.to_string()
    }

    pub fn final_mean(&self) -> Option<f64> {
        self.cumulative_means.last().copied()
    }
}

/// Element `i` is the mean of `data[..=i]`.
pub fn cumulative_means(data: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    data.iter()
        .enumerate()
        .map(|(i, &v)| {
            sum += v;
            sum / (i + 1) as f64
        })
        .collect()
}

/// Draws `settings.samples` values per distribution, in declared order, from
/// one generator seeded with `settings.seed`.
pub fn run_convergence(settings: &ConvergenceSettings) -> Result<Vec<ConvergenceSeries>, StatplotsError> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    settings
        .distributions
        .iter()
        .map(|&distribution| {
            let data = distribution.sample(settings.samples, &mut rng)?;
            let series = ConvergenceSeries {
                distribution,
                cumulative_means: cumulative_means(&data),
            };
            tracing::debug!(
                label = %series.label(),
                final_mean = series.final_mean().unwrap_or(f64::NAN),
                "sampled distribution"
            );
            Ok(series)
        })
        .collect()
}

pub fn convergence_chart(series: &[ConvergenceSeries], reference_mean: f64) -> Chart {
    let mut chart = Chart::new(
        "Convergence of Sample Mean with Increasing Sample Size",
        "Sample Size",
        "Cumulative Sample Mean",
    );

    let mut last_x = 0.0;
    for s in series {
        let color = chart.next_color();
        let points: Vec<(f64, f64)> = s
            .cumulative_means
            .iter()
            .enumerate()
            .map(|(i, &m)| (i as f64, m))
            .collect();
        if let Some(&(x, y)) = points.last() {
            last_x = f64::max(last_x, x);
            chart = chart.with_annotation(Annotation {
                x,
                y,
                text: s.label(),
                color: color.clone(),
            });
        }
        chart = chart.with_series(Series::Line {
            label: Some(s.label()),
            points,
            color,
            style: LineStyle::Solid,
            width: 1.5,
        });
    }

    chart
        .with_guide(Guide::Horizontal {
            y: reference_mean,
            color: "gray".into(),
            style: LineStyle::Dashed,
            label: None,
        })
        .with_annotation(Annotation {
            x: last_x,
            y: reference_mean,
            text: format!("Reference Line (mean={reference_mean})"),
            color: "gray".into(),
        })
}
