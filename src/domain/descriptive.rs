//! Summary statistics of a return series.

/// Moments of a sample, using the bias-corrected estimators common in
/// financial reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    /// Adjusted Fisher-Pearson skewness G1. `NaN` below 3 values.
    pub skewness: f64,
    /// Bias-corrected excess kurtosis G2. `NaN` below 4 values.
    pub excess_kurtosis: f64,
}

impl ReturnSummary {
    /// `None` for fewer than two values.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let count = values.len();
        if count < 2 {
            return None;
        }
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;

        let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), &v| {
            let d = v - mean;
            let d2 = d * d;
            (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
        });
        let m2 = m2 / n;
        let m3 = m3 / n;
        let m4 = m4 / n;

        let std_dev = (m2 * n / (n - 1.0)).sqrt();

        let skewness = if count >= 3 && m2 > 0.0 {
            let g1 = m3 / m2.powf(1.5);
            (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
        } else {
            f64::NAN
        };

        let excess_kurtosis = if count >= 4 && m2 > 0.0 {
            let g2 = m4 / (m2 * m2) - 3.0;
            (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std_dev,
            skewness,
            excess_kurtosis,
        })
    }

    /// Multi-line block for chart text boxes.
    pub fn text_lines(&self) -> Vec<String> {
        vec![
            format!("Mean: {:.4}", self.mean),
            format!("Std Dev: {:.4}", self.std_dev),
            format!("Skewness: {:.4}", self.skewness),
            format!("Kurtosis: {:.4}", self.excess_kurtosis),
        ]
    }
}
