//! Gaussian kernel density estimation.
//!
//! Bandwidth follows Scott's rule, `h = s * n^(-1/5)` with `s` the sample
//! standard deviation, optionally scaled by `bw_adjust`. The evaluation grid
//! extends `cut` bandwidths past the sample extremes so the tails of the
//! estimate are visible.

use crate::domain::descriptive::ReturnSummary;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[derive(Debug, Clone)]
pub struct GaussianKde {
    sample: Vec<f64>,
    bandwidth: f64,
    min: f64,
    max: f64,
}

/// A density estimate evaluated on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq)]
pub struct KdeCurve {
    pub bandwidth: f64,
    pub xs: Vec<f64>,
    pub densities: Vec<f64>,
}

impl GaussianKde {
    /// `None` for fewer than two finite points, zero spread, or a
    /// non-positive `bw_adjust`.
    pub fn new(sample: &[f64], bw_adjust: f64) -> Option<Self> {
        let sample: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        let summary = ReturnSummary::compute(&sample)?;
        if !(summary.std_dev > 0.0) || !(bw_adjust > 0.0) {
            return None;
        }
        let bandwidth = scott_bandwidth(summary.std_dev, sample.len()) * bw_adjust;
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            sample,
            bandwidth,
            min,
            max,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let sum: f64 = self
            .sample
            .iter()
            .map(|&xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum();
        sum * INV_SQRT_2PI / (self.sample.len() as f64 * h)
    }

    /// Evaluates on `grid_size` points over `[min - cut*h, max + cut*h]`.
    pub fn curve(&self, grid_size: usize, cut: f64) -> KdeCurve {
        let lo = self.min - cut * self.bandwidth;
        let hi = self.max + cut * self.bandwidth;
        let xs = linspace(lo, hi, grid_size);
        let densities = xs.iter().map(|&x| self.evaluate(x)).collect();
        KdeCurve {
            bandwidth: self.bandwidth,
            xs,
            densities,
        }
    }
}

pub fn scott_bandwidth(std_dev: f64, n: usize) -> f64 {
    std_dev * (n as f64).powf(-0.2)
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
