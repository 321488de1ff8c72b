//! Pseudo-random sampling from the distributions the analyses compare.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Pareto};

use crate::domain::error::StatplotsError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleDistribution {
    Normal { mean: f64, std_dev: f64 },
    Exponential { rate: f64 },
    /// Support `[scale, inf)`.
    Pareto { shape: f64, scale: f64 },
}

impl SampleDistribution {
    pub fn validate(&self) -> Result<(), StatplotsError> {
        match *self {
            SampleDistribution::Normal { mean, std_dev } => {
                require_finite("mean", mean)?;
                require_positive("std_dev", std_dev)
            }
            SampleDistribution::Exponential { rate } => require_positive("rate", rate),
            SampleDistribution::Pareto { shape, scale } => {
                require_positive("shape", shape)?;
                require_positive("scale", scale)
            }
        }
    }

    /// Expected value, or `None` where it is infinite (Pareto with shape <= 1).
    pub fn theoretical_mean(&self) -> Option<f64> {
        match *self {
            SampleDistribution::Normal { mean, .. } => Some(mean),
            SampleDistribution::Exponential { rate } => Some(1.0 / rate),
            SampleDistribution::Pareto { shape, scale } => {
                (shape > 1.0).then(|| shape * scale / (shape - 1.0))
            }
        }
    }

    /// Draws `n` values in sequence from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, StatplotsError> {
        self.validate()?;
        let values = match *self {
            SampleDistribution::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev)
                    .map_err(|e| StatplotsError::invalid("std_dev", e.to_string()))?;
                draw(&dist, n, rng)
            }
            SampleDistribution::Exponential { rate } => {
                let dist =
                    Exp::new(rate).map_err(|e| StatplotsError::invalid("rate", e.to_string()))?;
                draw(&dist, n, rng)
            }
            SampleDistribution::Pareto { shape, scale } => {
                let dist = Pareto::new(scale, shape)
                    .map_err(|e| StatplotsError::invalid("shape", e.to_string()))?;
                draw(&dist, n, rng)
            }
        };
        Ok(values)
    }
}

impl fmt::Display for SampleDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SampleDistribution::Normal { mean, std_dev } => {
                write!(f, "Normal(μ={mean}, σ={std_dev})")
            }
            SampleDistribution::Exponential { rate } => write!(f, "Exponential(λ={rate})"),
            SampleDistribution::Pareto { shape, scale } if scale == 1.0 => {
                write!(f, "Pareto(α={shape})")
            }
            SampleDistribution::Pareto { shape, scale } => {
                write!(f, "Pareto(α={shape}, xm={scale})")
            }
        }
    }
}

fn draw<D, R>(dist: &D, n: usize, rng: &mut R) -> Vec<f64>
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    (0..n).map(|_| dist.sample(rng)).collect()
}

fn require_positive(name: &str, value: f64) -> Result<(), StatplotsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StatplotsError::invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), StatplotsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StatplotsError::invalid(name, format!("must be finite, got {value}")))
    }
}
