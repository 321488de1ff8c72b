//! Pareto density and maximum-likelihood tail-exponent fitting.
//!
//! Tail values above a threshold `t` are modelled as Pareto with scale `t`
//! (peaks over threshold). The exponent is found by minimizing the negative
//! log-likelihood with the bounded optimizer; the closed-form Hill estimate
//! is kept alongside for comparison.

use crate::domain::error::StatplotsError;
use crate::domain::optimize::{minimize_bounded, Bounds, MinimizeOptions};

/// Pareto density `shape * scale^shape / x^(shape + 1)` on `[scale, inf)`.
pub fn pdf(x: f64, shape: f64, scale: f64) -> f64 {
    if x < scale {
        0.0
    } else {
        shape * scale.powf(shape) / x.powf(shape + 1.0)
    }
}

pub fn log_pdf(x: f64, shape: f64, scale: f64) -> f64 {
    if x < scale {
        f64::NEG_INFINITY
    } else {
        shape.ln() + shape * scale.ln() - (shape + 1.0) * x.ln()
    }
}

/// Sum of `-log_pdf` over `data`. `+inf` if any point is outside the support.
pub fn neg_log_likelihood(shape: f64, scale: f64, data: &[f64]) -> f64 {
    -data.iter().map(|&x| log_pdf(x, shape, scale)).sum::<f64>()
}

/// Closed-form MLE of the exponent for data above `threshold`.
pub fn hill_estimator(tail: &[f64], threshold: f64) -> Option<f64> {
    if tail.is_empty() || !(threshold > 0.0) {
        return None;
    }
    let sum_log: f64 = tail.iter().map(|&x| (x / threshold).ln()).sum();
    (sum_log > 0.0).then(|| tail.len() as f64 / sum_log)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailFitSettings {
    pub bounds: Bounds,
    pub initial_guess: f64,
    pub options: MinimizeOptions,
}

impl Default for TailFitSettings {
    fn default() -> Self {
        Self {
            bounds: Bounds { lo: 1.01, hi: 10.0 },
            initial_guess: 2.0,
            options: MinimizeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailFit {
    pub threshold: f64,
    pub shape: f64,
    pub tail_len: usize,
    pub neg_log_likelihood: f64,
    pub converged: bool,
    pub iterations: usize,
}

impl TailFit {
    pub fn pdf(&self, x: f64) -> f64 {
        pdf(x, self.shape, self.threshold)
    }
}

/// Fits the Pareto exponent of `tail` (values above `threshold`).
pub fn fit_tail_exponent(
    tail: &[f64],
    threshold: f64,
    settings: &TailFitSettings,
) -> Result<TailFit, StatplotsError> {
    if tail.is_empty() {
        return Err(StatplotsError::InsufficientData {
            what: "tail fit".into(),
            have: 0,
            need: 1,
        });
    }
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(StatplotsError::invalid(
            "threshold",
            format!("must be positive and finite, got {threshold}"),
        ));
    }
    if let Some(&below) = tail.iter().find(|&&x| !(x >= threshold)) {
        return Err(StatplotsError::invalid(
            "tail",
            format!("value {below} is below threshold {threshold}"),
        ));
    }

    let result = minimize_bounded(
        |alpha| neg_log_likelihood(alpha, threshold, tail),
        settings.bounds,
        settings.initial_guess,
        settings.options,
    )?;

    if !result.converged {
        tracing::warn!(
            iterations = result.iterations,
            shape = result.x,
            "tail fit stopped at the iteration cap"
        );
    }

    Ok(TailFit {
        threshold,
        shape: result.x,
        tail_len: tail.len(),
        neg_log_likelihood: result.fun,
        converged: result.converged,
        iterations: result.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sampling::SampleDistribution;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pdf_matches_closed_form() {
        // alpha=2, xm=1: 2 / x^3
        assert_relative_eq!(pdf(2.0, 2.0, 1.0), 0.25);
        assert_eq!(pdf(0.5, 2.0, 1.0), 0.0);
        assert_relative_eq!(log_pdf(2.0, 2.0, 1.0), 0.25f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn nll_is_infinite_outside_support() {
        assert_eq!(neg_log_likelihood(2.0, 3.0, &[2.9, 4.0]), f64::INFINITY);
    }

    #[test]
    fn optimizer_agrees_with_hill() {
        let mut rng = StdRng::seed_from_u64(42);
        let tail = SampleDistribution::Pareto { shape: 2.5, scale: 3.0 }
            .sample(800, &mut rng)
            .unwrap();
        let fit = fit_tail_exponent(&tail, 3.0, &TailFitSettings::default()).unwrap();
        let hill = hill_estimator(&tail, 3.0).unwrap();
        assert!(fit.converged);
        assert_eq!(fit.tail_len, 800);
        assert_relative_eq!(fit.shape, hill, epsilon = 1e-3);
    }

    #[test]
    fn estimate_is_clamped_to_bounds() {
        // Very heavy tail: unconstrained MLE well below 1.01.
        let tail = [3.0 * 50.0, 3.0 * 80.0, 3.0 * 120.0];
        let fit = fit_tail_exponent(&tail, 3.0, &TailFitSettings::default()).unwrap();
        assert!(fit.shape >= 1.01);
        assert!(fit.shape < 1.02);
    }

    #[test]
    fn empty_tail_is_insufficient() {
        let err = fit_tail_exponent(&[], 3.0, &TailFitSettings::default()).unwrap_err();
        assert!(matches!(err, StatplotsError::InsufficientData { have: 0, .. }));
    }

    #[test]
    fn values_below_threshold_are_rejected() {
        let err = fit_tail_exponent(&[2.0, 5.0], 3.0, &TailFitSettings::default()).unwrap_err();
        assert!(matches!(err, StatplotsError::InvalidParameter { name, .. } if name == "tail"));
    }

    #[test]
    fn hill_needs_spread_above_threshold() {
        assert_eq!(hill_estimator(&[], 1.0), None);
        assert_eq!(hill_estimator(&[1.0, 1.0], 1.0), None);
    }
}
