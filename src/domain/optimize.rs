//! Bounded scalar minimization.
//!
//! Brent's method: golden-section steps combined with successive parabolic
//! interpolation, confined to a closed interval. The search starts from a
//! caller-supplied initial guess instead of the golden-section point so a
//! fit can be seeded from a prior estimate.

use crate::domain::error::StatplotsError;

const GOLDEN: f64 = 0.381_966_011_250_105_1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub fn new(lo: f64, hi: f64) -> Result<Self, StatplotsError> {
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(StatplotsError::invalid(
                "bounds",
                format!("expected finite lo < hi, got [{lo}, {hi}]"),
            ));
        }
        Ok(Self { lo, hi })
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lo, self.hi)
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.lo..=self.hi).contains(&x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOptions {
    /// Absolute tolerance on the argument.
    pub x_tol: f64,
    pub max_iter: usize,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            x_tol: 1e-5,
            max_iter: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeResult {
    pub x: f64,
    pub fun: f64,
    pub iterations: usize,
    /// False when the iteration cap was hit before the bracket shrank to tolerance.
    pub converged: bool,
}

/// Minimizes `f` on `bounds` starting from `x0` (clamped into the interval).
///
/// Non-finite objective values are treated as `+inf`, which steers the
/// search away from regions where the objective is undefined.
pub fn minimize_bounded<F>(
    mut f: F,
    bounds: Bounds,
    x0: f64,
    options: MinimizeOptions,
) -> Result<OptimizeResult, StatplotsError>
where
    F: FnMut(f64) -> f64,
{
    if !x0.is_finite() {
        return Err(StatplotsError::invalid("x0", format!("must be finite, got {x0}")));
    }
    if !(options.x_tol > 0.0) {
        return Err(StatplotsError::invalid("x_tol", "must be positive"));
    }

    let mut eval = |x: f64| {
        let y = f(x);
        if y.is_nan() { f64::INFINITY } else { y }
    };

    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = (bounds.lo, bounds.hi);

    let mut x = bounds.clamp(x0);
    let mut w = x;
    let mut v = x;
    let mut fx = eval(x);
    let mut fw = fx;
    let mut fv = fx;

    let mut d = 0.0f64;
    let mut e = 0.0f64;
    let mut iterations = 0usize;

    loop {
        let xm = 0.5 * (a + b);
        let tol1 = sqrt_eps * x.abs() + options.x_tol / 3.0;
        let tol2 = 2.0 * tol1;

        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return Ok(OptimizeResult {
                x,
                fun: fx,
                iterations,
                converged: true,
            });
        }
        if iterations >= options.max_iter {
            return Ok(OptimizeResult {
                x,
                fun: fx,
                iterations,
                converged: false,
            });
        }

        let mut use_golden = true;
        if e.abs() > tol1 {
            let mut r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = d;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if (u - a) < tol2 || (b - u) < tol2 {
                    d = tol1.copysign(xm - x);
                }
                use_golden = false;
            }
        }

        if use_golden {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN * e;
        }

        let step = if d.abs() >= tol1 { d } else { tol1.copysign(d) };
        let u = x + step;
        let fu = eval(u);
        iterations += 1;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }
}
