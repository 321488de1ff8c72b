//! Equal-width histograms normalized to a probability density.

#[derive(Debug, Clone, PartialEq)]
pub struct DensityHistogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// One density per bin; `sum(density * width) == 1`.
    pub densities: Vec<f64>,
}

impl DensityHistogram {
    /// Bins `values` over their own `[min, max]` range.
    ///
    /// Returns `None` for an empty sample or zero bins. A sample with a
    /// single distinct value gets unit-width bins centred on it.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &v in &finite {
            // The last bin is closed on the right.
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let total = finite.len() as f64;
        let densities = counts
            .iter()
            .map(|&c| c as f64 / (total * width))
            .collect();

        Some(Self { edges, densities })
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// (left edge, right edge, density) per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.densities)
            .map(|(e, &d)| (e[0], e[1], d))
    }

    pub fn max_density(&self) -> f64 {
        self.densities.iter().copied().fold(0.0, f64::max)
    }
}
