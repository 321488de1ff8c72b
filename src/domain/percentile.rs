//! Percentiles with linear interpolation between closest ranks.
//!
//! For `n` sorted values the p-th percentile sits at fractional rank
//! `p / 100 * (n - 1)`; the result interpolates between the two values that
//! bracket that rank.

/// Percentile of unsorted `values`. `None` when empty or `p` is outside 0..=100.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Percentile of values already sorted ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    debug_assert!(sorted.is_sorted_by(|a, b| a <= b));
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Values strictly greater than `threshold`, in input order.
pub fn exceedances(values: &[f64], threshold: f64) -> Vec<f64> {
    values.iter().copied().filter(|&v| v > threshold).collect()
}
