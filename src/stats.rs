//! Descriptive statistics shared by the metric and symmetry stages.
//!
//! Numeric contract (see the error taxonomy in [`crate::types`]): empty or
//! degenerate inputs yield 0.0 (or a p-value of 1.0), never NaN and never a
//! panic. Every helper here is a pure function over a slice.
//!
//! The percentile estimator and the Mann–Whitney U test reproduce the
//! behavior of the statistics library the reference gait literature uses:
//! percentile interpolates at position `p/100 · (n+1)` over the sorted
//! sample, and the U test takes the two-sided normal approximation with
//! midranks for ties.

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bias-corrected sample variance (n−1 denominator). Fewer than 2 values
/// yields 0.0.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Bias-corrected sample standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Percentile via linear interpolation at position `p/100 · (n+1)` over the
/// sorted sample. `p` outside the interpolable range clamps to the extreme
/// order statistics. Empty input yields 0.0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let pos = p / 100.0 * (n + 1) as f64;
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }
    let lower = pos.floor() as usize;
    let d = pos - lower as f64;
    sorted[lower - 1] + d * (sorted[lower] - sorted[lower - 1])
}

/// Two-sided Mann–Whitney U test p-value (normal approximation).
///
/// Nonparametric test of whether two samples come from the same
/// distribution. Ties receive midranks. Either sample having fewer than 2
/// observations yields 1.0 (no evidence of asymmetry from that little data).
pub fn mann_whitney_u_p_value(x: &[f64], y: &[f64]) -> f64 {
    let n1 = x.len();
    let n2 = y.len();
    if n1 < 2 || n2 < 2 {
        return 1.0;
    }

    // Rank the pooled sample, averaging ranks across ties.
    let mut pooled: Vec<(f64, usize)> = x
        .iter()
        .map(|&v| (v, 0usize))
        .chain(y.iter().map(|&v| (v, 1usize)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total = pooled.len();
    let mut ranks = vec![0.0f64; total];
    let mut i = 0;
    while i < total {
        let mut j = i;
        while j + 1 < total && pooled[j + 1].0 == pooled[i].0 {
            j += 1;
        }
        // 1-based midrank for the tie group [i, j].
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for rank in ranks.iter_mut().take(j + 1).skip(i) {
            *rank = midrank;
        }
        i = j + 1;
    }

    let rank_sum_x: f64 = pooled
        .iter()
        .zip(ranks.iter())
        .filter(|((_, group), _)| *group == 0)
        .map(|(_, &rank)| rank)
        .sum();

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u_min = u1.min(u2);

    let e_u = n1f * n2f / 2.0;
    let var_u = n1f * n2f * (n1f + n2f + 1.0) / 12.0;
    if var_u <= 0.0 {
        return 1.0;
    }

    let z = (u_min - e_u) / var_u.sqrt();
    (2.0 * normal_cdf(z)).clamp(0.0, 1.0)
}

/// Standard normal cumulative distribution function.
fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Complementary error function, Abramowitz & Stegun 7.1.26.
///
/// Absolute error below 1.5e-7, which is far tighter than the confidence a
/// rank test over a few dozen gait cycles can support.
fn erfc(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x_abs = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x_abs);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let erf = 1.0 - poly * (-x_abs * x_abs).exp();

    1.0 - sign * erf
}
