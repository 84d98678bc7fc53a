//! Descriptive statistics and the two-sided Mann-Whitney U (rank-sum) test.
//!
//! The p-value is computed from the exact null distribution of U when the
//! pooled sample has no ties and at least one group has at most
//! [`EXACT_MAX_GROUP`] observations; otherwise from the normal approximation
//! with tie and continuity corrections.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{Error, Result};

/// Largest group size for which the exact distribution is used.
pub const EXACT_MAX_GROUP: usize = 8;

/// Significance threshold for [`RankSumTest::is_significant`].
pub const ALPHA: f64 = 0.05;

// ─── Descriptive ─────────────────────────────────────────────────────────────

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
  if values.is_empty() {
    return f64::NAN;
  }
  values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by n − 1); NaN when n < 2.
pub fn sample_std(values: &[f64]) -> f64 {
  let n = values.len();
  if n < 2 {
    return f64::NAN;
  }
  let m = mean(values);
  let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
  (ss / (n - 1) as f64).sqrt()
}

// ─── Rank-sum test ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankSumMethod {
  Exact,
  Asymptotic,
}

/// Outcome of [`mann_whitney_u`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankSumTest {
  /// U statistic of the first sample.
  pub statistic: f64,
  /// Two-sided p-value, clipped to `[0, 1]`.
  pub p_value:   f64,
  pub method:    RankSumMethod,
}

impl RankSumTest {
  pub fn is_significant(&self) -> bool { self.p_value < ALPHA }
}

/// Two-sided Mann-Whitney U test of `x` against `y`.
///
/// Values must be finite. Fails if either sample is empty.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<RankSumTest> {
  let (n1, n2) = (x.len(), y.len());
  if n1 == 0 || n2 == 0 {
    return Err(Error::Statistics(format!(
      "rank-sum test needs two non-empty samples (got {n1} and {n2})"
    )));
  }
  if x.iter().chain(y).any(|v| !v.is_finite()) {
    return Err(Error::Statistics("rank-sum test input is not finite".into()));
  }

  let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
  let (ranks, ties) = average_ranks(&pooled);

  let (n1f, n2f) = (n1 as f64, n2 as f64);
  let r1: f64 = ranks[..n1].iter().sum();
  let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
  let u2 = n1f * n2f - u1;
  let u = u1.max(u2);

  let has_ties = !ties.is_empty();
  let method = if !has_ties && n1.min(n2) <= EXACT_MAX_GROUP {
    RankSumMethod::Exact
  } else {
    RankSumMethod::Asymptotic
  };

  let one_sided = match method {
    RankSumMethod::Exact => exact_sf(u.round() as usize, n1.min(n2), n1.max(n2)),
    RankSumMethod::Asymptotic => asymptotic_sf(u, n1, n2, &ties)?,
  };

  Ok(RankSumTest {
    statistic: u1,
    p_value: (2.0 * one_sided).clamp(0.0, 1.0),
    method,
  })
}

/// Effect size `r = |Φ⁻¹(p / 2)| / √n`.
///
/// This recovers a z-score from the two-sided p-value rather than from the
/// test statistic, so it is a p-derived proxy and not the rank-biserial
/// correlation. `p = 1` gives 0; `p = 0` gives infinity.
pub fn effect_size(p_value: f64, n_total: usize) -> Result<f64> {
  if !(0.0..=1.0).contains(&p_value) {
    return Err(Error::Statistics(format!("p-value out of range: {p_value}")));
  }
  if n_total == 0 {
    return Err(Error::Statistics("effect size needs at least one observation".into()));
  }
  let z = standard_normal()?.inverse_cdf(p_value / 2.0);
  Ok(z.abs() / (n_total as f64).sqrt())
}

fn standard_normal() -> Result<Normal> {
  Normal::new(0.0, 1.0).map_err(|e| Error::Statistics(e.to_string()))
}

/// Average (mid) ranks, 1-based, plus the size of every tie group > 1.
fn average_ranks(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
  let mut order: Vec<usize> = (0..values.len()).collect();
  order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

  let mut ranks = vec![0.0; values.len()];
  let mut ties = Vec::new();
  let mut start = 0;
  while start < order.len() {
    let mut end = start + 1;
    while end < order.len() && values[order[end]] == values[order[start]] {
      end += 1;
    }
    // Positions start..end share the mean of ranks start+1..=end.
    let rank = (start + end + 1) as f64 / 2.0;
    for &i in &order[start..end] {
      ranks[i] = rank;
    }
    if end - start > 1 {
      ties.push(end - start);
    }
    start = end;
  }
  (ranks, ties)
}

/// `P(U >= k)` under the null for group sizes `m <= n`, without ties.
///
/// The frequencies of U are the coefficients of the Gaussian binomial
/// `[m + n choose m]_q = prod_{i=1..m} (1 - q^(n+i)) / (1 - q^i)`, built as
/// a truncated power series of degree `m * n`.
fn exact_sf(k: usize, m: usize, n: usize) -> f64 {
  let max = m * n;
  if k > max {
    return 0.0;
  }
  let mut freq = vec![0.0_f64; max + 1];
  freq[0] = 1.0;
  for i in 1..=m {
    let s = n + i;
    for d in (s..=max).rev() {
      freq[d] -= freq[d - s];
    }
    for d in i..=max {
      freq[d] += freq[d - i];
    }
  }
  let total: f64 = freq.iter().sum();
  freq[k..].iter().sum::<f64>() / total
}

/// Upper tail of the normal approximation for `U`.
fn asymptotic_sf(u: f64, n1: usize, n2: usize, ties: &[usize]) -> Result<f64> {
  let (n1f, n2f) = (n1 as f64, n2 as f64);
  let n = n1f + n2f;
  let mu = n1f * n2f / 2.0;
  let tie_term: f64 = ties.iter().map(|&t| (t * t * t - t) as f64).sum();
  let variance = n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
  if variance <= 0.0 {
    // Every observation tied: no evidence either way.
    return Ok(0.5);
  }
  let z = (u - mu - 0.5) / variance.sqrt();
  Ok(standard_normal()?.sf(z))
}
