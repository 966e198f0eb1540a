// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_core::PaleoError;

/// RBF kernel cost over a series, queryable per segment in O(1) after an
/// O(n^2) precomputation of Gram-matrix prefix sums.
///
/// The segment cost is the kernelized within-segment dispersion
/// `sum_i k(x_i, x_i) - (1 / len) * sum_ij k(x_i, x_j)`.
#[derive(Clone, Debug)]
pub struct RbfCost {
    n: usize,
    prefix: Vec<f64>,
    diag_prefix: Vec<f64>,
    gamma: f64,
    gamma_was_auto: bool,
}

impl RbfCost {
    /// Builds the cost structure; `gamma = None` resolves the bandwidth from
    /// the median of squared pairwise distances.
    pub fn new(values: &[f64], gamma: Option<f64>) -> Result<Self, PaleoError> {
        if values.is_empty() {
            return Err(PaleoError::invalid_input(
                "rbf cost requires a non-empty series",
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(PaleoError::invalid_input(format!(
                "rbf cost input must be finite; got {bad}"
            )));
        }

        let (gamma, gamma_was_auto) = match gamma {
            Some(gamma) => {
                if !gamma.is_finite() || gamma <= 0.0 {
                    return Err(PaleoError::invalid_input(format!(
                        "rbf gamma must be finite and > 0; got {gamma}"
                    )));
                }
                (gamma, false)
            }
            None => (median_heuristic_gamma(values), true),
        };

        let n = values.len();
        let mut gram = vec![0.0; n * n];
        for left in 0..n {
            for right in left..n {
                let delta = values[left] - values[right];
                let value = (-gamma * delta * delta).exp();
                gram[left * n + right] = value;
                gram[right * n + left] = value;
            }
        }

        // 2-D inclusion-exclusion prefix over the Gram matrix plus a diagonal
        // prefix, so any block sum is four lookups.
        let mut prefix = vec![0.0; (n + 1) * (n + 1)];
        for row in 0..n {
            for col in 0..n {
                let idx = (row + 1) * (n + 1) + (col + 1);
                prefix[idx] = gram[row * n + col]
                    + prefix[row * (n + 1) + (col + 1)]
                    + prefix[(row + 1) * (n + 1) + col]
                    - prefix[row * (n + 1) + col];
            }
        }

        let mut diag_prefix = vec![0.0; n + 1];
        for i in 0..n {
            diag_prefix[i + 1] = diag_prefix[i] + gram[i * n + i];
        }

        Ok(Self {
            n,
            prefix,
            diag_prefix,
            gamma,
            gamma_was_auto,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn gamma_was_auto(&self) -> bool {
        self.gamma_was_auto
    }

    fn block_sum(&self, start: usize, end: usize) -> f64 {
        let stride = self.n + 1;
        self.prefix[end * stride + end] - self.prefix[start * stride + end]
            - self.prefix[end * stride + start]
            + self.prefix[start * stride + start]
    }

    /// Cost of the half-open segment `[start, end)`.
    pub fn segment_cost(&self, start: usize, end: usize) -> f64 {
        debug_assert!(start < end && end <= self.n);
        let len = (end - start) as f64;
        let diag_sum = self.diag_prefix[end] - self.diag_prefix[start];
        let mut cost = diag_sum - self.block_sum(start, end) / len;
        // The exact value is non-negative; absorb prefix-sum rounding.
        if cost < 0.0 && cost > -1.0e-9 {
            cost = 0.0;
        }
        cost
    }
}

/// Bandwidth from the median of positive squared pairwise distances:
/// `gamma = 1 / (2 * median)`, falling back to 1 for degenerate series.
fn median_heuristic_gamma(values: &[f64]) -> f64 {
    let n = values.len();
    let mut dist_sq = Vec::with_capacity(n * (n - 1) / 2);
    for left in 0..n {
        for right in left + 1..n {
            let delta = values[left] - values[right];
            let d2 = delta * delta;
            if d2 > 0.0 {
                dist_sq.push(d2);
            }
        }
    }
    if dist_sq.is_empty() {
        return 1.0;
    }
    dist_sq.sort_by(f64::total_cmp);
    let median = dist_sq[dist_sq.len() / 2];
    1.0 / (2.0 * median)
}
