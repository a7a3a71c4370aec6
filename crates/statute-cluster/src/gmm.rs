//! Diagonal-covariance Gaussian mixture fitted by expectation-maximisation.
//!
//! Components are seeded from a k-means partition, so a fit is fully
//! deterministic for a given feature matrix.

use ndarray::{Array1, Array2, ArrayView2};
use statute_core::{Error, Result};

use crate::kmeans::{check_features, fit_kmeans};

/// Added to every variance so that collapsed components stay well defined.
pub const REG_COVAR: f64 = 1e-6;
/// EM iteration cap.
pub const MAX_ITER: usize = 100;
/// Convergence threshold on the change of the mean per-sample log-likelihood.
pub const TOLERANCE: f64 = 1e-3;

const LN_2PI: f64 = 1.837_877_066_409_345_5;

#[derive(Debug, Clone)]
pub struct GmmFit {
    pub labels: Vec<usize>,
    pub weights: Array1<f64>,
    pub means: Array2<f64>,
    pub variances: Array2<f64>,
    /// Total log-likelihood of the data under the fitted mixture.
    pub log_likelihood: f64,
    /// Bayesian information criterion, lower is better.
    pub bic: f64,
}

impl GmmFit {
    /// Number of free parameters of a `k`-component diagonal mixture in `d` dimensions.
    pub fn parameter_count(k: usize, d: usize) -> usize {
        2 * k * d + k - 1
    }
}

struct Params {
    weights: Array1<f64>,
    means: Array2<f64>,
    variances: Array2<f64>,
}

fn m_step(data: ArrayView2<f64>, resp: &Array2<f64>) -> Params {
    let (n, d) = data.dim();
    let k = resp.ncols();
    let mut weights = Array1::zeros(k);
    let mut means = Array2::zeros((k, d));
    let mut variances = Array2::zeros((k, d));

    for c in 0..k {
        let nk: f64 = resp.column(c).sum() + 10.0 * f64::EPSILON;
        weights[c] = nk / n as f64;
        for j in 0..d {
            let mean = (0..n).map(|i| resp[[i, c]] * data[[i, j]]).sum::<f64>() / nk;
            let var = (0..n)
                .map(|i| resp[[i, c]] * (data[[i, j]] - mean).powi(2))
                .sum::<f64>()
                / nk;
            means[[c, j]] = mean;
            variances[[c, j]] = var + REG_COVAR;
        }
    }

    Params {
        weights,
        means,
        variances,
    }
}

/// Returns per-sample log normalisers and fills `resp` with posteriors.
fn e_step(data: ArrayView2<f64>, params: &Params, resp: &mut Array2<f64>) -> Array1<f64> {
    let (n, d) = data.dim();
    let k = params.weights.len();
    let mut log_norm = Array1::zeros(n);
    let mut weighted = vec![0.0; k];

    for i in 0..n {
        for (c, slot) in weighted.iter_mut().enumerate() {
            let mut log_prob = d as f64 * LN_2PI;
            for j in 0..d {
                let var = params.variances[[c, j]];
                let diff = data[[i, j]] - params.means[[c, j]];
                log_prob += var.ln() + diff * diff / var;
            }
            *slot = params.weights[c].ln() - 0.5 * log_prob;
        }
        let max = weighted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = weighted.iter().map(|w| (w - max).exp()).sum();
        let norm = max + sum.ln();
        log_norm[i] = norm;
        for c in 0..k {
            resp[[i, c]] = (weighted[c] - norm).exp();
        }
    }
    log_norm
}

/// Fit a `k`-component mixture to the rows of `data` and score it with BIC.
pub fn fit_gmm(data: ArrayView2<f64>, k: usize) -> Result<GmmFit> {
    check_features(data, k)?;
    let (n, d) = data.dim();

    let seed = fit_kmeans(data, k)?;
    let mut resp = Array2::zeros((n, k));
    for (i, &c) in seed.labels.iter().enumerate() {
        resp[[i, c]] = 1.0;
    }

    let mut params = m_step(data, &resp);
    let mut log_norm = e_step(data, &params, &mut resp);
    let mut lower_bound = log_norm.mean().unwrap_or(f64::NEG_INFINITY);

    for _ in 1..MAX_ITER {
        params = m_step(data, &resp);
        log_norm = e_step(data, &params, &mut resp);
        let next = log_norm.mean().unwrap_or(f64::NEG_INFINITY);
        let change = (next - lower_bound).abs();
        lower_bound = next;
        if change < TOLERANCE {
            break;
        }
    }

    let log_likelihood = log_norm.sum();
    if !log_likelihood.is_finite() {
        return Err(Error::Clustering(format!(
            "mixture log-likelihood is not finite for k={k}"
        )));
    }
    let bic = -2.0 * log_likelihood + GmmFit::parameter_count(k, d) as f64 * (n as f64).ln();

    let labels = resp
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (c, &p)| {
                    if p > best.1 {
                        (c, p)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect();

    Ok(GmmFit {
        labels,
        weights: params.weights,
        means: params.means,
        variances: params.variances,
        log_likelihood,
        bic,
    })
}
