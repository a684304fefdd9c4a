//! ARIMA(1,1,1) model with a naive fallback

use crate::error::{ForecastError, Result};
use crate::models::{
    ensure_finite, first_differences, sample_variance, ForecastModel, ModelFit,
};
use crate::series::{HistorySeries, MIN_SERIES_LEN};
use log::debug;
use std::collections::BTreeMap;

pub const ARIMA_MODEL_ID: &str = "arima";

/// Diagnostic key set to 1.0 when the naive fallback produced the forecast
pub const DIAG_USED_FALLBACK: &str = "used_fallback";

// Fixed order: one differencing pass absorbs the trend, ARMA(1,1) on the
// differences keeps estimation closed-form.
const P: usize = 1;
const D: usize = 1;
const Q: usize = 1;

/// Minimum observations for the primary fit; below this the model falls back
pub const MIN_OBSERVATIONS: usize = P + D + Q + 2;

// Longest AR order used as the residual proxy in Hannan-Rissanen step one
const MAX_LONG_AR: usize = 8;

/// ARIMA(1,1,1) fitted by Hannan-Rissanen two-stage least squares.
///
/// Estimation is deterministic and bounded. Non-convergence (or a series too
/// short for the order) is not an error: the model silently degrades to a
/// naive constant forecast and reports it through [`DIAG_USED_FALLBACK`].
#[derive(Debug, Clone, Default)]
pub struct ArimaModel;

impl ArimaModel {
    pub fn new() -> Self {
        Self
    }

    /// Naive fallback: constant forecast at the last observed price, variance
    /// from the first differences, flat across the horizon.
    fn fallback(&self, prices: &[f64], horizon: usize) -> ModelFit {
        let last = prices[prices.len() - 1];
        let var = sample_variance(&first_differences(prices));

        let mut diagnostics = BTreeMap::new();
        diagnostics.insert(DIAG_USED_FALLBACK.to_string(), 1.0);
        diagnostics.insert("sigma2".to_string(), var);

        ModelFit::new(
            ARIMA_MODEL_ID,
            vec![last; horizon],
            vec![var; horizon],
            diagnostics,
        )
    }
}

impl ForecastModel for ArimaModel {
    fn id(&self) -> &'static str {
        ARIMA_MODEL_ID
    }

    fn fit_and_forecast(&self, series: &HistorySeries, horizon: usize) -> Result<ModelFit> {
        let prices = series.prices();
        ensure_finite(&prices)?;
        if prices.len() < MIN_SERIES_LEN {
            return Err(ForecastError::InsufficientData {
                have: prices.len(),
                need: MIN_SERIES_LEN,
            });
        }

        let n = prices.len();
        if n < MIN_OBSERVATIONS {
            debug!("series too short for ARIMA({P},{D},{Q}) ({n} < {MIN_OBSERVATIONS}), using naive fallback");
            return Ok(self.fallback(&prices, horizon));
        }

        // Difference once, then fit ARMA(1,1) on the drift-centered result.
        let w = first_differences(&prices);
        let drift = w.iter().sum::<f64>() / w.len() as f64;
        let z: Vec<f64> = w.iter().map(|x| x - drift).collect();

        let est = match estimate_arma11(&z) {
            Some(est) => est,
            None => {
                debug!("ARIMA({P},{D},{Q}) estimation did not converge, using naive fallback");
                return Ok(self.fallback(&prices, horizon));
            }
        };

        let m = z.len();
        let sigma2 = sample_variance(&est.residuals);

        let mut values = Vec::with_capacity(horizon);
        let mut variances = Vec::with_capacity(horizon);
        let mut zhat = est.phi * z[m - 1] + est.theta * est.residuals[m - 1];
        let mut y = prices[n - 1];
        // psi weights of the ARMA part; the integrated process accumulates
        // their cumulative sums into the forecast-error variance.
        let mut psi = 1.0;
        let mut cum_psi = 1.0;
        let mut var_sum = 0.0;
        for k in 1..=horizon {
            y += drift + zhat;
            values.push(y);

            var_sum += cum_psi * cum_psi;
            variances.push(sigma2 * var_sum);

            zhat *= est.phi;
            psi = est.phi * psi + if k == 1 { est.theta } else { 0.0 };
            cum_psi += psi;
        }

        let aic = m as f64 * sigma2.max(1e-12).ln() + 2.0 * (P + Q + 1) as f64;

        let mut diagnostics = BTreeMap::new();
        diagnostics.insert(DIAG_USED_FALLBACK.to_string(), 0.0);
        diagnostics.insert("phi".to_string(), est.phi);
        diagnostics.insert("theta".to_string(), est.theta);
        diagnostics.insert("drift".to_string(), drift);
        diagnostics.insert("sigma2".to_string(), sigma2);
        diagnostics.insert("aic".to_string(), aic);

        Ok(ModelFit::new(ARIMA_MODEL_ID, values, variances, diagnostics))
    }
}

struct ArmaEstimate {
    phi: f64,
    theta: f64,
    /// One-step in-sample residuals of the fitted ARMA(1,1)
    residuals: Vec<f64>,
}

/// Hannan-Rissanen estimation of ARMA(1,1) on a centered series.
///
/// Stage one fits a long AR by Durbin-Levinson to obtain innovation proxies;
/// stage two solves the 2x2 normal equations of regressing `z[t]` on
/// `(z[t-1], e[t-1])`. Returns `None` when the estimate does not converge to
/// a finite, stationary, invertible pair.
fn estimate_arma11(z: &[f64]) -> Option<ArmaEstimate> {
    let m = z.len();
    if m < 4 {
        return None;
    }

    let k = (m / 4).clamp(1, MAX_LONG_AR);
    let gamma = autocovariances(z, k);
    if !gamma[0].is_finite() {
        return None;
    }
    if gamma[0] <= 1e-12 {
        // Differenced series is (numerically) deterministic; a pure drift
        // model with zero innovations is the exact fit.
        return Some(ArmaEstimate {
            phi: 0.0,
            theta: 0.0,
            residuals: vec![0.0; m],
        });
    }

    let ar = durbin_levinson(&gamma)?;

    // Innovation proxies from the long AR fit
    let mut e = vec![0.0; m];
    for t in k..m {
        let mut pred = 0.0;
        for (j, &a) in ar.iter().enumerate() {
            pred += a * z[t - 1 - j];
        }
        e[t] = z[t] - pred;
    }

    // 2x2 least squares of z[t] on (z[t-1], e[t-1])
    let (mut s11, mut s12, mut s22) = (0.0, 0.0, 0.0);
    let (mut b1, mut b2) = (0.0, 0.0);
    for t in (k + 1)..m {
        let x1 = z[t - 1];
        let x2 = e[t - 1];
        s11 += x1 * x1;
        s12 += x1 * x2;
        s22 += x2 * x2;
        b1 += x1 * z[t];
        b2 += x2 * z[t];
    }
    let det = s11 * s22 - s12 * s12;
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let phi = (s22 * b1 - s12 * b2) / det;
    let theta = (s11 * b2 - s12 * b1) / det;
    if !phi.is_finite() || !theta.is_finite() || phi.abs() >= 1.0 || theta.abs() >= 1.0 {
        return None;
    }

    let mut eps = vec![0.0; m];
    eps[0] = z[0];
    for t in 1..m {
        eps[t] = z[t] - phi * z[t - 1] - theta * eps[t - 1];
    }

    Some(ArmaEstimate {
        phi,
        theta,
        residuals: eps,
    })
}

/// Biased sample autocovariances up to `max_lag`
fn autocovariances(z: &[f64], max_lag: usize) -> Vec<f64> {
    let m = z.len() as f64;
    (0..=max_lag)
        .map(|h| z.iter().skip(h).zip(z.iter()).map(|(a, b)| a * b).sum::<f64>() / m)
        .collect()
}

/// AR coefficients for lags 1..=k via the Durbin-Levinson recursion
fn durbin_levinson(gamma: &[f64]) -> Option<Vec<f64>> {
    let k = gamma.len() - 1;
    let mut phi = vec![0.0; k];
    let mut prev = vec![0.0; k];
    let mut v = gamma[0];

    for order in 1..=k {
        if v.abs() < 1e-12 {
            return None;
        }
        let mut num = gamma[order];
        for j in 1..order {
            num -= prev[j - 1] * gamma[order - j];
        }
        let refl = num / v;
        for j in 1..order {
            phi[j - 1] = prev[j - 1] - refl * prev[order - j - 1];
        }
        phi[order - 1] = refl;
        v *= 1.0 - refl * refl;
        prev[..order].copy_from_slice(&phi[..order]);
    }

    if phi.iter().any(|c| !c.is_finite()) {
        return None;
    }
    Some(phi)
}
