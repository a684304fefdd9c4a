//! Holt's linear-trend exponential smoothing

use crate::error::{ForecastError, Result};
use crate::models::{ensure_finite, sample_variance, ForecastModel, ModelFit};
use crate::series::{HistorySeries, MIN_SERIES_LEN};
use std::collections::BTreeMap;

pub const HOLT_MODEL_ID: &str = "holt";

// Coefficient grid: 0.05, 0.10, ..., 0.95 for both alpha and beta. The grid
// never touches 0 or 1, which keeps the recursion away from degenerate
// smoothing weights on exactly linear or constant input.
const GRID_MIN: f64 = 0.05;
const GRID_STEP: f64 = 0.05;
const GRID_STEPS: usize = 19;

/// Holt's method with separate level and trend state.
///
/// Smoothing coefficients are chosen by a deterministic grid search
/// minimizing in-sample one-step squared error; ties break toward the
/// smallest alpha, then the smallest beta.
#[derive(Debug, Clone, Default)]
pub struct HoltModel;

impl HoltModel {
    pub fn new() -> Self {
        Self
    }
}

/// Final smoothing state after a pass over the series
struct HoltState {
    level: f64,
    trend: f64,
    residuals: Vec<f64>,
    sse: f64,
}

/// One pass of the level/trend recursion, collecting one-step residuals
fn run_recursion(prices: &[f64], alpha: f64, beta: f64) -> HoltState {
    let mut level = prices[0];
    let mut trend = prices[1] - prices[0];
    let mut residuals = Vec::with_capacity(prices.len() - 1);
    let mut sse = 0.0;

    for &y in &prices[1..] {
        let one_step = level + trend;
        let err = y - one_step;
        residuals.push(err);
        sse += err * err;

        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    HoltState {
        level,
        trend,
        residuals,
        sse,
    }
}

impl ForecastModel for HoltModel {
    fn id(&self) -> &'static str {
        HOLT_MODEL_ID
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

        let mut best_alpha = GRID_MIN;
        let mut best_beta = GRID_MIN;
        let mut best_sse = f64::INFINITY;
        for i in 0..GRID_STEPS {
            let alpha = GRID_MIN + i as f64 * GRID_STEP;
            for j in 0..GRID_STEPS {
                let beta = GRID_MIN + j as f64 * GRID_STEP;
                let sse = run_recursion(&prices, alpha, beta).sse;
                if sse < best_sse {
                    best_sse = sse;
                    best_alpha = alpha;
                    best_beta = beta;
                }
            }
        }

        let state = run_recursion(&prices, best_alpha, best_beta);
        let sigma2 = sample_variance(&state.residuals);

        let mut values = Vec::with_capacity(horizon);
        let mut variances = Vec::with_capacity(horizon);
        for k in 1..=horizon {
            values.push(state.level + k as f64 * state.trend);
            // Interval widening with horizon distance: trend uncertainty
            // compounds with beta at each step.
            variances.push(sigma2 * (1.0 + k as f64 * best_beta * best_beta));
        }

        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("alpha".to_string(), best_alpha);
        diagnostics.insert("beta".to_string(), best_beta);
        diagnostics.insert("sse".to_string(), state.sse);
        diagnostics.insert("sigma2".to_string(), sigma2);

        Ok(ModelFit::new(HOLT_MODEL_ID, values, variances, diagnostics))
    }
}
