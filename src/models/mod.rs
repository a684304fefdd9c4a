//! Forecasting models for daily price series

use crate::error::{ForecastError, Result};
use crate::series::HistorySeries;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Output of one fitted model over a forecast horizon
#[derive(Debug, Clone)]
pub struct ModelFit {
    model_id: &'static str,
    /// Point forecasts, one per future day
    values: Vec<f64>,
    /// Forecast-error variance per future day, non-decreasing
    variances: Vec<f64>,
    /// Opaque numeric diagnostics from the fit (smoothing coefficients,
    /// AIC, fallback flag, ...)
    diagnostics: BTreeMap<String, f64>,
}

impl ModelFit {
    pub fn new(
        model_id: &'static str,
        values: Vec<f64>,
        variances: Vec<f64>,
        diagnostics: BTreeMap<String, f64>,
    ) -> Self {
        debug_assert_eq!(values.len(), variances.len());
        Self {
            model_id,
            values,
            variances,
            diagnostics,
        }
    }

    pub fn model_id(&self) -> &'static str {
        self.model_id
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn diagnostics(&self) -> &BTreeMap<String, f64> {
        &self.diagnostics
    }

    pub fn diagnostic(&self, key: &str) -> Option<f64> {
        self.diagnostics.get(key).copied()
    }
}

/// A forecaster fitted fresh per request over an immutable series
pub trait ForecastModel: Debug {
    /// Stable identifier used in model provenance
    fn id(&self) -> &'static str;

    /// Fit to the series and forecast `horizon` days ahead
    fn fit_and_forecast(&self, series: &HistorySeries, horizon: usize) -> Result<ModelFit>;
}

/// Reject series containing non-finite prices before they reach a fit
pub(crate) fn ensure_finite(prices: &[f64]) -> Result<()> {
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(ForecastError::Fit(
            "series contains non-finite prices".to_string(),
        ));
    }
    Ok(())
}

/// Sample variance (n-1 denominator), 0 for fewer than two observations
pub(crate) fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        0.0
    } else {
        xs.iter().variance()
    }
}

/// First differences of a series
pub(crate) fn first_differences(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] - w[0]).collect()
}

pub mod arima;
pub mod holt;
