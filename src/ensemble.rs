//! Inverse-variance ensembling of model forecasts

use crate::models::ModelFit;
use crate::series::day_to_ms;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;

pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// One forecasted day with its confidence band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Millisecond epoch timestamp (midnight UTC of the forecast day)
    pub timestamp: i64,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Provenance of an ensembled forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Model identifiers in the order they were combined
    pub models_used: Vec<String>,
    /// Ensemble weights at horizon day 1, non-negative, summing to 1.0.
    /// Day-1 weights are the fixed reporting convention; each day's point
    /// estimate still uses that day's own weights.
    pub weights: BTreeMap<String, f64>,
    /// Per-model numeric fit diagnostics
    pub fit_diagnostics: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Combines per-model forecasts into one point forecast and band per day
#[derive(Debug, Clone)]
pub struct Ensembler {
    confidence_level: f64,
    z: f64,
}

impl Default for Ensembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Ensembler {
    pub fn new() -> Self {
        Self::with_confidence_level(DEFAULT_CONFIDENCE_LEVEL)
    }

    /// Nominal coverage of the confidence band, strictly inside (0, 1)
    pub fn with_confidence_level(level: f64) -> Self {
        assert!(
            level > 0.0 && level < 1.0,
            "confidence level must be in (0, 1)"
        );
        let normal = Normal::new(0.0, 1.0).unwrap();
        Self {
            confidence_level: level,
            z: normal.inverse_cdf(0.5 + level / 2.0),
        }
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Combine model outputs day by day.
    ///
    /// Per day, each model is weighted by the inverse of its forecast-error
    /// variance; a model with zero or non-finite variance gets weight 0 and
    /// the rest renormalize. When every model is degenerate the combiner
    /// averages them equally with a zero-width band. The ensemble variance is
    /// the harmonic combination consistent with the weights.
    pub fn combine(
        &self,
        fits: &[ModelFit],
        horizon: usize,
        last_day: NaiveDate,
    ) -> (Vec<ForecastPoint>, ModelInfo) {
        debug_assert!(!fits.is_empty());
        debug_assert!(fits.iter().all(|f| f.horizon() == horizon));

        let mut forecast = Vec::with_capacity(horizon);
        let mut day1_weights = BTreeMap::new();

        for k in 0..horizon {
            let raw: Vec<f64> = fits
                .iter()
                .map(|f| {
                    let var = f.variances()[k];
                    if var.is_finite() && var > 0.0 {
                        1.0 / var
                    } else {
                        0.0
                    }
                })
                .collect();
            let total: f64 = raw.iter().sum();

            let (weights, variance): (Vec<f64>, f64) = if total > 0.0 {
                (raw.iter().map(|w| w / total).collect(), 1.0 / total)
            } else {
                (vec![1.0 / fits.len() as f64; fits.len()], 0.0)
            };

            let combined: f64 = fits
                .iter()
                .zip(&weights)
                .map(|(f, w)| w * f.values()[k])
                .sum();
            // Prices are non-negative: a model extrapolating below zero on a
            // declining series floors at zero, band included.
            let yhat = combined.max(0.0);

            let half_width = self.z * variance.sqrt();
            let yhat_lower = (yhat - half_width).max(0.0);
            let yhat_upper = yhat + half_width;

            if k == 0 {
                for (f, w) in fits.iter().zip(&weights) {
                    day1_weights.insert(f.model_id().to_string(), *w);
                }
            }

            let day = last_day + Duration::days(k as i64 + 1);
            forecast.push(ForecastPoint {
                timestamp: day_to_ms(day),
                yhat,
                yhat_lower,
                yhat_upper,
            });
        }

        let info = ModelInfo {
            models_used: fits.iter().map(|f| f.model_id().to_string()).collect(),
            weights: day1_weights,
            fit_diagnostics: fits
                .iter()
                .map(|f| (f.model_id().to_string(), f.diagnostics().clone()))
                .collect(),
        };

        (forecast, info)
    }
}
