//! Forecast orchestration over an external market-data provider

use crate::ensemble::{Ensembler, ForecastPoint, ModelInfo};
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::holt::HoltModel;
use crate::models::ForecastModel;
use crate::series::{HistorySeries, PricePoint, SeriesLoader};
use log::debug;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Horizons a client may request, in days
pub const ALLOWED_HORIZONS: [usize; 3] = [7, 14, 30];

/// Trailing days of history echoed back for display
pub const DEFAULT_HISTORY_WINDOW: usize = 180;

/// Failures the market-data collaborator can signal
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not know this coin identifier
    #[error("coin not found: {0}")]
    CoinNotFound(String),

    /// The provider throttled the request, optionally saying when to retry
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    /// The provider could not be reached or answered abnormally
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Contract with the excluded market-data collaborator.
///
/// Implementations should cover at least the recent trailing window needed
/// for fitting (90 days or more recommended). Samples may arrive unordered
/// or with gaps; normalization happens in the pipeline. Transient failures
/// must be signalled as errors, never as silently empty data.
pub trait MarketDataProvider {
    fn price_history(&self, coin_id: &str) -> std::result::Result<Vec<PricePoint>, ProviderError>;
}

/// Complete response for one forecast request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub coin_id: String,
    /// Normalized history, truncated to the service's history window
    pub history: HistorySeries,
    /// One point per future day, length equals the requested horizon
    pub forecast: Vec<ForecastPoint>,
    pub model_info: ModelInfo,
}

/// Stateless orchestrator: provider fetch, normalization, both models,
/// ensemble, response assembly. Every request is independent.
#[derive(Debug)]
pub struct ForecastService<P> {
    provider: P,
    ensembler: Ensembler,
    history_window: usize,
}

impl<P: MarketDataProvider> ForecastService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            ensembler: Ensembler::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Nominal coverage of the confidence bands, strictly inside (0, 1)
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.ensembler = Ensembler::with_confidence_level(level);
        self
    }

    /// Trailing days of history echoed back in the result
    pub fn with_history_window(mut self, days: usize) -> Self {
        self.history_window = days;
        self
    }

    /// Produce an ensembled forecast for `coin_id`, `horizon` days ahead.
    ///
    /// `horizon` must be one of [`ALLOWED_HORIZONS`]. Data and fit failures
    /// propagate unchanged; provider failures map to
    /// [`ForecastError::UpstreamUnavailable`] or
    /// [`ForecastError::UnknownCoin`].
    pub fn forecast(&self, coin_id: &str, horizon: usize) -> Result<ForecastResult> {
        if !ALLOWED_HORIZONS.contains(&horizon) {
            return Err(ForecastError::InvalidHorizon {
                requested: horizon,
                allowed: &ALLOWED_HORIZONS,
            });
        }

        let raw = self
            .provider
            .price_history(coin_id)
            .map_err(map_provider_error)?;
        let series = SeriesLoader::normalize(&raw)?;
        debug!(
            "forecasting {coin_id}: {} grid days, horizon {horizon}",
            series.len()
        );

        // The two fits are independent; sequential execution keeps the
        // output identical to any parallel schedule.
        let holt = HoltModel::new().fit_and_forecast(&series, horizon)?;
        let arima = ArimaModel::new().fit_and_forecast(&series, horizon)?;

        let last_day = series.last_day().unwrap();
        let (forecast, model_info) = self.ensembler.combine(&[holt, arima], horizon, last_day);

        Ok(ForecastResult {
            coin_id: coin_id.to_string(),
            history: series.tail(self.history_window),
            forecast,
            model_info,
        })
    }
}

fn map_provider_error(err: ProviderError) -> ForecastError {
    match err {
        ProviderError::CoinNotFound(id) => ForecastError::UnknownCoin(id),
        ProviderError::RateLimited { retry_after } => ForecastError::UpstreamUnavailable {
            reason: "rate limited by provider".to_string(),
            retry_after,
        },
        ProviderError::Unavailable(reason) => ForecastError::UpstreamUnavailable {
            reason,
            retry_after: None,
        },
    }
}
