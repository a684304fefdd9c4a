//! # CoinCast
//!
//! A Rust library for forecasting near-term cryptocurrency price
//! trajectories from historical daily price series.
//!
//! ## Features
//!
//! - Normalization of raw provider samples onto a strict daily grid
//! - Two independent forecasters: Holt's linear-trend exponential smoothing
//!   and ARIMA(1,1,1) with a naive fallback
//! - Inverse-variance ensembling with confidence bands
//! - Model provenance (weights and fit diagnostics) on every result
//!
//! All fitting is deterministic and bounded: the same input series and
//! horizon always produce the same forecast.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coincast::{ForecastService, MarketDataProvider, PricePoint, ProviderError};
//!
//! struct MyProvider;
//!
//! impl MarketDataProvider for MyProvider {
//!     fn price_history(&self, coin_id: &str) -> Result<Vec<PricePoint>, ProviderError> {
//!         // fetch (timestamp, price) samples for the coin
//!         Ok(vec![])
//!     }
//! }
//!
//! let service = ForecastService::new(MyProvider);
//! let result = service.forecast("bitcoin", 7)?;
//! for point in &result.forecast {
//!     println!("{}: {:.2} [{:.2}, {:.2}]",
//!         point.timestamp, point.yhat, point.yhat_lower, point.yhat_upper);
//! }
//! # Ok::<(), coincast::ForecastError>(())
//! ```

pub mod ensemble;
pub mod error;
pub mod models;
pub mod series;
pub mod service;

// Re-export commonly used types
pub use crate::ensemble::{Ensembler, ForecastPoint, ModelInfo};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ModelFit};
pub use crate::series::{HistorySeries, PricePoint, SeriesLoader};
pub use crate::service::{
    ForecastResult, ForecastService, MarketDataProvider, ProviderError, ALLOWED_HORIZONS,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
