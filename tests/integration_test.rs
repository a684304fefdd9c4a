use coincast::{ForecastService, MarketDataProvider, PricePoint, ProviderError};
use serde_json::Value;

const MS_PER_DAY: i64 = 86_400_000;
const BASE_MS: i64 = 1_672_531_200_000;

// Helper provider serving a year of synthetic daily prices with a few gaps,
// the shape of data a market-data API actually returns.
struct SyntheticExchange;

impl MarketDataProvider for SyntheticExchange {
    fn price_history(&self, _coin_id: &str) -> Result<Vec<PricePoint>, ProviderError> {
        let mut seed = 2023u64;
        let mut price = 25_000.0;
        let mut points = Vec::new();
        for i in 0..365i64 {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let noise = ((seed >> 33) as f64 / (1u64 << 31) as f64) - 1.0;
            price = (price + 15.0 + 120.0 * noise).max(1.0);
            // Every 40th day is missing, as if the provider skipped a sample
            if i % 40 != 39 {
                points.push(PricePoint::new(BASE_MS + i * MS_PER_DAY, price));
            }
        }
        Ok(points)
    }
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Build the service over the provider
    let service = ForecastService::new(SyntheticExchange).with_history_window(180);

    // 2. Request a two-week forecast
    let result = service.forecast("bitcoin", 14).unwrap();

    // 3. Gaps were interpolated back onto the daily grid
    assert_eq!(result.history.len(), 180);
    let timestamps: Vec<i64> = result.history.points().iter().map(|p| p.timestamp).collect();
    for w in timestamps.windows(2) {
        assert_eq!(w[1] - w[0], MS_PER_DAY);
    }

    // 4. Forecast invariants hold end to end
    assert_eq!(result.forecast.len(), 14);
    for p in &result.forecast {
        assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        assert!(p.yhat_lower >= 0.0);
    }

    // 5. Provenance names both models and their diagnostics
    assert_eq!(result.model_info.models_used, vec!["holt", "arima"]);
    assert!(result.model_info.fit_diagnostics["holt"].contains_key("alpha"));
    assert!(result.model_info.fit_diagnostics["arima"].contains_key("used_fallback"));
}

#[test]
fn test_result_serializes_for_the_transport_layer() {
    let service = ForecastService::new(SyntheticExchange);
    let result = service.forecast("bitcoin", 7).unwrap();

    let json: Value = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();

    assert_eq!(json["coin_id"], "bitcoin");
    // Timestamps cross the wire as millisecond-epoch integers
    assert!(json["forecast"][0]["timestamp"].is_i64());
    assert!(json["history"][0]["timestamp"].is_i64());
    // All forecast values are finite decimal numbers
    for p in json["forecast"].as_array().unwrap() {
        for key in ["yhat", "yhat_lower", "yhat_upper"] {
            assert!(p[key].as_f64().unwrap().is_finite());
        }
    }
    // Day-1 ensemble weights ride along in model_info
    assert!(json["model_info"]["weights"]["holt"].is_number());
    assert!(json["model_info"]["weights"]["arima"].is_number());
}
