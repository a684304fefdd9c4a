use coincast::{ForecastService, MarketDataProvider, PricePoint, ProviderError};

const MS_PER_DAY: i64 = 86_400_000;
// 2023-01-01T00:00:00Z
const BASE_MS: i64 = 1_672_531_200_000;

/// Stand-in for a real market-data client: a deterministic random walk
struct DemoProvider;

impl MarketDataProvider for DemoProvider {
    fn price_history(&self, _coin_id: &str) -> Result<Vec<PricePoint>, ProviderError> {
        let mut seed = 99u64;
        let mut price = 42_000.0;
        Ok((0..180i64)
            .map(|i| {
                seed = seed
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let noise = ((seed >> 33) as f64 / (1u64 << 31) as f64) - 1.0;
                price = (price + 30.0 + 250.0 * noise).max(1.0);
                PricePoint::new(BASE_MS + i * MS_PER_DAY, price)
            })
            .collect())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("CoinCast: Basic Forecasting Example");
    println!("===================================\n");

    let service = ForecastService::new(DemoProvider).with_history_window(30);

    println!("Requesting a 7-day forecast...");
    let result = service.forecast("bitcoin", 7)?;

    println!(
        "History: {} days, last price {:.2}\n",
        result.history.len(),
        result.history.points().last().map(|p| p.price).unwrap_or(0.0)
    );

    println!("Forecast:");
    for (k, p) in result.forecast.iter().enumerate() {
        println!(
            "  day +{}: {:>10.2}  [{:>10.2}, {:>10.2}]",
            k + 1,
            p.yhat,
            p.yhat_lower,
            p.yhat_upper
        );
    }

    println!("\nModel provenance:");
    println!("  models used: {:?}", result.model_info.models_used);
    for (model, weight) in &result.model_info.weights {
        println!("  weight[{model}] = {weight:.3}");
    }
    for (model, diagnostics) in &result.model_info.fit_diagnostics {
        println!("  diagnostics[{model}]: {diagnostics:?}");
    }

    println!("\nForecasting complete!");
    Ok(())
}
